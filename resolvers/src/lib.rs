pub mod formats;
pub mod metadata;
pub mod transcript;

pub use formats::FormatResolver;
pub use metadata::{DataApiHttp, MetadataResolver, VideoDataApi};
pub use transcript::TranscriptResolver;
