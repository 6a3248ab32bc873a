pub mod clients;
pub mod source;
pub mod types;

pub use clients::{ClientIdentity, IdentityProfile, InnertubeClient};
pub use source::{
    select_track, CaptionError, CaptionSource, InnertubeSource, RawPlayback, RenditionSource,
    UpstreamError,
};
