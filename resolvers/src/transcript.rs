//! Resolves a caption track into the transcript shape the client consumes.

use std::sync::Arc;

use tracing::warn;

use tubegate_resolver_api::{LanguagePreference, ResolveError, Transcript, VideoRef};
use tubegate_upstream::{CaptionError, CaptionSource};

pub struct TranscriptResolver {
    source: Arc<dyn CaptionSource>,
}

impl TranscriptResolver {
    pub fn new(source: Arc<dyn CaptionSource>) -> Self {
        TranscriptResolver { source }
    }

    /// First preference entry with a matching upstream track wins; the
    /// capability performs the selection. Disabled captions and absent
    /// tracks are terminal, everything else passes the raw message through.
    pub async fn resolve(
        &self,
        video: &VideoRef,
        preference: &LanguagePreference,
    ) -> Result<Transcript, ResolveError> {
        match self.source.fetch_captions(video, preference).await {
            Ok(lines) => Ok(Transcript::from_lines(lines)),
            Err(CaptionError::Disabled) => Err(ResolveError::CaptionsDisabled),
            Err(CaptionError::NoMatchingTrack) => Err(ResolveError::NoMatchingTrack),
            Err(CaptionError::Upstream(message)) => {
                warn!(video = video.id(), error = %message, "caption extraction failed");
                Err(ResolveError::ExtractionFailed(message))
            }
        }
    }
}
