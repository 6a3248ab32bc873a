//! Resolves the downloadable rendition list through the upstream client
//! abstraction.

use std::sync::Arc;

use tracing::warn;

use tubegate_resolver_api::{FormatList, FormatRendition, ResolveError, VideoRef};
use tubegate_upstream::{RenditionSource, UpstreamError};
use tubegate_upstream::types::response::Format;

/// Filter policy A: a rendition survives only if its container matches the
/// target AND it carries an audio track. A video-only rendition of the
/// target container is excluded.
pub const TARGET_CONTAINER: &str = "mp4";

pub struct FormatResolver {
    source: Arc<dyn RenditionSource>,
}

impl FormatResolver {
    pub fn new(source: Arc<dyn RenditionSource>) -> Self {
        FormatResolver { source }
    }

    pub async fn resolve(&self, video: &VideoRef) -> Result<FormatList, ResolveError> {
        let playback = self
            .source
            .fetch_renditions(video)
            .await
            .map_err(|err| classify_upstream(video, err))?;
        let formats = playback
            .renditions
            .into_iter()
            .filter_map(project)
            .collect();
        Ok(FormatList {
            title: playback.title,
            formats,
        })
    }
}

/// Applies the filter policy and projects a surviving raw rendition.
/// Renditions without a direct URL cannot be returned and are skipped.
fn project(format: Format) -> Option<FormatRendition> {
    let ext = format.container_ext().to_string();
    if ext != TARGET_CONTAINER || !format.has_audio() {
        return None;
    }
    let url = format.url?;
    Some(FormatRendition {
        resolution: format
            .quality_label
            .unwrap_or_else(|| "N/A".to_string()),
        filesize: format.content_length.unwrap_or(0),
        url,
        ext,
    })
}

fn classify_upstream(video: &VideoRef, err: UpstreamError) -> ResolveError {
    warn!(video = video.id(), error = %err, "rendition enumeration failed");
    match err {
        // Sign-in challenges are the upstream rate-limiting automated
        // callers; the caller should back off, not hammer.
        UpstreamError::Blocked => ResolveError::RateLimited,
        // The deployment's own egress is broken; only an operator can fix
        // that.
        UpstreamError::ProxyUnavailable(message) => ResolveError::InfrastructureDegraded(message),
        UpstreamError::Unknown(message) => ResolveError::ExtractionFailed(message),
    }
}
