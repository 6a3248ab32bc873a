use thiserror::Error;

/// The classified failure every resolver returns instead of a raw upstream
/// error. Each category carries a caller-facing message and maps to exactly
/// one suggested HTTP status; the boundary layer does the final translation.
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum ResolveError {
    /// The server-held data API credential is absent from the deployment.
    #[error("server is not configured with a data API credential")]
    Misconfigured,
    /// The upstream knows no video under the given identifier.
    #[error("no video found for the given id")]
    NotFound,
    /// The official API answered with its own error object; the message is
    /// the upstream's, verbatim.
    #[error("{0}")]
    UpstreamRejected(String),
    /// Captions are turned off for the video. Terminal, not worth retrying.
    #[error("captions are disabled for this video")]
    CaptionsDisabled,
    /// Captions exist but none match any entry of the language preference.
    #[error("no caption track matches the requested languages")]
    NoMatchingTrack,
    /// The unofficial surface answered with a sign-in challenge. The caller
    /// should back off and retry later, not immediately.
    #[error("upstream refused automated access, retry later")]
    RateLimited,
    /// The deployment's own egress path is broken; operator-actionable,
    /// no amount of client-side backoff helps.
    #[error("egress path unavailable: {0}")]
    InfrastructureDegraded(String),
    /// Any other extraction failure, raw upstream message preserved.
    #[error("{0}")]
    ExtractionFailed(String),
}

impl ResolveError {
    /// Suggested HTTP status for the boundary layer.
    pub fn suggested_status(&self) -> u16 {
        match self {
            ResolveError::Misconfigured => 500,
            ResolveError::NotFound => 404,
            ResolveError::UpstreamRejected(_) => 400,
            ResolveError::CaptionsDisabled => 404,
            ResolveError::NoMatchingTrack => 404,
            ResolveError::RateLimited => 429,
            ResolveError::InfrastructureDegraded(_) => 502,
            ResolveError::ExtractionFailed(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ResolveError;

    #[test]
    fn every_category_maps_to_its_suggested_status() {
        let table = [
            (ResolveError::Misconfigured, 500),
            (ResolveError::NotFound, 404),
            (ResolveError::UpstreamRejected("quota".into()), 400),
            (ResolveError::CaptionsDisabled, 404),
            (ResolveError::NoMatchingTrack, 404),
            (ResolveError::RateLimited, 429),
            (
                ResolveError::InfrastructureDegraded("connect refused".into()),
                502,
            ),
            (ResolveError::ExtractionFailed("boom".into()), 500),
        ];
        for (error, status) in table {
            assert_eq!(error.suggested_status(), status, "{error:?}");
        }
    }

    #[test]
    fn passthrough_categories_keep_the_raw_message() {
        assert_eq!(
            ResolveError::UpstreamRejected("quotaExceeded".into()).to_string(),
            "quotaExceeded"
        );
        assert_eq!(
            ResolveError::ExtractionFailed("boom".into()).to_string(),
            "boom"
        );
    }
}
