//! The thin HTTP boundary: three GET endpoints, permissive CORS, and the
//! translation of classified errors into `{error: message}` responses.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tubegate_resolver_api::{
    FormatList, LanguagePreference, Metadata, ResolveError, Transcript, VideoRef,
};
use tubegate_resolvers::{DataApiHttp, FormatResolver, MetadataResolver, TranscriptResolver};
use tubegate_upstream::{ClientIdentity, InnertubeSource};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    metadata: Arc<MetadataResolver>,
    transcript: Arc<TranscriptResolver>,
    formats: Arc<FormatResolver>,
    preference: Arc<LanguagePreference>,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<AppState> {
        let identity = ClientIdentity::new(config.identity, config.proxy.clone());
        let source = Arc::new(InnertubeSource::new(identity, &config.languages)?);
        let data_api = Arc::new(DataApiHttp::new()?);
        Ok(AppState {
            metadata: Arc::new(MetadataResolver::new(data_api, config.api_key.clone())),
            transcript: Arc::new(TranscriptResolver::new(source.clone())),
            formats: Arc::new(FormatResolver::new(source)),
            preference: Arc::new(LanguagePreference::for_languages(&config.languages)),
        })
    }
}

pub fn router(state: AppState) -> Router {
    // Browser-based callers come from anywhere; the service carries no
    // caller credentials, so a fully open policy is safe here.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/", get(home))
        .route("/api/metadata", get(metadata))
        .route("/api/transcript", get(transcript))
        .route("/api/formats", get(formats))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        ApiError {
            status: StatusCode::from_u16(err.suggested_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Deserialize)]
struct IdQuery {
    id: Option<String>,
}

#[derive(Deserialize)]
struct UrlQuery {
    url: Option<String>,
}

fn parse_ref(raw: Option<String>, missing: &str) -> Result<VideoRef, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::bad_request(missing))?;
    VideoRef::parse(&raw).ok_or_else(|| ApiError::bad_request("Unrecognized video reference"))
}

async fn home() -> Json<serde_json::Value> {
    Json(json!({
        "status": "active",
        "message": "video resolver backend is running",
    }))
}

async fn metadata(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Metadata>, ApiError> {
    let video = parse_ref(query.id, "Missing video ID")?;
    Ok(Json(state.metadata.resolve(&video).await?))
}

async fn transcript(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Transcript>, ApiError> {
    let video = parse_ref(query.id, "Missing video ID")?;
    Ok(Json(
        state.transcript.resolve(&video, &state.preference).await?,
    ))
}

async fn formats(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<FormatList>, ApiError> {
    let video = parse_ref(query.url, "Missing video URL")?;
    Ok(Json(state.formats.resolve(&video).await?))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::{router, AppState};
    use tubegate_resolver_api::{LanguagePreference, TranscriptLine, VideoRef};
    use tubegate_resolvers::metadata::api::VideoListResponse;
    use tubegate_resolvers::{FormatResolver, MetadataResolver, TranscriptResolver, VideoDataApi};
    use tubegate_upstream::types::response::Format;
    use tubegate_upstream::{
        CaptionError, CaptionSource, RawPlayback, RenditionSource, UpstreamError,
    };

    /// Counts every upstream touch; answers with canned outcomes.
    struct FakeUpstreams {
        calls: AtomicUsize,
        renditions: Result<RawPlayback, UpstreamError>,
        captions: Result<Vec<TranscriptLine>, CaptionError>,
    }

    impl Default for FakeUpstreams {
        fn default() -> Self {
            FakeUpstreams {
                calls: AtomicUsize::new(0),
                renditions: Err(UpstreamError::Unknown("unused".into())),
                captions: Err(CaptionError::Upstream("unused".into())),
            }
        }
    }

    #[async_trait]
    impl VideoDataApi for FakeUpstreams {
        async fn list_videos(&self, _id: &str, _key: &str) -> anyhow::Result<VideoListResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::from_value(serde_json::json!({"items": []}))?)
        }
    }

    #[async_trait]
    impl RenditionSource for FakeUpstreams {
        async fn fetch_renditions(&self, _video: &VideoRef) -> Result<RawPlayback, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.renditions {
                Ok(playback) => Ok(playback.clone()),
                Err(err) => Err(err.clone()),
            }
        }
    }

    #[async_trait]
    impl CaptionSource for FakeUpstreams {
        async fn fetch_captions(
            &self,
            _video: &VideoRef,
            _preference: &LanguagePreference,
        ) -> Result<Vec<TranscriptLine>, CaptionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.captions.clone()
        }
    }

    fn state_with(fake: Arc<FakeUpstreams>, api_key: Option<&str>) -> AppState {
        AppState {
            metadata: Arc::new(MetadataResolver::new(
                fake.clone(),
                api_key.map(str::to_string),
            )),
            transcript: Arc::new(TranscriptResolver::new(fake.clone())),
            formats: Arc::new(FormatResolver::new(fake)),
            preference: Arc::new(LanguagePreference::for_languages(&["en"])),
        }
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn home_reports_liveness() {
        let (status, body) = get(state_with(Arc::default(), None), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");
    }

    #[tokio::test]
    async fn missing_id_is_400_and_never_reaches_a_resolver() {
        let fake = Arc::new(FakeUpstreams::default());
        for uri in ["/api/metadata", "/api/transcript"] {
            let (status, body) = get(state_with(fake.clone(), Some("k")), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Missing video ID");
        }
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_url_is_400_and_never_reaches_a_resolver() {
        let fake = Arc::new(FakeUpstreams::default());
        let (status, body) = get(state_with(fake.clone(), Some("k")), "/api/formats").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing video URL");
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unparsable_reference_is_400() {
        let fake = Arc::new(FakeUpstreams::default());
        let (status, _) = get(
            state_with(fake.clone(), Some("k")),
            "/api/metadata?id=definitely%20not%20a%20video",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_credential_surfaces_as_500_without_upstream_calls() {
        let fake = Arc::new(FakeUpstreams::default());
        let (status, body) = get(
            state_with(fake.clone(), None),
            "/api/metadata?id=dQw4w9WgXcQ",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "server is not configured with a data API credential"
        );
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sign_in_challenge_maps_to_429_at_the_boundary() {
        let fake = Arc::new(FakeUpstreams {
            renditions: Err(UpstreamError::Blocked),
            ..Default::default()
        });
        let (status, body) = get(
            state_with(fake, Some("k")),
            "/api/formats?url=https%3A%2F%2Fyoutu.be%2FdQw4w9WgXcQ",
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "upstream refused automated access, retry later");
    }

    #[tokio::test]
    async fn formats_success_serializes_the_wire_shape() {
        let rendition = Format {
            itag: 18,
            url: Some("https://r1.example/video".into()),
            mime_type: "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"".into(),
            quality_label: Some("360p".into()),
            content_length: Some(1024),
            ..Default::default()
        };
        let fake = Arc::new(FakeUpstreams {
            renditions: Ok(RawPlayback {
                title: Some("Some video".into()),
                renditions: vec![rendition],
            }),
            ..Default::default()
        });
        let (status, body) = get(state_with(fake, Some("k")), "/api/formats?url=dQw4w9WgXcQ").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Some video");
        assert_eq!(
            body["formats"][0],
            serde_json::json!({
                "resolution": "360p",
                "filesize": 1024,
                "url": "https://r1.example/video",
                "ext": "mp4",
            })
        );
    }

    #[tokio::test]
    async fn transcript_success_serializes_full_text_and_timeline() {
        let fake = Arc::new(FakeUpstreams {
            captions: Ok(vec![
                TranscriptLine {
                    text: "hello".into(),
                    start: 0.0,
                    duration: 1.0,
                },
                TranscriptLine {
                    text: "world".into(),
                    start: 1.0,
                    duration: 1.0,
                },
            ]),
            ..Default::default()
        });
        let (status, body) = get(
            state_with(fake, Some("k")),
            "/api/transcript?id=dQw4w9WgXcQ",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["full_text"], "hello world");
        assert_eq!(body["timeline"][1]["text"], "world");
        assert_eq!(body["timeline"][1]["start"], 1.0);
    }

    #[tokio::test]
    async fn disabled_captions_map_to_404() {
        let fake = Arc::new(FakeUpstreams {
            captions: Err(CaptionError::Disabled),
            ..Default::default()
        });
        let (status, body) = get(
            state_with(fake, Some("k")),
            "/api/transcript?id=dQw4w9WgXcQ",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "captions are disabled for this video");
    }
}
