//! Resolves structured metadata through the platform's official public
//! data API, using the server-held credential.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use tubegate_resolver_api::{Geolocation, LiveDetails, Metadata, ResolveError, Thumbnail, VideoRef};

/// The fixed, maximal part set requested on every call.
pub const VIDEO_PARTS: &str =
    "snippet,contentDetails,statistics,status,recordingDetails,liveStreamingDetails";

const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

/// One `videos` list call. Seam for the HTTP conversation so tests can
/// count invocations and feed canned payloads.
#[async_trait]
pub trait VideoDataApi: Send + Sync {
    async fn list_videos(&self, id: &str, api_key: &str) -> Result<api::VideoListResponse>;
}

/// Production implementation against the official endpoint. The credential
/// travels as a query parameter and is never logged.
pub struct DataApiHttp {
    http: reqwest::Client,
}

impl DataApiHttp {
    pub fn new() -> reqwest::Result<Self> {
        Ok(DataApiHttp {
            http: reqwest::Client::builder().build()?,
        })
    }
}

#[async_trait]
impl VideoDataApi for DataApiHttp {
    async fn list_videos(&self, id: &str, api_key: &str) -> Result<api::VideoListResponse> {
        // The API answers non-2xx statuses with the same JSON envelope,
        // error object included, so the body is parsed unconditionally.
        let response = self
            .http
            .get(VIDEOS_ENDPOINT)
            .query(&[("part", VIDEO_PARTS), ("id", id), ("key", api_key)])
            .send()
            .await?
            .json::<api::VideoListResponse>()
            .await?;
        Ok(response)
    }
}

pub struct MetadataResolver {
    api: Arc<dyn VideoDataApi>,
    api_key: Option<String>,
}

impl MetadataResolver {
    pub fn new(api: Arc<dyn VideoDataApi>, api_key: Option<String>) -> Self {
        MetadataResolver { api, api_key }
    }

    pub async fn resolve(&self, video: &VideoRef) -> Result<Metadata, ResolveError> {
        let api_key = self.api_key.as_deref().ok_or(ResolveError::Misconfigured)?;
        let response = self
            .api
            .list_videos(video.id(), api_key)
            .await
            .map_err(|err| {
                warn!(video = video.id(), error = %err, "data api call failed");
                ResolveError::ExtractionFailed(err.to_string())
            })?;
        if let Some(error) = response.error {
            return Err(ResolveError::UpstreamRejected(error.message));
        }
        let item = response
            .items
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or(ResolveError::NotFound)?;
        Ok(reshape(item))
    }
}

/// Reshapes the first (and only expected) result item into the stable
/// schema. Absent counters become zero, absent flags their safe defaults.
fn reshape(item: api::VideoItem) -> Metadata {
    let snippet = item.snippet.unwrap_or_default();
    let content = item.content_details.unwrap_or_default();
    let statistics = item.statistics.unwrap_or_default();
    let status = item.status.unwrap_or_default();
    let location = item.recording_details.and_then(|recording| {
        if recording.location.is_none() && recording.location_description.is_none() {
            return None;
        }
        let coordinates = recording.location.unwrap_or_default();
        Some(Geolocation {
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            altitude: coordinates.altitude,
            description: recording.location_description,
        })
    });
    let live_details = item.live_streaming_details.map(|live| LiveDetails {
        actual_start_time: live.actual_start_time,
        actual_end_time: live.actual_end_time,
        scheduled_start_time: live.scheduled_start_time,
        concurrent_viewers: live.concurrent_viewers,
    });

    Metadata {
        id: item.id,
        title: snippet.title,
        description: snippet.description,
        thumbnails: snippet
            .thumbnails
            .unwrap_or_default()
            .into_iter()
            .map(|(name, thumb)| {
                (
                    name,
                    Thumbnail {
                        url: thumb.url,
                        width: thumb.width,
                        height: thumb.height,
                    },
                )
            })
            .collect(),
        channel_id: snippet.channel_id,
        channel_title: snippet.channel_title,
        published_at: snippet.published_at,
        tags: snippet.tags.unwrap_or_default(),
        view_count: statistics.view_count.unwrap_or(0),
        like_count: statistics.like_count.unwrap_or(0),
        comment_count: statistics.comment_count.unwrap_or(0),
        duration: content.duration.unwrap_or_default(),
        definition: content.definition.unwrap_or_else(|| "sd".to_string()),
        dimension: content.dimension.unwrap_or_else(|| "2d".to_string()),
        has_captions: content.caption.as_deref() == Some("true"),
        licensed_content: content.licensed_content.unwrap_or(false),
        privacy_status: status.privacy_status.unwrap_or_default(),
        license: status.license.unwrap_or_default(),
        embeddable: status.embeddable.unwrap_or(false),
        location,
        live_details,
    }
}

pub mod api {
    //! Wire models of the official `videos` endpoint. Counters arrive as
    //! strings and the caption flag as "true"/"false".

    use std::collections::BTreeMap;

    use serde::Deserialize;
    use serde_aux::prelude::*;
    use tubegate_resolver_api::{DateTime, Utc};

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct VideoListResponse {
        pub error: Option<ErrorBody>,
        pub items: Option<Vec<VideoItem>>,
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ErrorBody {
        pub code: Option<u16>,
        #[serde(default)]
        pub message: String,
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct VideoItem {
        #[serde(default)]
        pub id: String,
        pub snippet: Option<Snippet>,
        pub content_details: Option<ContentDetails>,
        pub statistics: Option<Statistics>,
        pub status: Option<Status>,
        pub recording_details: Option<RecordingDetails>,
        pub live_streaming_details: Option<LiveStreamingDetails>,
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Snippet {
        #[serde(default)]
        pub title: String,
        #[serde(default)]
        pub description: String,
        pub published_at: Option<DateTime<Utc>>,
        #[serde(default)]
        pub channel_id: String,
        #[serde(default)]
        pub channel_title: String,
        pub tags: Option<Vec<String>>,
        pub thumbnails: Option<BTreeMap<String, ApiThumbnail>>,
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ApiThumbnail {
        #[serde(default)]
        pub url: String,
        pub width: Option<u32>,
        pub height: Option<u32>,
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ContentDetails {
        pub duration: Option<String>,
        pub definition: Option<String>,
        pub dimension: Option<String>,
        /// "true"/"false" as a string, per the upstream schema.
        pub caption: Option<String>,
        pub licensed_content: Option<bool>,
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Statistics {
        #[serde(deserialize_with = "deserialize_option_number_from_string")]
        #[serde(default)]
        pub view_count: Option<u64>,
        #[serde(deserialize_with = "deserialize_option_number_from_string")]
        #[serde(default)]
        pub like_count: Option<u64>,
        #[serde(deserialize_with = "deserialize_option_number_from_string")]
        #[serde(default)]
        pub comment_count: Option<u64>,
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Status {
        pub privacy_status: Option<String>,
        pub license: Option<String>,
        pub embeddable: Option<bool>,
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordingDetails {
        pub location: Option<ApiLocation>,
        pub location_description: Option<String>,
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ApiLocation {
        pub latitude: Option<f64>,
        pub longitude: Option<f64>,
        pub altitude: Option<f64>,
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct LiveStreamingDetails {
        pub actual_start_time: Option<DateTime<Utc>>,
        pub actual_end_time: Option<DateTime<Utc>>,
        pub scheduled_start_time: Option<DateTime<Utc>>,
        #[serde(deserialize_with = "deserialize_option_number_from_string")]
        #[serde(default)]
        pub concurrent_viewers: Option<u64>,
    }
}
