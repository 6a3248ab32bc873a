use async_trait::async_trait;
use qstring::QString;
use reqwest::header::{ORIGIN, USER_AGENT};
use thiserror::Error;
use tracing::debug;
use url::Url;

use tubegate_resolver_api::{build_http, LanguagePreference, TranscriptLine, VideoRef};

use crate::clients::{ClientIdentity, InnertubeClient};
use crate::types::request;
use crate::types::response::{self, CaptionTrack};

/// Failure signals of the unofficial extraction surface.
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum UpstreamError {
    /// The platform answered with an authentication/sign-in challenge.
    #[error("upstream demands interactive sign-in")]
    Blocked,
    /// The configured proxy egress cannot establish a connection.
    #[error("proxy egress unreachable: {0}")]
    ProxyUnavailable(String),
    /// Any other extraction failure, raw message preserved.
    #[error("{0}")]
    Unknown(String),
}

/// Failure signals of the caption-extraction capability.
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum CaptionError {
    /// Captions are turned off for the video.
    #[error("captions are turned off for this video")]
    Disabled,
    /// Captions exist but none match any preference entry.
    #[error("no caption track matches the requested languages")]
    NoMatchingTrack,
    /// Any other extraction failure, raw message preserved.
    #[error("{0}")]
    Upstream(String),
}

/// What one successful player conversation yields before any filtering.
#[derive(Default, Clone, Debug)]
pub struct RawPlayback {
    pub title: Option<String>,
    pub renditions: Vec<response::Format>,
}

#[async_trait]
pub trait RenditionSource: Send + Sync {
    async fn fetch_renditions(&self, video: &VideoRef) -> Result<RawPlayback, UpstreamError>;
}

#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch_captions(
        &self,
        video: &VideoRef,
        preference: &LanguagePreference,
    ) -> Result<Vec<TranscriptLine>, CaptionError>;
}

/// Talks to the player endpoint under the active client identity. Holds no
/// state between calls; each invocation is an independent conversation.
pub struct InnertubeSource {
    identity: ClientIdentity,
    http: reqwest::Client,
    hl: Option<String>,
}

impl InnertubeSource {
    pub fn new(identity: ClientIdentity, languages: &[String]) -> reqwest::Result<Self> {
        let http = build_http(
            identity.profile.user_agent,
            languages,
            identity.proxy.as_ref(),
        )?;
        let hl = languages
            .first()
            .map(|l| l.get(0..2).unwrap_or(l).to_string());
        Ok(InnertubeSource { identity, http, hl })
    }

    async fn player(
        &self,
        client: &InnertubeClient,
        id: &str,
    ) -> Result<response::Player, reqwest::Error> {
        let mut context_client = client.context;
        context_client.hl = self.hl.as_deref();
        let json = request::Player {
            video_id: id.to_string(),
            context: request::parts::Context {
                client: context_client,
                third_party: client.third_party,
            },
            ..Default::default()
        };
        let mut request = self
            .http
            .post(format!(
                "https://{}/youtubei/v1/player?key={}",
                client.host, client.api_key
            ))
            .json(&json)
            .header(ORIGIN, format!("https://{}", client.host))
            .header("X-Youtube-Client-Version", client.context.client_version);
        if let Some(user_agent) = client.user_agent {
            request = request.header(USER_AGENT, user_agent);
        }
        if let Some(client_id) = client.client_id {
            request = request.header("X-Youtube-Client-Name", client_id.to_string());
        }
        request.send().await?.json::<response::Player>().await
    }

    /// First player response with OK playability wins; transport errors and
    /// non-OK playabilities fall through to the next client in the
    /// identity's list.
    async fn first_playable(&self, id: &str) -> Result<response::Player, UpstreamError> {
        let mut blocked = false;
        let mut last_failure: Option<String> = None;
        for client in self.identity.profile.clients {
            debug!(client = client.name, video = id, "player attempt");
            match self.player(client, id).await {
                Ok(player) => {
                    let status = &player.playability_status;
                    if status.is_ok() {
                        return Ok(player);
                    }
                    if status.is_blocked() {
                        blocked = true;
                    }
                    debug!(
                        client = client.name,
                        status = %status.describe(),
                        "player refused"
                    );
                    last_failure = Some(status.describe());
                }
                Err(err) => {
                    if err.is_connect() && self.identity.proxy.is_some() {
                        return Err(UpstreamError::ProxyUnavailable(err.to_string()));
                    }
                    debug!(client = client.name, error = %err, "player transport failure");
                    last_failure = Some(err.to_string());
                }
            }
        }
        if blocked {
            Err(UpstreamError::Blocked)
        } else {
            Err(UpstreamError::Unknown(last_failure.unwrap_or_else(|| {
                "no client produced a playable response".to_string()
            })))
        }
    }
}

#[async_trait]
impl RenditionSource for InnertubeSource {
    async fn fetch_renditions(&self, video: &VideoRef) -> Result<RawPlayback, UpstreamError> {
        let player = self.first_playable(video.id()).await?;
        let title = Some(player.video_details.title).filter(|t| !t.is_empty());
        let renditions = player
            .streaming_data
            .map(response::StreamingData::into_renditions)
            .unwrap_or_default();
        if renditions.is_empty() {
            return Err(UpstreamError::Unknown(
                "playable response carried no streaming data".to_string(),
            ));
        }
        Ok(RawPlayback { title, renditions })
    }
}

#[async_trait]
impl CaptionSource for InnertubeSource {
    async fn fetch_captions(
        &self,
        video: &VideoRef,
        preference: &LanguagePreference,
    ) -> Result<Vec<TranscriptLine>, CaptionError> {
        let player = self
            .first_playable(video.id())
            .await
            .map_err(|err| CaptionError::Upstream(err.to_string()))?;
        let tracks = player
            .captions
            .and_then(|w| w.player_captions_tracklist_renderer.caption_tracks)
            .unwrap_or_default();
        if tracks.is_empty() {
            return Err(CaptionError::Disabled);
        }
        let track = select_track(&tracks, preference).ok_or(CaptionError::NoMatchingTrack)?;
        let url = timed_text_url(track)?;
        let payload = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| CaptionError::Upstream(err.to_string()))?
            .json::<response::TimedText>()
            .await
            .map_err(|err| CaptionError::Upstream(err.to_string()))?;
        Ok(parse_timed_text(payload))
    }
}

/// First preference entry with a matching upstream track wins. Matching is
/// exact on the track's language code and on whether the track is
/// auto-generated.
pub fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    preference: &LanguagePreference,
) -> Option<&'a CaptionTrack> {
    preference.selectors.iter().find_map(|selector| {
        tracks.iter().find(|track| {
            track.language_code == selector.language && track.is_generated() == selector.generated
        })
    })
}

/// Rewrites the track's base url to request the json3 timed-text spelling.
fn timed_text_url(track: &CaptionTrack) -> Result<Url, CaptionError> {
    let base_url =
        Url::parse(&track.base_url).map_err(|err| CaptionError::Upstream(err.to_string()))?;
    let mut query = QString::new(
        base_url
            .query_pairs()
            .filter(|(k, _)| k != "fmt")
            .collect::<Vec<_>>(),
    );
    query.add_pair(("fmt", "json3"));
    let mut url = base_url;
    url.set_query(Some(&query.to_string()));
    Ok(url)
}

/// Flattens json3 events into caption lines. Events without text (cue
/// markers, pure line breaks) are dropped; internal whitespace collapses
/// so every line is a single run of words.
pub fn parse_timed_text(payload: response::TimedText) -> Vec<TranscriptLine> {
    payload
        .events
        .unwrap_or_default()
        .into_iter()
        .filter_map(|event| {
            let segs = event.segs?;
            let raw = segs.iter().map(|seg| seg.utf8.as_str()).collect::<String>();
            let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return None;
            }
            Some(TranscriptLine {
                text,
                start: event.t_start_ms.unwrap_or(0) as f64 / 1000.0,
                duration: event.d_duration_ms.unwrap_or(0) as f64 / 1000.0,
            })
        })
        .collect()
}
