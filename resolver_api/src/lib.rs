mod context;
mod error;
mod video;

pub use context::build_http;
pub use error::ResolveError;
pub use video::VideoRef;

pub use chrono::{self, DateTime, Utc};
pub use url;

use std::collections::BTreeMap;

use serde::Serialize;

/// Everything the public data API tells us about a single video, reshaped
/// into a stable schema. Produced fresh per request, never cached.
#[derive(Serialize, Default, PartialEq, Clone, Debug)]
pub struct Metadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnails: BTreeMap<String, Thumbnail>,
    pub channel_id: String,
    pub channel_title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    /// Upstream ISO-8601 form, e.g. "PT4M13S".
    pub duration: String,
    /// "hd" or "sd"; "sd" when the upstream omits it.
    pub definition: String,
    /// "2d" or "3d"; "2d" when the upstream omits it.
    pub dimension: String,
    pub has_captions: bool,
    pub licensed_content: bool,
    pub privacy_status: String,
    pub license: String,
    pub embeddable: bool,
    pub location: Option<Geolocation>,
    pub live_details: Option<LiveDetails>,
}

#[derive(Serialize, PartialEq, Clone, Debug)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Serialize, Default, PartialEq, Clone, Debug)]
pub struct Geolocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub description: Option<String>,
}

#[derive(Serialize, Default, PartialEq, Clone, Debug)]
pub struct LiveDetails {
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub concurrent_viewers: Option<u64>,
}

/// One caption line. `start` and `duration` are seconds from the start of
/// the video; sequence order is temporal order.
#[derive(Serialize, PartialEq, Clone, Debug)]
pub struct TranscriptLine {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// An ordered caption timeline plus the concatenated text the consumer can
/// copy-paste. The join is lossy with respect to original line breaks.
#[derive(Serialize, PartialEq, Clone, Debug)]
pub struct Transcript {
    pub full_text: String,
    pub timeline: Vec<TranscriptLine>,
}

impl Transcript {
    pub fn from_lines(timeline: Vec<TranscriptLine>) -> Self {
        let full_text = timeline
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Transcript {
            full_text,
            timeline,
        }
    }
}

/// One entry of a language preference list: a language tag plus whether it
/// refers to the auto-generated track for that language.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct TrackSelector {
    pub language: String,
    pub generated: bool,
}

/// Ordered language preference. First selector with a matching upstream
/// track wins; tracks are never merged.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct LanguagePreference {
    pub selectors: Vec<TrackSelector>,
}

impl LanguagePreference {
    /// Expands a configured language list into the full search order:
    /// every language as a human track first, then every language as an
    /// auto-generated track. `["en", "de"]` becomes
    /// `en, de, asr:en, asr:de`.
    pub fn for_languages<S: AsRef<str>>(languages: &[S]) -> Self {
        let mut selectors = Vec::with_capacity(languages.len() * 2);
        for generated in [false, true] {
            for lang in languages {
                selectors.push(TrackSelector {
                    language: lang.as_ref().to_string(),
                    generated,
                });
            }
        }
        LanguagePreference { selectors }
    }
}

/// One downloadable rendition, projected from the upstream's raw format
/// entry. Field names match the wire shape the client expects.
#[derive(Serialize, PartialEq, Clone, Debug)]
pub struct FormatRendition {
    /// Human-readable resolution label; "N/A" when the upstream omits it.
    pub resolution: String,
    /// Approximate byte size; 0 when the upstream cannot approximate it.
    pub filesize: u64,
    pub url: String,
    pub ext: String,
}

/// Filtered renditions in upstream enumeration order, plus the video title.
#[derive(Serialize, PartialEq, Clone, Debug)]
pub struct FormatList {
    pub title: Option<String>,
    pub formats: Vec<FormatRendition>,
}
