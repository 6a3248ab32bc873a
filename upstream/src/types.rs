//! Request and response models for the `/youtubei/v1/player` surface.

pub mod request {
    pub mod parts {
        use serde::Serialize;
        use smart_default::SmartDefault;

        #[derive(SmartDefault, Serialize, Clone, Copy, Debug)]
        #[serde(rename_all = "camelCase")]
        pub struct ThirdParty<'a> {
            pub embed_url: &'a str,
        }

        #[derive(SmartDefault, Serialize, Clone, Copy, Debug)]
        #[serde(rename_all = "camelCase")]
        pub struct ContextClient<'a> {
            pub client_name: &'a str,
            pub client_version: &'a str,
            pub device_model: Option<&'a str>,
            pub hl: Option<&'a str>,
            #[default = "UTC"]
            pub time_zone: &'a str,
            #[default = 0]
            pub utc_offset_minutes: u8,
        }

        #[derive(SmartDefault, Serialize, Clone, Copy, Debug)]
        #[serde(rename_all = "camelCase")]
        pub struct Context<'a> {
            pub client: ContextClient<'a>,
            pub third_party: Option<ThirdParty<'a>>,
        }
    }

    use serde::Serialize;
    use smart_default::SmartDefault;

    #[derive(SmartDefault, Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    /// `/youtubei/v1/player`
    pub struct Player<'a> {
        pub video_id: String,
        pub context: parts::Context<'a>,
        #[default = true]
        pub content_check_ok: bool,
        #[default = true]
        pub racy_check_ok: bool,
    }
}

pub mod response {
    use serde::Deserialize;
    use serde_aux::prelude::*;

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    /// `/youtubei/v1/player`
    pub struct Player {
        #[serde(default)]
        pub playability_status: PlayabilityStatus,
        pub streaming_data: Option<StreamingData>,
        pub captions: Option<CaptionsWrapper>,
        #[serde(default)]
        pub video_details: VideoDetails,
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct PlayabilityStatus {
        #[serde(default)]
        pub status: String,
        pub reason: Option<String>,
        pub reason_title: Option<String>,
    }

    impl PlayabilityStatus {
        pub fn is_ok(&self) -> bool {
            self.status == "OK"
        }

        /// The sign-in challenge signature: the platform either reports
        /// `LOGIN_REQUIRED` outright or hides it in the reason text
        /// ("Sign in to confirm you're not a bot" and friends).
        pub fn is_blocked(&self) -> bool {
            self.status == "LOGIN_REQUIRED"
                || self
                    .reason
                    .as_deref()
                    .map(|r| r.contains("Sign in"))
                    .unwrap_or(false)
        }

        pub fn describe(&self) -> String {
            match &self.reason {
                Some(reason) => format!("{}: {}", self.status, reason),
                None => self.status.clone(),
            }
        }
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct VideoDetails {
        #[serde(default)]
        pub video_id: String,
        #[serde(default)]
        pub title: String,
        #[serde(default)]
        pub is_live: bool,
    }

    #[derive(Deserialize, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct StreamingData {
        // not present in ios responses
        pub formats: Option<Vec<Format>>,
        // not present in ios_creator responses
        pub adaptive_formats: Option<Vec<Format>>,
    }

    impl StreamingData {
        /// Progressive formats first, then adaptive, preserving the
        /// upstream's enumeration order within each list.
        pub fn into_renditions(self) -> Vec<Format> {
            let mut renditions = self.formats.unwrap_or_default();
            renditions.extend(self.adaptive_formats.unwrap_or_default());
            renditions
        }
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Format {
        /// innertube format id
        #[serde(default)]
        pub itag: u16,
        /// direct download url - absent when the client's formats are
        /// signature-ciphered
        pub url: Option<String>,
        /// bitrate
        pub bitrate: Option<u64>,
        /// mime type, contains the type (audio/video), container and codecs
        #[serde(default)]
        pub mime_type: String,
        /// file size in bytes
        #[serde(deserialize_with = "deserialize_option_number_from_string")]
        #[serde(default)]
        pub content_length: Option<u64>,
        /// human-readable resolution label, e.g. "720p"
        pub quality_label: Option<String>,
        /// video width
        pub width: Option<u32>,
        /// video height
        pub height: Option<u32>,
        /// frames per second
        pub fps: Option<u16>,
        /// audio sample rate
        #[serde(deserialize_with = "deserialize_option_number_from_string")]
        #[serde(default)]
        pub audio_sample_rate: Option<u64>,
        /// amount of audio channels (mono, stereo)
        pub audio_channels: Option<u8>,
    }

    impl Format {
        /// Downloader-style container name derived from the mime type.
        /// Audio-only mp4 is conventionally named m4a so that "mp4" means
        /// a progressive video container.
        pub fn container_ext(&self) -> &str {
            let essence = self
                .mime_type
                .split(';')
                .next()
                .unwrap_or_default()
                .trim();
            match essence {
                "video/mp4" => "mp4",
                "audio/mp4" => "m4a",
                "video/webm" | "audio/webm" => "webm",
                "video/3gpp" => "3gp",
                other => other.rsplit('/').next().unwrap_or(""),
            }
        }

        /// Whether the rendition carries an audio track: an audio mime, a
        /// two-codec (muxed) mime, or explicit audio attributes.
        pub fn has_audio(&self) -> bool {
            self.mime_type.starts_with("audio/")
                // multiple codecs - "video/3gpp; codecs=\"mp4v.20.3, mp4a.40.2\""
                || self.mime_type.contains(", ")
                || self.audio_channels.is_some()
                || self.audio_sample_rate.is_some()
        }
    }

    #[derive(Deserialize, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct CaptionsWrapper {
        pub player_captions_tracklist_renderer: PlayerCaptionsTracklistRenderer,
    }

    #[derive(Deserialize, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct PlayerCaptionsTracklistRenderer {
        pub caption_tracks: Option<Vec<CaptionTrack>>,
    }

    #[derive(Deserialize, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct CaptionTrack {
        pub base_url: String,
        pub language_code: String,
        // Some("asr") - automatic captions
        // None - normal captions
        pub kind: Option<String>,
    }

    impl CaptionTrack {
        pub fn is_generated(&self) -> bool {
            self.kind.as_deref() == Some("asr")
        }
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    /// Timed-text payload in the json3 spelling.
    pub struct TimedText {
        pub events: Option<Vec<TimedTextEvent>>,
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct TimedTextEvent {
        pub t_start_ms: Option<u64>,
        pub d_duration_ms: Option<u64>,
        pub segs: Option<Vec<TimedTextSeg>>,
    }

    #[derive(Deserialize, Default, Clone, Debug)]
    pub struct TimedTextSeg {
        #[serde(default)]
        pub utf8: String,
    }
}

#[cfg(test)]
mod tests {
    use super::response::{Format, PlayabilityStatus};

    fn format(mime: &str) -> Format {
        Format {
            mime_type: mime.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn container_ext_names_follow_downloader_convention() {
        assert_eq!(format("video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"").container_ext(), "mp4");
        assert_eq!(format("audio/mp4; codecs=\"mp4a.40.2\"").container_ext(), "m4a");
        assert_eq!(format("video/webm; codecs=\"vp9\"").container_ext(), "webm");
        assert_eq!(format("video/3gpp; codecs=\"mp4v.20.3, mp4a.40.2\"").container_ext(), "3gp");
    }

    #[test]
    fn muxed_and_audio_mimes_have_audio() {
        assert!(format("video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"").has_audio());
        assert!(format("audio/webm; codecs=\"opus\"").has_audio());
        assert!(!format("video/mp4; codecs=\"avc1.4d401f\"").has_audio());
    }

    #[test]
    fn audio_attributes_mark_audio_even_without_codec_list() {
        let mut fmt = format("video/mp4; codecs=\"avc1.42001E\"");
        fmt.audio_channels = Some(2);
        assert!(fmt.has_audio());
    }

    #[test]
    fn login_required_is_the_blocked_signature() {
        let blocked = PlayabilityStatus {
            status: "LOGIN_REQUIRED".to_string(),
            reason: Some("Sign in to confirm you're not a bot".to_string()),
            reason_title: None,
        };
        assert!(blocked.is_blocked());

        let blocked_by_reason = PlayabilityStatus {
            status: "ERROR".to_string(),
            reason: Some("Sign in to confirm your age".to_string()),
            reason_title: None,
        };
        assert!(blocked_by_reason.is_blocked());

        let ok = PlayabilityStatus {
            status: "OK".to_string(),
            reason: None,
            reason_title: None,
        };
        assert!(ok.is_ok());
        assert!(!ok.is_blocked());
    }

    #[test]
    fn describe_carries_the_reason() {
        let status = PlayabilityStatus {
            status: "UNPLAYABLE".to_string(),
            reason: Some("This video is private".to_string()),
            reason_title: None,
        };
        assert_eq!(status.describe(), "UNPLAYABLE: This video is private");
    }
}
