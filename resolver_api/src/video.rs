use once_cell::sync::Lazy;
use url::Url;

static HOSTS_MAIN: Lazy<Vec<&str>> = Lazy::new(|| {
    vec![
        "youtube.com",
        "www.youtube.com",
        "m.youtube.com",
        "music.youtube.com",
    ]
});

static HOSTS_SHORT: Lazy<Vec<&str>> = Lazy::new(|| vec!["youtu.be", "y2u.be"]);

/// A caller-supplied reference to a single video: either the bare opaque
/// identifier or a locator URL in any of the upstream's spellings. Parsed
/// once at the boundary into the canonical identifier.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct VideoRef {
    id: String,
}

impl VideoRef {
    /// Accepts a bare video id or a watch/shorts/video/shortener URL.
    pub fn parse(input: &str) -> Option<VideoRef> {
        let input = input.trim();
        if is_plain_id(input) {
            return Some(VideoRef {
                id: input.to_string(),
            });
        }
        let url = Url::parse(input).ok()?;
        match url.scheme() {
            "http" | "https" => {}
            _ => return None,
        }
        let host = url.host_str()?;
        let mut segments = url.path_segments()?;
        let first_segment = segments.next()?;
        let id = if HOSTS_MAIN.contains(&host) {
            match first_segment {
                "watch" => url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.to_string())?,
                "video" | "shorts" | "embed" => segments.next()?.to_string(),
                _ => return None,
            }
        } else if HOSTS_SHORT.contains(&host) {
            first_segment.to_string()
        } else {
            return None;
        };
        is_plain_id(&id).then_some(VideoRef { id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

fn is_plain_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
