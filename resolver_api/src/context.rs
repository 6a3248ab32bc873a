use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::{Client, Proxy};
use url::Url;

/// Builds the outbound HTTP client every upstream conversation goes
/// through: the active identity's user-agent, a weighted Accept-Language
/// built from the configured language list, and the optional proxy egress.
/// Compression is negotiated transparently.
pub fn build_http(
    user_agent: &str,
    languages: &[String],
    proxy: Option<&Url>,
) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    if !languages.is_empty() {
        let weighted = languages
            .iter()
            .enumerate()
            .map(|(i, l)| {
                if i != 0 {
                    format!("{l};q={}", 1.0 - (i as f32 / 10.0))
                } else {
                    l.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(",");
        if let Ok(value) = HeaderValue::from_str(&weighted) {
            headers.insert(ACCEPT_LANGUAGE, value);
        }
    }

    let mut builder = Client::builder()
        .user_agent(user_agent)
        .default_headers(headers);
    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy.as_str())?);
    }
    builder.build()
}
