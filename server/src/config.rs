//! Deployment configuration, read once at process start. The data API
//! credential is optional here on purpose: its absence surfaces as a
//! classified error when the metadata resolver is actually invoked, never
//! as a startup crash.

use std::env;
use std::net::IpAddr;

use anyhow::{anyhow, Context, Result};
use url::Url;

use tubegate_upstream::IdentityProfile;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 10000;
const DEFAULT_LANGUAGES: &str = "en";

pub struct Config {
    pub api_key: Option<String>,
    pub identity: &'static IdentityProfile,
    pub proxy: Option<Url>,
    pub languages: Vec<String>,
    pub host: IpAddr,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        let api_key = env::var("TUBEGATE_API_KEY")
            .ok()
            .filter(|value| !value.is_empty());

        // A misspelled identity name is an operator typo worth failing
        // loudly over, unlike the absent credential above.
        let identity = match env::var("TUBEGATE_CLIENT") {
            Ok(name) => IdentityProfile::by_name(&name)
                .ok_or_else(|| anyhow!("unknown client identity profile: {name}"))?,
            Err(_) => IdentityProfile::default_profile(),
        };

        let proxy = env::var("TUBEGATE_PROXY")
            .ok()
            .filter(|value| !value.is_empty())
            .map(|value| Url::parse(&value))
            .transpose()
            .context("TUBEGATE_PROXY is not a valid URL")?;

        let languages = parse_languages(
            &env::var("TUBEGATE_LANGUAGES").unwrap_or_else(|_| DEFAULT_LANGUAGES.to_string()),
        );

        let host = env::var("TUBEGATE_HOST")
            .unwrap_or_else(|_| DEFAULT_HOST.to_string())
            .parse::<IpAddr>()
            .context("TUBEGATE_HOST is not a valid address")?;
        let port = env::var("TUBEGATE_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Config {
            api_key,
            identity,
            proxy,
            languages,
            host,
            port,
        })
    }
}

fn parse_languages(raw: &str) -> Vec<String> {
    let languages: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();
    if languages.is_empty() {
        vec![DEFAULT_LANGUAGES.to_string()]
    } else {
        languages
    }
}

#[cfg(test)]
mod tests {
    use super::parse_languages;

    #[test]
    fn languages_split_and_trim() {
        assert_eq!(parse_languages("en, de ,fr"), ["en", "de", "fr"]);
    }

    #[test]
    fn empty_language_list_falls_back_to_english() {
        assert_eq!(parse_languages(" , "), ["en"]);
        assert_eq!(parse_languages(""), ["en"]);
    }
}
