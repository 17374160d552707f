use reqwest::Url;

use crate::error::ClientError;
use crate::page::FormValues;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000/";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL that `speak`, `voices` and audio paths resolve against.
    pub server_url: Url,
    pub language: String,
    pub gender: String,
    pub autoplay: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let server_url = parse_server_url(
            &lookup("TTS_SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
        )?;
        let language = lookup("TTS_LANGUAGE").unwrap_or_else(|| "en".to_string());
        let gender = lookup("TTS_GENDER").unwrap_or_else(|| "female".to_string());
        let autoplay = match lookup("TTS_AUTOPLAY") {
            Some(raw) => parse_bool("TTS_AUTOPLAY", &raw)?,
            None => true,
        };

        Ok(Self {
            server_url,
            language,
            gender,
            autoplay,
        })
    }

    /// Form contents before the user touches anything.
    pub fn initial_form(&self) -> FormValues {
        FormValues {
            language: self.language.clone(),
            gender: self.gender.clone(),
            ..FormValues::default()
        }
    }
}

fn parse_server_url(raw: &str) -> Result<Url, ClientError> {
    let mut raw = raw.trim().to_string();
    // Without the slash, joining "speak" would replace the last path segment.
    if !raw.ends_with('/') {
        raw.push('/');
    }

    let url = Url::parse(&raw).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ClientError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            raw, scheme
        ))),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ClientError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ClientError::Config(format!(
            "{} must be true or false, got '{}'",
            key, raw
        ))),
    }
}
