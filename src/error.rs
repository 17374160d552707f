#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reply body is null")]
    NullReply,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Audio playback failed: {0}")]
    #[cfg_attr(not(feature = "audio-playback"), allow(dead_code))]
    Playback(String),
}
