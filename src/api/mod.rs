pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

pub use client::HttpSpeechApi;

/// Body of `POST /speak`. Unset optional fields are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakRequest {
    pub text: String,
    pub language: String,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
}

/// Parsed body of a `/speak` response.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeakReply {
    /// The server rendered audio at `url`.
    Audio { url: String },
    /// Anything else the server sent back, success or not.
    Other(Value),
}

impl SpeakReply {
    /// A `url` counts when it is truthy in the JavaScript sense; non-string
    /// values are stringified the same way an `src` attribute would be.
    /// A `null` body has no fields to read and is a failure.
    pub fn from_value(value: Value) -> Result<Self, ClientError> {
        if value.is_null() {
            return Err(ClientError::NullReply);
        }

        let url = value.get("url").filter(|url| is_truthy(url)).map(js_string);

        Ok(match url {
            Some(url) => SpeakReply::Audio { url },
            None => SpeakReply::Other(value),
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn js_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(js_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Voice {
    pub id: Option<String>,
    pub name: Option<String>,
    pub languages: Option<Vec<String>>,
}

#[async_trait]
pub trait SpeechApi: Send + Sync + 'static {
    async fn speak(&self, request: &SpeakRequest) -> Result<SpeakReply, ClientError>;
    async fn voices(&self) -> Result<Vec<Voice>, ClientError>;
}
