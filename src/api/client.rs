use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use super::{SpeakReply, SpeakRequest, SpeechApi, Voice};
use crate::error::ClientError;

/// `SpeechApi` over HTTP. Endpoints and audio URLs resolve against `base`.
#[derive(Clone, Debug)]
pub struct HttpSpeechApi {
    client: reqwest::Client,
    base: Url,
}

impl HttpSpeechApi {
    pub fn new(base: Url) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tts-page/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base })
    }

    pub fn resolve(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Download the audio behind an `src` handed out by `/speak`.
    #[cfg_attr(not(feature = "audio-playback"), allow(dead_code))]
    pub async fn fetch_audio(&self, src: &str) -> Result<Vec<u8>, ClientError> {
        let url = self.resolve(src)?;
        tracing::debug!("GET {}", url);

        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechApi for HttpSpeechApi {
    async fn speak(&self, request: &SpeakRequest) -> Result<SpeakReply, ClientError> {
        let url = self.resolve("speak")?;
        tracing::debug!("POST {} ({} chars)", url, request.text.chars().count());

        // Status is not checked, error bodies render like any other reply.
        let response = self.client.post(url).json(request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!("/speak answered {}", status);

        let value: Value = serde_json::from_slice(&body)?;
        SpeakReply::from_value(value)
    }

    async fn voices(&self) -> Result<Vec<Voice>, ClientError> {
        let url = self.resolve("voices")?;
        tracing::debug!("GET {}", url);

        let body = self.client.get(url).send().await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{}/", addr)).unwrap()
    }

    fn request(voice_id: Option<&str>) -> SpeakRequest {
        SpeakRequest {
            text: "Hello".into(),
            language: "en".into(),
            gender: "female".into(),
            voice_id: voice_id.map(str::to_owned),
            rate: None,
            volume: None,
        }
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let api = HttpSpeechApi::new(Url::parse("http://tts.local:8000/api/").unwrap()).unwrap();
        assert_eq!(
            api.resolve("speak").unwrap().as_str(),
            "http://tts.local:8000/api/speak"
        );
        assert_eq!(
            api.resolve("/audio/a.wav").unwrap().as_str(),
            "http://tts.local:8000/audio/a.wav"
        );
        assert_eq!(
            api.resolve("http://other/b.wav").unwrap().as_str(),
            "http://other/b.wav"
        );
    }

    #[tokio::test]
    async fn test_speak_posts_json_body() {
        let seen = Arc::new(Mutex::new(Vec::<Value>::new()));
        let recorder = Arc::clone(&seen);
        let router = Router::new().route(
            "/speak",
            post(move |Json(body): Json<Value>| {
                let recorder = Arc::clone(&recorder);
                async move {
                    recorder.lock().unwrap().push(body);
                    Json(json!({"url": "/audio/1.wav"}))
                }
            }),
        );
        let api = HttpSpeechApi::new(serve(router).await).unwrap();

        let reply = api.speak(&request(None)).await.unwrap();
        assert_eq!(
            reply,
            SpeakReply::Audio {
                url: "/audio/1.wav".into()
            }
        );

        api.speak(&request(Some("v1"))).await.unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen[0].get("voice_id").is_none());
        assert_eq!(seen[1]["voice_id"], "v1");
    }

    #[tokio::test]
    async fn test_speak_error_status_is_a_reply() {
        let router = Router::new().route(
            "/speak",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"detail": "'text' is required"})),
                )
            }),
        );
        let api = HttpSpeechApi::new(serve(router).await).unwrap();

        let reply = api.speak(&request(None)).await.unwrap();
        assert_eq!(
            reply,
            SpeakReply::Other(json!({"detail": "'text' is required"}))
        );
    }

    #[tokio::test]
    async fn test_speak_non_json_body_fails() {
        let router = Router::new().route(
            "/speak",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error") }),
        );
        let api = HttpSpeechApi::new(serve(router).await).unwrap();

        let err = api.speak(&request(None)).await.unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }

    #[tokio::test]
    async fn test_speak_unreachable_server_fails() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpSpeechApi::new(Url::parse(&format!("http://{}/", addr)).unwrap()).unwrap();
        let err = api.speak(&request(None)).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn test_voices_parses_list() {
        let router = Router::new().route(
            "/voices",
            get(|| async {
                Json(json!([
                    {"id": "v1", "name": "Voice One", "languages": ["en", "fr"]},
                    {"name": "Anna"}
                ]))
            }),
        );
        let api = HttpSpeechApi::new(serve(router).await).unwrap();

        let voices = api.voices().await.unwrap();
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].id.as_deref(), Some("v1"));
        assert_eq!(voices[1].name.as_deref(), Some("Anna"));
        assert_eq!(voices[1].languages, None);
    }

    #[tokio::test]
    async fn test_voices_error_object_fails() {
        let router = Router::new().route(
            "/voices",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"detail": "no engine"})),
                )
            }),
        );
        let api = HttpSpeechApi::new(serve(router).await).unwrap();

        assert!(api.voices().await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_audio() {
        let router = Router::new().route("/audio/a.wav", get(|| async { vec![1u8, 2, 3] }));
        let api = HttpSpeechApi::new(serve(router).await).unwrap();

        assert_eq!(api.fetch_audio("/audio/a.wav").await.unwrap(), vec![1, 2, 3]);
        assert!(api.fetch_audio("/audio/missing.wav").await.is_err());
    }
}
