use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{FormValues, Page, PlayerContent, VoiceOption};
use crate::audio::PlaybackToken;
#[cfg(feature = "audio-playback")]
use crate::api::HttpSpeechApi;

#[derive(Debug)]
struct Elements {
    form: FormValues,
    controls_enabled: bool,
    status: String,
    voice_options: Vec<VoiceOption>,
    playback: Option<PlaybackToken>,
}

/// A page rendered as lines on stdout.
#[derive(Debug)]
pub struct TerminalPage {
    elements: Mutex<Elements>,
    #[cfg(feature = "audio-playback")]
    autoplay: Option<HttpSpeechApi>,
}

impl TerminalPage {
    pub fn new(form: FormValues) -> Self {
        Self {
            elements: Mutex::new(Elements {
                form,
                controls_enabled: true,
                status: String::new(),
                voice_options: Vec::new(),
                playback: None,
            }),
            #[cfg(feature = "audio-playback")]
            autoplay: None,
        }
    }

    /// Play autoplay audio elements locally, fetching them through `api`.
    #[cfg(feature = "audio-playback")]
    pub fn with_autoplay(mut self, api: HttpSpeechApi) -> Self {
        self.autoplay = Some(api);
        self
    }

    fn elements(&self) -> MutexGuard<'_, Elements> {
        self.elements.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update_form(&self, edit: impl FnOnce(&mut FormValues)) {
        edit(&mut self.elements().form);
    }

    /// Select a voice option by value. An empty value always selects "Auto".
    pub fn select_voice(&self, value: &str) -> bool {
        let mut elements = self.elements();
        let known = value.is_empty() || elements.voice_options.iter().any(|o| o.value == value);
        if known {
            elements.form.voice = value.to_string();
        }
        known
    }

    pub fn voice_options(&self) -> Vec<VoiceOption> {
        self.elements().voice_options.clone()
    }

    pub fn status(&self) -> String {
        self.elements().status.clone()
    }

    /// Swap in the playback of a new player content, stopping the old one.
    fn replace_playback(&self, next: Option<PlaybackToken>) {
        let previous = std::mem::replace(&mut self.elements().playback, next);
        if let Some(token) = previous {
            token.cancel();
        }
    }

    #[cfg(test)]
    fn current_playback(&self) -> Option<PlaybackToken> {
        self.elements().playback.clone()
    }

    #[cfg(feature = "audio-playback")]
    fn autoplay(&self, src: &str, token: PlaybackToken) {
        let Some(api) = self.autoplay.clone() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No runtime to play {} on", src);
            return;
        };

        let src = src.to_string();
        runtime.spawn(async move {
            let wav = match api.fetch_audio(&src).await {
                Ok(wav) => wav,
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {}", src, e);
                    return;
                }
            };
            if token.is_cancelled() {
                return;
            }

            let playing = move || crate::audio::play_wav(wav, &token);
            match tokio::task::spawn_blocking(playing).await {
                Ok(Ok(())) => tracing::debug!("Finished playing {}", src),
                Ok(Err(e)) => tracing::error!("Failed to play audio: {}", e),
                Err(e) => tracing::error!("Playback task failed: {}", e),
            }
        });
    }

    #[cfg(not(feature = "audio-playback"))]
    fn autoplay(&self, _src: &str, _token: PlaybackToken) {}
}

impl Page for TerminalPage {
    fn form(&self) -> FormValues {
        self.elements().form.clone()
    }

    fn controls_enabled(&self) -> bool {
        self.elements().controls_enabled
    }

    fn set_controls_enabled(&self, enabled: bool) {
        self.elements().controls_enabled = enabled;
        tracing::trace!("Controls enabled: {}", enabled);
    }

    fn set_status(&self, status: &str) {
        self.elements().status = status.to_string();
        println!("[status] {}", status);
    }

    fn show_player(&self, content: PlayerContent) {
        match content {
            PlayerContent::Audio(audio) => {
                let token = PlaybackToken::default();
                self.replace_playback(Some(token.clone()));
                println!("[player] audio {}", audio.src);
                if audio.autoplay {
                    self.autoplay(&audio.src, token);
                }
            }
            PlayerContent::Text(text) => {
                self.replace_playback(None);
                println!("[player] {}", text);
            }
        }
    }

    fn replace_voice_options(&self, options: Vec<VoiceOption>) {
        let mut elements = self.elements();
        if !options.iter().any(|o| o.value == elements.form.voice) {
            elements.form.voice.clear();
        }
        elements.voice_options = options;
    }

    fn unmounted(&self) {
        self.replace_playback(None);
    }
}
