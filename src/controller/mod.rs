pub mod state;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};

use crate::api::{SpeakReply, SpeakRequest, SpeechApi, Voice};
use crate::page::{AudioElement, FormValues, Page, PlayerContent, VoiceOption};

pub use state::{Outcome, RequestEvent, UiState};

pub const PREVIEW_TEXT: &str = "This is a sample preview.";
pub const AUTO_VOICE_LABEL: &str = "Auto (language/gender heuristics)";

const VOICES_LOADED: &str = "Voices loaded";
const VOICES_FAILED: &str = "Failed to load voices";

/// A click on one of the page's action buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Speak,
    Preview,
}

enum PageEvent {
    Click(Action),
    /// Answered once every earlier event has been handled.
    Flush(oneshot::Sender<()>),
}

struct Inner<A, P> {
    api: A,
    page: P,
    state: watch::Sender<UiState>,
}

/// Drives a `Page` against a `SpeechApi`.
///
/// Cloning is cheap and every clone controls the same page.
pub struct PageController<A, P> {
    inner: Arc<Inner<A, P>>,
}

impl<A, P> Clone for PageController<A, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: SpeechApi, P: Page> PageController<A, P> {
    pub fn new(api: A, page: P) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                page,
                state: watch::channel(UiState::default()).0,
            }),
        }
    }

    pub fn page(&self) -> &P {
        &self.inner.page
    }

    pub fn state(&self) -> UiState {
        self.inner.state.borrow().clone()
    }

    /// Resolves once no request started from the page is in flight.
    pub async fn wait_idle(&self) {
        let mut state = self.inner.state.subscribe();
        let _ = state.wait_for(UiState::controls_enabled).await;
    }

    fn apply(&self, event: RequestEvent) {
        // The page is written under the state lock so the two never disagree.
        self.inner.state.send_modify(|state| {
            *state = state.transition(event);
            self.inner.page.set_controls_enabled(state.controls_enabled());
            if let Some(status) = state.status_text() {
                self.inner.page.set_status(&status);
            }
        });
    }

    /// Send one synthesis request and render whatever comes back.
    pub async fn submit_speak(&self, request: SpeakRequest) {
        self.apply(RequestEvent::Sent);
        self.complete(request).await;
    }

    async fn complete(&self, request: SpeakRequest) {
        match self.inner.api.speak(&request).await {
            Ok(SpeakReply::Audio { url }) => {
                tracing::info!("Audio ready at {}", url);
                self.inner.page.show_player(PlayerContent::Audio(AudioElement {
                    src: url,
                    autoplay: true,
                    controls: true,
                }));
                self.apply(RequestEvent::Succeeded(Outcome::Playing));
            }
            Ok(SpeakReply::Other(body)) => {
                // Error payloads land here too and are shown as plain "Done".
                tracing::debug!("Speak reply without url: {}", body);
                self.inner
                    .page
                    .show_player(PlayerContent::Text(body.to_string()));
                self.apply(RequestEvent::Succeeded(Outcome::Rendered));
            }
            Err(e) => {
                tracing::warn!("Speak request failed: {}", e);
                self.apply(RequestEvent::Failed(e.to_string()));
            }
        }
    }

    pub fn speak_request(&self) -> SpeakRequest {
        let form = self.inner.page.form();
        let text = form.text.clone();
        request_from(form, text)
    }

    pub fn preview_request(&self) -> SpeakRequest {
        request_from(self.inner.page.form(), PREVIEW_TEXT.to_string())
    }

    pub async fn trigger_speak(&self) {
        let request = self.speak_request();
        self.submit_speak(request).await;
    }

    pub async fn trigger_preview(&self) {
        let request = self.preview_request();
        self.submit_speak(request).await;
    }

    pub async fn load_voices(&self) {
        match self.inner.api.voices().await {
            Ok(voices) => {
                tracing::info!("Loaded {} voices", voices.len());
                self.inner
                    .page
                    .replace_voice_options(voice_options(&voices));
                self.inner.page.set_status(VOICES_LOADED);
            }
            Err(e) => {
                tracing::warn!("Failed to load voices: {}", e);
                self.inner.page.set_status(VOICES_FAILED);
            }
        }
    }

    /// Register the button listeners and start loading voices.
    ///
    /// Everything started here stops when the returned handle is unmounted
    /// or dropped.
    pub fn mount(&self) -> Mounted {
        let (events, mut rx) = mpsc::unbounded_channel();
        let controller = self.clone();

        let listener = tokio::spawn(async move {
            let mut tasks = JoinSet::new();

            let loader = controller.clone();
            tasks.spawn(async move { loader.load_voices().await });

            loop {
                tokio::select! {
                    event = rx.recv() => match event {
                        Some(PageEvent::Click(action)) => controller.on_click(action, &mut tasks),
                        Some(PageEvent::Flush(done)) => {
                            let _ = done.send(());
                        }
                        None => break,
                    },
                    Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                        if let Err(e) = joined {
                            if e.is_panic() {
                                tracing::error!("Page task panicked: {}", e);
                            }
                        }
                    }
                }
            }

            while tasks.join_next().await.is_some() {}
        });

        let page = self.clone();
        tracing::debug!("Page mounted");
        Mounted {
            events,
            listener,
            teardown: Some(Box::new(move || page.inner.page.unmounted())),
        }
    }

    fn on_click(&self, action: Action, tasks: &mut JoinSet<()>) {
        if !self.inner.page.controls_enabled() {
            tracing::debug!("Ignoring {:?} click while controls are disabled", action);
            return;
        }

        let request = match action {
            Action::Speak => self.speak_request(),
            Action::Preview => self.preview_request(),
        };

        // Disable before yielding so a second click sees the buttons off.
        self.apply(RequestEvent::Sent);

        let controller = self.clone();
        tasks.spawn(async move { controller.complete(request).await });
    }
}

/// Listener registrations of a mounted `PageController`.
pub struct Mounted {
    events: mpsc::UnboundedSender<PageEvent>,
    listener: JoinHandle<()>,
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Mounted {
    pub fn click(&self, action: Action) {
        if self.events.send(PageEvent::Click(action)).is_err() {
            tracing::debug!("Dropping {:?} click, page is not listening", action);
        }
    }

    /// Wait until every click sent so far has been accepted or ignored.
    pub async fn flush(&self) {
        let (done, handled) = oneshot::channel();
        if self.events.send(PageEvent::Flush(done)).is_ok() {
            let _ = handled.await;
        }
    }

    /// Remove the listeners and abort in-flight requests.
    pub async fn unmount(mut self) {
        self.listener.abort();
        let _ = (&mut self.listener).await;
        self.teardown();
        tracing::debug!("Page unmounted");
    }

    fn teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Mounted {
    fn drop(&mut self) {
        self.listener.abort();
        self.teardown();
    }
}

fn request_from(form: FormValues, text: String) -> SpeakRequest {
    SpeakRequest {
        text,
        language: form.language,
        gender: form.gender,
        voice_id: Some(form.voice).filter(|voice| !voice.is_empty()),
        rate: form.rate,
        volume: form.volume,
    }
}

/// Selector options for a voice list, led by the "Auto" option.
pub fn voice_options(voices: &[Voice]) -> Vec<VoiceOption> {
    let mut options = vec![VoiceOption {
        value: String::new(),
        label: AUTO_VOICE_LABEL.to_string(),
    }];

    for voice in voices {
        let id = non_empty(&voice.id);
        let name = non_empty(&voice.name);

        let (Some(value), Some(title)) = (id.or(name), name.or(id)) else {
            tracing::debug!("Skipping voice without id or name");
            continue;
        };

        let mut label = title.to_string();
        if let Some(languages) = voice.languages.as_ref().filter(|l| !l.is_empty()) {
            label.push_str(" - ");
            label.push_str(&languages.join(", "));
        }

        options.push(VoiceOption {
            value: value.to_string(),
            label,
        });
    }

    options
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
