/// How a settled request ended up in the player area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// An audio element was rendered.
    Playing,
    /// The response body was rendered as text.
    Rendered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestEvent {
    Sent,
    Succeeded(Outcome),
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiState {
    #[default]
    Idle,
    Busy,
    Done(Outcome),
    Error(String),
}

impl UiState {
    /// Settling events apply from any state: with overlapping requests the
    /// first one to finish re-enables the controls.
    pub fn transition(&self, event: RequestEvent) -> UiState {
        match event {
            RequestEvent::Sent => UiState::Busy,
            RequestEvent::Succeeded(outcome) => UiState::Done(outcome),
            RequestEvent::Failed(message) => UiState::Error(message),
        }
    }

    pub fn controls_enabled(&self) -> bool {
        !matches!(self, UiState::Busy)
    }

    pub fn status_text(&self) -> Option<String> {
        match self {
            UiState::Idle => None,
            UiState::Busy => Some("Generating audio...".to_string()),
            UiState::Done(Outcome::Playing) => Some("Playing".to_string()),
            UiState::Done(Outcome::Rendered) => Some("Done".to_string()),
            UiState::Error(message) => Some(format!("Error: {}", message)),
        }
    }
}
