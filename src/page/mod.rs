#[cfg(test)]
pub mod memory;
pub mod terminal;

pub use terminal::TerminalPage;

/// Values of the `text`, `language`, `gender` and `voices` inputs, plus the
/// optional speech rate and volume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    pub text: String,
    pub language: String,
    pub gender: String,
    /// Selected voice option value. Empty means "Auto".
    pub voice: String,
    pub rate: Option<u32>,
    pub volume: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioElement {
    pub src: String,
    pub autoplay: bool,
    pub controls: bool,
}

/// What the `player` area currently holds.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerContent {
    Audio(AudioElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceOption {
    pub value: String,
    pub label: String,
}

/// The elements a `PageController` reads from and renders into.
///
/// Implementations own their element state and are shared between tasks,
/// so every method takes `&self`.
pub trait Page: Send + Sync + 'static {
    fn form(&self) -> FormValues;

    /// Whether the `speak` and `preview` buttons accept clicks.
    fn controls_enabled(&self) -> bool;
    fn set_controls_enabled(&self, enabled: bool);

    fn set_status(&self, status: &str);

    /// Replace the contents of the `player` area.
    fn show_player(&self, content: PlayerContent);

    /// Replace every option of the `voices` selector.
    fn replace_voice_options(&self, options: Vec<VoiceOption>);

    /// Called once the controller's listeners are gone.
    fn unmounted(&self) {}
}
