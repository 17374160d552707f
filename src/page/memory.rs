use std::sync::Mutex;

use super::{FormValues, Page, PlayerContent, VoiceOption};

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub form: FormValues,
    pub controls_enabled: bool,
    pub status: String,
    pub player: Option<PlayerContent>,
    pub voice_options: Vec<VoiceOption>,
    /// Every status ever set, oldest first.
    pub status_history: Vec<String>,
    pub unmounted: bool,
}

/// A page kept entirely in memory, for driving a controller in tests.
#[derive(Debug)]
pub struct MemoryPage {
    state: Mutex<Snapshot>,
}

impl MemoryPage {
    pub fn new(form: FormValues) -> Self {
        Self {
            state: Mutex::new(Snapshot {
                form,
                controls_enabled: true,
                status: String::new(),
                player: None,
                voice_options: Vec::new(),
                status_history: Vec::new(),
                unmounted: false,
            }),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.lock().unwrap().clone()
    }

    pub fn edit_form(&self, edit: impl FnOnce(&mut FormValues)) {
        edit(&mut self.state.lock().unwrap().form);
    }
}

impl Page for MemoryPage {
    fn form(&self) -> FormValues {
        self.state.lock().unwrap().form.clone()
    }

    fn controls_enabled(&self) -> bool {
        self.state.lock().unwrap().controls_enabled
    }

    fn set_controls_enabled(&self, enabled: bool) {
        self.state.lock().unwrap().controls_enabled = enabled;
    }

    fn set_status(&self, status: &str) {
        let mut state = self.state.lock().unwrap();
        state.status = status.to_string();
        state.status_history.push(status.to_string());
    }

    fn show_player(&self, content: PlayerContent) {
        self.state.lock().unwrap().player = Some(content);
    }

    fn replace_voice_options(&self, options: Vec<VoiceOption>) {
        self.state.lock().unwrap().voice_options = options;
    }

    fn unmounted(&self) {
        self.state.lock().unwrap().unmounted = true;
    }
}
