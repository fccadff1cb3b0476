use serde::{Deserialize, Serialize};

/// Coarse load lifecycle of a screen.
///
/// `Idle → Loading → Success | Error`. Once started, every load result
/// settles the status again (`Success ⇄ Error`); [`LoadStatus::refresh`] is
/// the explicit way back to `Loading`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl LoadStatus {
    pub fn begin_loading(&mut self) -> bool {
        self.transition(|status| matches!(status, LoadStatus::Idle), LoadStatus::Loading)
    }

    pub fn on_loaded(&mut self) -> bool {
        self.transition(LoadStatus::is_started, LoadStatus::Success)
    }

    pub fn on_failed(&mut self, message: impl Into<String>) -> bool {
        self.transition(LoadStatus::is_started, LoadStatus::Error(message.into()))
    }

    pub fn refresh(&mut self) -> bool {
        self.transition(LoadStatus::is_terminal, LoadStatus::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadStatus::Success | LoadStatus::Error(_))
    }

    fn is_started(&self) -> bool {
        !matches!(self, LoadStatus::Idle)
    }

    fn transition(&mut self, allowed: impl Fn(&LoadStatus) -> bool, next: LoadStatus) -> bool {
        if !allowed(&*self) {
            return false;
        }
        tracing::debug!(from = ?self, to = ?next, "Load status transition");
        *self = next;
        true
    }
}
