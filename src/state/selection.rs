use serde::{Deserialize, Serialize};

/// Tab of the candidate list screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectedView {
    #[default]
    All,
    Favorites,
}
