use serde::{Deserialize, Serialize};

/// Display preferences, persisted separately from list data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Hide items whose `completed` flag is set from the projected view.
    #[serde(default)]
    pub hide_completed_items: bool,
}
