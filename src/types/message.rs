use serde::{Deserialize, Serialize};
use serde_json::Value;

/// In-process messages exchanged between the options panel, the background
/// worker and page contexts.
///
/// Serialized as `{ "action": "settingsUpdated", "settings": {...} }` and
/// `{ "action": "incrementFilterCount" }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RuntimeMessage {
    /// Settings were saved; carries the full record as written.
    SettingsUpdated { settings: Value },
    /// Ask the background worker to bump the persisted filter counter.
    IncrementFilterCount,
}

/// A change notification from the storage area.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// Toolbar badge contents derived from the filter counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeState {
    pub text: String,
    pub color: Option<String>,
}

/// Notification shown once after installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub icon_url: String,
}
