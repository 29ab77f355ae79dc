// calmfeed Background Worker
// Install-time defaults, toolbar badge, and the persisted filter counter.

use serde_json::Value;
use tracing::{debug, info};

use crate::services::settings_bridge::{SettingsBridge, SETTINGS_KEY};
use crate::types::errors::StorageError;
use crate::types::message::{BadgeState, Notification, RuntimeMessage, StorageChange};
use crate::types::settings::Settings;

/// Badge background colour when the counter is non-zero.
pub const BADGE_COLOR: &str = "#667eea";

const WELCOME_TITLE: &str = "calmfeed is on \u{1F6E1}\u{FE0F}";
const WELCOME_MESSAGE: &str =
    "Your feed shield is now active. Browse with peace of mind.";
const WELCOME_ICON: &str = "icons/icon128.png";

/// Badge for a settings record: the count when above zero, else blank.
pub fn badge_for(settings: &Settings) -> BadgeState {
    if settings.filter_count > 0 {
        BadgeState {
            text: settings.filter_count.to_string(),
            color: Some(BADGE_COLOR.to_string()),
        }
    } else {
        BadgeState {
            text: String::new(),
            color: None,
        }
    }
}

/// Trait defining the background worker interface.
pub trait BackgroundTrait {
    /// Seeds default settings if none are stored and returns the welcome notification.
    fn on_installed(&self) -> Result<Notification, StorageError>;
    /// Badge to show for a storage change, if it touched the settings record.
    fn on_storage_change(&self, change: &StorageChange) -> Option<BadgeState>;
    /// Handles a runtime message. Returns the settings written, if any.
    fn handle_message(&self, message: &RuntimeMessage) -> Result<Option<Settings>, StorageError>;
    /// Badge for whatever is stored now.
    fn current_badge(&self) -> BadgeState;
}

/// The extension's long-lived background worker.
pub struct BackgroundWorker {
    bridge: SettingsBridge,
}

impl BackgroundWorker {
    pub fn new(bridge: SettingsBridge) -> Self {
        Self { bridge }
    }
}

impl BackgroundTrait for BackgroundWorker {
    fn on_installed(&self) -> Result<Notification, StorageError> {
        if self.bridge.load()?.is_none() {
            self.bridge.save(&Settings::default())?;
            info!("stored default settings");
        }
        Ok(Notification {
            title: WELCOME_TITLE.to_string(),
            message: WELCOME_MESSAGE.to_string(),
            icon_url: WELCOME_ICON.to_string(),
        })
    }

    fn on_storage_change(&self, change: &StorageChange) -> Option<BadgeState> {
        if change.key != SETTINGS_KEY {
            return None;
        }
        let record = change.new_value.as_ref()?;
        let count = record.get("filterCount").and_then(Value::as_u64).unwrap_or(0);
        let mut settings = Settings::default();
        settings.filter_count = count;
        Some(badge_for(&settings))
    }

    fn handle_message(&self, message: &RuntimeMessage) -> Result<Option<Settings>, StorageError> {
        match message {
            RuntimeMessage::IncrementFilterCount => {
                let Some(mut settings) = self.bridge.load()? else {
                    debug!("no settings record, counter not incremented");
                    return Ok(None);
                };
                settings.filter_count += 1;
                self.bridge.save(&settings)?;
                Ok(Some(settings))
            }
            RuntimeMessage::SettingsUpdated { .. } => Ok(None),
        }
    }

    fn current_badge(&self) -> BadgeState {
        badge_for(&self.bridge.load_or_default())
    }
}
