//! Settings Sync Bridge for calmfeed.
//!
//! Reads and writes the single persisted settings record and turns storage
//! change notifications into a stream of settings updates.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

use crate::services::storage_area::StorageAreaTrait;
use crate::types::errors::StorageError;
use crate::types::message::StorageChange;
use crate::types::settings::Settings;

/// Storage key the settings record lives under.
pub const SETTINGS_KEY: &str = "settings";

/// Typed access to the settings record in a storage area.
#[derive(Clone)]
pub struct SettingsBridge {
    storage: Arc<dyn StorageAreaTrait>,
}

impl SettingsBridge {
    pub fn new(storage: Arc<dyn StorageAreaTrait>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn StorageAreaTrait> {
        &self.storage
    }

    /// The stored record merged onto defaults, or `None` if nothing is stored.
    pub fn load(&self) -> Result<Option<Settings>, StorageError> {
        Ok(self
            .storage
            .get(SETTINGS_KEY)?
            .map(|record| Settings::from_record(&record)))
    }

    /// Like [`load`](Self::load) but never fails.
    pub fn load_or_default(&self) -> Settings {
        match self.load() {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!(error = %e, "could not load settings, using defaults");
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        self.storage
            .set(SETTINGS_KEY, serde_json::to_value(settings)?)
    }

    /// Saves without reporting failure to the caller.
    pub fn save_logged(&self, settings: &Settings) {
        if let Err(e) = self.save(settings) {
            warn!(error = %e, "could not save settings");
        }
    }

    pub fn subscribe(&self) -> SettingsChanges {
        SettingsChanges {
            rx: self.storage.subscribe(),
        }
    }
}

/// Settings-key changes from a storage area.
pub struct SettingsChanges {
    rx: broadcast::Receiver<StorageChange>,
}

impl SettingsChanges {
    /// Next change to the settings key. `None` once the storage area is gone.
    pub async fn recv(&mut self) -> Option<StorageChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.key == SETTINGS_KEY => return Some(change),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "settings subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next queued settings change, without waiting.
    pub fn try_recv(&mut self) -> Option<StorageChange> {
        loop {
            match self.rx.try_recv() {
                Ok(change) if change.key == SETTINGS_KEY => return Some(change),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "settings subscriber lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
