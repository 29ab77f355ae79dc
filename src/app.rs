//! App Core for calmfeed.
//!
//! Central struct holding the storage area and the extension-wide services:
//! background worker, tab registry and options panel.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::database::connection::{Database, DATABASE_FILE};
use crate::managers::options_panel::{OptionsPanel, OptionsPanelTrait};
use crate::managers::tab_registry::{TabRegistry, TabRegistryTrait};
use crate::platform;
use crate::services::background::{BackgroundTrait, BackgroundWorker};
use crate::services::page_context::{PageContext, SharedDocument};
use crate::services::settings_bridge::SettingsBridge;
use crate::services::storage_area::{SqliteStorageArea, StorageAreaTrait};
use crate::types::errors::StorageError;
use crate::types::message::{Notification, RuntimeMessage};

/// Central application struct holding all managers and services.
pub struct App {
    pub storage: Arc<dyn StorageAreaTrait>,
    pub bridge: SettingsBridge,
    pub background: BackgroundWorker,
    pub tabs: TabRegistry,
    pub options: OptionsPanel,
}

impl App {
    /// Opens the storage database at `db_path`.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::open(db_path)?;
        info!(path = db_path, "opened storage");
        Ok(Self::with_storage(Arc::new(SqliteStorageArea::new(db))))
    }

    /// An app over a throwaway in-memory database.
    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self::with_storage(Arc::new(SqliteStorageArea::in_memory()?)))
    }

    pub fn with_storage(storage: Arc<dyn StorageAreaTrait>) -> Self {
        let bridge = SettingsBridge::new(storage.clone());
        Self {
            background: BackgroundWorker::new(bridge.clone()),
            options: OptionsPanel::open(bridge.clone()),
            tabs: TabRegistry::new(),
            bridge,
            storage,
        }
    }

    /// Where the storage database lives by default.
    pub fn default_db_path() -> PathBuf {
        platform::resolve_data_dir().join(DATABASE_FILE)
    }

    /// Install-time setup: seeds defaults and refreshes the options panel.
    pub fn install(&mut self) -> Result<Notification, StorageError> {
        let notification = self.background.on_installed()?;
        self.options.reload();
        Ok(notification)
    }

    /// Registers a page and builds its context. The caller drives it with
    /// [`PageContext::boot`] and [`PageContext::run`].
    pub fn open_page(&mut self, url: &str, doc: SharedDocument, active: bool) -> PageContext {
        let (tab_id, messages) = self.tabs.open_tab(url, active);
        debug!(tab = %tab_id, url, "page opened");
        PageContext::new(tab_id, doc, self.bridge.clone(), messages)
    }

    /// Routes a runtime message: counter updates go to the background
    /// worker, settings updates to the active page.
    pub fn dispatch(&mut self, message: RuntimeMessage) -> Result<(), StorageError> {
        match message {
            RuntimeMessage::IncrementFilterCount => {
                self.background.handle_message(&message)?;
                self.options.reload();
            }
            RuntimeMessage::SettingsUpdated { .. } => {
                if let Err(e) = self.tabs.send_to_active(message) {
                    debug!(reason = %e, "settings update not relayed");
                }
            }
        }
        Ok(())
    }
}
