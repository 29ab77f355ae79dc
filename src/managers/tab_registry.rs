use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;
use uuid::Uuid;

use crate::types::errors::RelayError;
use crate::types::message::RuntimeMessage;

/// A page context that runtime messages can be relayed to.
#[derive(Debug)]
pub struct TabEntry {
    pub id: String,
    pub url: String,
    pub opened_at: i64,
    tx: UnboundedSender<RuntimeMessage>,
}

/// Trait defining the tab registry interface.
pub trait TabRegistryTrait {
    /// Registers a page context. Returns its id and the receiving end of its
    /// message channel.
    fn open_tab(&mut self, url: &str, active: bool) -> (String, UnboundedReceiver<RuntimeMessage>);
    fn close_tab(&mut self, tab_id: &str) -> bool;
    fn activate(&mut self, tab_id: &str) -> bool;
    fn active_tab(&self) -> Option<&TabEntry>;
    fn get_tab(&self, tab_id: &str) -> Option<&TabEntry>;
    fn tab_count(&self) -> usize;
    /// Delivers a message to the active page context.
    fn send_to_active(&self, message: RuntimeMessage) -> Result<String, RelayError>;
}

/// In-memory registry of open page contexts.
pub struct TabRegistry {
    tabs: Vec<TabEntry>,
    active_tab_id: Option<String>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
        }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }
}

impl Default for TabRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TabRegistryTrait for TabRegistry {
    fn open_tab(&mut self, url: &str, active: bool) -> (String, UnboundedReceiver<RuntimeMessage>) {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        self.tabs.push(TabEntry {
            id: id.clone(),
            url: url.to_string(),
            opened_at: Self::now(),
            tx,
        });
        if active || self.active_tab_id.is_none() {
            self.active_tab_id = Some(id.clone());
        }
        (id, rx)
    }

    /// Closing the active tab activates the most recently opened remaining one.
    fn close_tab(&mut self, tab_id: &str) -> bool {
        let Some(idx) = self.tabs.iter().position(|t| t.id == tab_id) else {
            return false;
        };
        self.tabs.remove(idx);
        if self.active_tab_id.as_deref() == Some(tab_id) {
            self.active_tab_id = self.tabs.last().map(|t| t.id.clone());
        }
        true
    }

    fn activate(&mut self, tab_id: &str) -> bool {
        if self.tabs.iter().any(|t| t.id == tab_id) {
            self.active_tab_id = Some(tab_id.to_string());
            true
        } else {
            false
        }
    }

    fn active_tab(&self) -> Option<&TabEntry> {
        let id = self.active_tab_id.as_deref()?;
        self.get_tab(id)
    }

    fn get_tab(&self, tab_id: &str) -> Option<&TabEntry> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    fn send_to_active(&self, message: RuntimeMessage) -> Result<String, RelayError> {
        let tab = self.active_tab().ok_or(RelayError::NoActiveTab)?;
        tab.tx
            .send(message)
            .map_err(|_| RelayError::NoReceiver(tab.id.clone()))?;
        debug!(tab = %tab.id, "relayed message");
        Ok(tab.id.clone())
    }
}
