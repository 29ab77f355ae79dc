//! Page context: the per-page runtime around a [`ScanEngine`].
//!
//! Owns the engine for one document and services its three inputs in
//! priority order: mutation batches, settings changes from storage, and
//! messages relayed from the options panel.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::dom::{Document, MutationBatch, NodeId, ObserverHandle};
use crate::services::scan_engine::{ClickOutcome, ScanEngine, ScanEngineTrait, ScanReport, SettingsReaction};
use crate::services::settings_bridge::{SettingsBridge, SettingsChanges};
use crate::types::errors::DomError;
use crate::types::message::RuntimeMessage;

/// Document shared between a page context and whatever drives the page.
pub type SharedDocument = Arc<Mutex<Document>>;

fn lock(doc: &SharedDocument) -> MutexGuard<'_, Document> {
    doc.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn next_batch(observer: Option<&mut ObserverHandle>) -> Option<MutationBatch> {
    match observer {
        Some(handle) => handle.next_batch().await,
        None => std::future::pending().await,
    }
}

pub struct PageContext {
    tab_id: String,
    doc: SharedDocument,
    engine: ScanEngine,
    bridge: SettingsBridge,
    changes: SettingsChanges,
    messages: UnboundedReceiver<RuntimeMessage>,
}

impl PageContext {
    /// Builds a context whose engine starts from the stored settings.
    pub fn new(
        tab_id: String,
        doc: SharedDocument,
        bridge: SettingsBridge,
        messages: UnboundedReceiver<RuntimeMessage>,
    ) -> Self {
        let engine = ScanEngine::new(bridge.load_or_default());
        Self::with_engine(tab_id, doc, bridge, messages, engine)
    }

    pub fn with_engine(
        tab_id: String,
        doc: SharedDocument,
        bridge: SettingsBridge,
        messages: UnboundedReceiver<RuntimeMessage>,
        engine: ScanEngine,
    ) -> Self {
        let changes = bridge.subscribe();
        Self {
            tab_id,
            doc,
            engine,
            bridge,
            changes,
            messages,
        }
    }

    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    pub fn engine(&self) -> &ScanEngine {
        &self.engine
    }

    /// Initial scan, when filtering is enabled.
    pub fn boot(&mut self) -> ScanReport {
        if !self.engine.settings().enabled {
            info!(tab = %self.tab_id, "filtering disabled, not scanning");
            return ScanReport::default();
        }
        let report = self.engine.start(&mut lock(&self.doc));
        self.persist_if_filtered(&report);
        report
    }

    /// Processes a batch of mutation records.
    pub fn on_batch(&mut self, batch: &MutationBatch) -> ScanReport {
        let report = self.engine.handle_batch(&mut lock(&self.doc), batch);
        self.persist_if_filtered(&report);
        report
    }

    /// Merges a settings record onto the engine's settings and reacts.
    pub fn on_settings(&mut self, record: &Value) -> SettingsReaction {
        let old = self.engine.settings().clone();
        let new = old.merged(record);
        let reaction = self
            .engine
            .apply_settings_change(&mut lock(&self.doc), &old, &new);
        match &reaction {
            SettingsReaction::Started(report) | SettingsReaction::Rescanned(report) => {
                self.persist_if_filtered(report)
            }
            SettingsReaction::Stopped { restored } => {
                debug!(tab = %self.tab_id, restored, "filtering stopped by settings");
            }
            SettingsReaction::Unchanged => {}
        }
        reaction
    }

    pub fn on_message(&mut self, message: &RuntimeMessage) -> Option<SettingsReaction> {
        match message {
            RuntimeMessage::SettingsUpdated { settings } => Some(self.on_settings(settings)),
            RuntimeMessage::IncrementFilterCount => {
                debug!(tab = %self.tab_id, "ignoring message meant for the background worker");
                None
            }
        }
    }

    /// Dispatches a click on the page.
    pub fn click(&mut self, target: NodeId) -> Result<ClickOutcome, DomError> {
        self.engine.handle_click(&mut lock(&self.doc), target)
    }

    fn persist_if_filtered(&self, report: &ScanReport) {
        if !report.filtered.is_empty() {
            self.bridge.save_logged(self.engine.settings());
        }
    }

    /// Services the page until the relay channel closes, then returns the
    /// engine as it was left.
    pub async fn run(mut self) -> ScanEngine {
        let mut storage_open = true;
        loop {
            tokio::select! {
                biased;
                batch = next_batch(self.engine.observer_mut()) => match batch {
                    Some(batch) => {
                        self.on_batch(&batch);
                    }
                    None => self.engine.drop_observer(),
                },
                change = self.changes.recv(), if storage_open => match change {
                    Some(change) => {
                        if let Some(record) = change.new_value {
                            self.on_settings(&record);
                        }
                    }
                    None => storage_open = false,
                },
                message = self.messages.recv() => match message {
                    Some(message) => {
                        self.on_message(&message);
                    }
                    None => break,
                },
            }
        }
        info!(tab = %self.tab_id, "page context closed");
        self.engine
    }
}
