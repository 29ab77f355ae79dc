//! Scan & Watch Engine for calmfeed.
//!
//! Performs the initial scan of a document, keeps a single mutation
//! subscription alive while filtering is on, and restores or re-evaluates
//! content when settings change.
//!
//! Every scan target is marked with [`CHECKED_ATTR`] before it is
//! classified, so a node is processed once no matter how many scans,
//! batches or restarts see it. Only [`ScanEngineTrait::rescan`] and
//! [`ScanEngineTrait::stop`] clear the marker.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, warn};

use crate::dom::{ClickAction, Document, MutationBatch, Node, NodeId, ObserverHandle, SelectorList};
use crate::services::classifier::{Classifier, ClassifierTrait};
use crate::services::placeholder_builder;
use crate::types::category::Category;
use crate::types::errors::DomError;
use crate::types::placeholder::{Placeholder, SHIELD_CLASS};
use crate::types::settings::Settings;

/// Idempotence marker set on every scan target once it has been examined.
pub const CHECKED_ATTR: &str = "data-calmfeed-checked";

/// Feed-item selectors per host platform.
pub const PLATFORM_SELECTORS: &[(&str, &str)] = &[
    ("twitter", r#"[data-testid="tweet"]"#),
    ("reddit", r#".Post, [data-test-id="post-content"]"#),
    (
        "youtube",
        "ytd-video-renderer, ytd-grid-video-renderer, ytd-compact-video-renderer",
    ),
    ("facebook", r#"[data-pagelet*="FeedUnit"]"#),
    ("general", "article, .post, .entry, .story"),
];

fn parse_builtin(source: &str) -> SelectorList {
    source
        .parse()
        .unwrap_or_else(|e| panic!("invalid built-in selector {:?}: {}", source, e))
}

static FEED_SELECTORS: Lazy<SelectorList> = Lazy::new(|| {
    let joined = PLATFORM_SELECTORS
        .iter()
        .map(|(_, s)| *s)
        .collect::<Vec<_>>()
        .join(", ");
    parse_builtin(&joined)
});

static CHECKED_SELECTOR: Lazy<SelectorList> =
    Lazy::new(|| parse_builtin(&format!("[{}]", CHECKED_ATTR)));

static SHIELD_SELECTOR: Lazy<SelectorList> =
    Lazy::new(|| parse_builtin(&format!(".{}", SHIELD_CLASS)));

/// The union of all platform selectors.
pub fn feed_selectors() -> &'static SelectorList {
    &FEED_SELECTORS
}

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Scanning,
    Watching,
}

/// What one scan pass or mutation batch did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Targets classified during the pass.
    pub examined: usize,
    /// New placeholders and the category each was filtered under.
    pub filtered: Vec<(NodeId, Category)>,
}

impl ScanReport {
    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    fn absorb(&mut self, other: ScanReport) {
        self.examined += other.examined;
        self.filtered.extend(other.filtered);
    }
}

/// Result of dispatching a click through the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    /// Host-page handlers that fired, in bubbling order.
    pub host_actions: Vec<String>,
    /// The restored original, when a reveal control was activated.
    pub revealed: Option<NodeId>,
}

/// How the engine reacted to a settings change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsReaction {
    Started(ScanReport),
    Stopped { restored: usize },
    Rescanned(ScanReport),
    Unchanged,
}

/// Trait defining the scan & watch engine operations.
pub trait ScanEngineTrait {
    /// Tears down any existing subscription, scans the whole document and
    /// subscribes to further insertions.
    fn start(&mut self, doc: &mut Document) -> ScanReport;
    /// Drops the subscription and swaps every live placeholder back for its
    /// original. Returns the number restored.
    fn stop(&mut self, doc: &mut Document) -> usize;
    /// Clears the checked marker on every non-placeholder target and
    /// classifies it again. Existing placeholders are left alone.
    fn rescan(&mut self, doc: &mut Document) -> ScanReport;
    /// Processes one batch of mutation records: forgets placeholders the page
    /// removed and filters added targets.
    fn handle_batch(&mut self, doc: &mut Document, batch: &MutationBatch) -> ScanReport;
    /// Drains and processes whatever the subscription has queued.
    fn process_pending(&mut self, doc: &mut Document) -> ScanReport;
    /// Dispatches a click, performing any reveal it triggers.
    fn handle_click(&mut self, doc: &mut Document, target: NodeId) -> Result<ClickOutcome, DomError>;
    /// Swaps a placeholder back for its retained original.
    fn reveal(&mut self, doc: &mut Document, shield: NodeId) -> Result<Option<NodeId>, DomError>;
    /// Adopts `new` and reacts to what changed relative to `old`.
    fn apply_settings_change(&mut self, doc: &mut Document, old: &Settings, new: &Settings) -> SettingsReaction;
    fn state(&self) -> EngineState;
    fn settings(&self) -> &Settings;
    fn placeholder(&self, shield: NodeId) -> Option<&Placeholder>;
    fn placeholder_count(&self) -> usize;
}

/// Scan & watch engine for one page.
pub struct ScanEngine {
    settings: Settings,
    classifier: Classifier,
    selectors: SelectorList,
    state: EngineState,
    observer: Option<ObserverHandle>,
    placeholders: BTreeMap<NodeId, Placeholder>,
    rng: Box<dyn RngCore + Send>,
}

impl ScanEngine {
    pub fn new(settings: Settings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    /// Uses the given random source for placeholder visuals and quotes.
    pub fn with_rng(settings: Settings, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            settings,
            classifier: Classifier::new(),
            selectors: feed_selectors().clone(),
            state: EngineState::Stopped,
            observer: None,
            placeholders: BTreeMap::new(),
            rng: Box::new(rng),
        }
    }

    /// Replaces the scan-target selectors.
    pub fn with_selectors(mut self, selectors: SelectorList) -> Self {
        self.selectors = selectors;
        self
    }

    /// The live subscription, if any.
    pub fn observer_mut(&mut self) -> Option<&mut ObserverHandle> {
        self.observer.as_mut()
    }

    /// Forgets a subscription whose document side has gone away.
    pub fn drop_observer(&mut self) {
        if self.observer.take().is_some() {
            debug!("observer channel closed");
        }
    }

    fn teardown_observer(&mut self, doc: &mut Document) {
        if let Some(handle) = self.observer.take() {
            doc.disconnect(&handle);
            debug!("disconnected observer");
        }
    }

    /// Copy of a live target for retention, with nested placeholders
    /// replaced by the originals they hold. Markers are not part of the copy.
    fn retained_copy(&self, doc: &Document, id: NodeId) -> Result<Node, DomError> {
        doc.snapshot_with(id, &|child| {
            self.placeholders
                .get(&child)
                .map(|p| p.retained_original.clone())
        })
    }

    fn filter_target(&mut self, doc: &mut Document, id: NodeId, report: &mut ScanReport) {
        if !doc.is_connected(id)
            || doc.has_class(id, SHIELD_CLASS)
            || doc.has_attribute(id, CHECKED_ATTR)
        {
            return;
        }
        if doc.set_attribute(id, CHECKED_ATTR, "true").is_err() {
            return;
        }
        report.examined += 1;

        let text = doc.text_content_skipping(id, SHIELD_CLASS).unwrap_or_default();
        let Some(category) = self.classifier.classify_with(&text, &self.settings) else {
            return;
        };

        let original = match self.retained_copy(doc, id) {
            Ok(mut node) => {
                strip_marker(&mut node);
                node
            }
            Err(e) => {
                warn!(node = %id, error = %e, "could not copy filtered node");
                return;
            }
        };
        let nested = doc.query_within(id, &SHIELD_SELECTOR);
        let (container, placeholder) = placeholder_builder::build(
            &original,
            category,
            self.settings.display_options(),
            self.rng.as_mut(),
        );
        let shield = doc.adopt(&container);
        if let Err(e) = doc.replace_with(id, shield) {
            warn!(node = %id, error = %e, "could not swap in placeholder");
            return;
        }
        for inner in nested {
            self.placeholders.remove(&inner);
        }
        self.placeholders.insert(shield, placeholder);
        self.settings.filter_count += 1;
        debug!(node = %id, shield = %shield, category = %category, "filtered");
        report.filtered.push((shield, category));
    }

    /// Drops registry entries for shields the page detached along with `removed`.
    fn forget_removed(&mut self, doc: &Document, removed: NodeId) {
        let before = self.placeholders.len();
        self.placeholders
            .retain(|shield, _| doc.is_connected(*shield) || !doc.contains(removed, *shield));
        let dropped = before - self.placeholders.len();
        if dropped > 0 {
            debug!(node = %removed, dropped, "forgot removed placeholders");
        }
    }

    fn scan_document(&mut self, doc: &mut Document) -> ScanReport {
        let mut report = ScanReport::default();
        for id in doc.query_all(&self.selectors) {
            self.filter_target(doc, id, &mut report);
        }
        report
    }
}

fn strip_marker(node: &mut Node) {
    if let Node::Element(el) = node {
        el.remove_attr(CHECKED_ATTR);
        for child in &mut el.children {
            strip_marker(child);
        }
    }
}

impl ScanEngineTrait for ScanEngine {
    fn start(&mut self, doc: &mut Document) -> ScanReport {
        self.teardown_observer(doc);
        self.state = EngineState::Scanning;
        let report = self.scan_document(doc);
        self.observer = Some(doc.observe(doc.body()));
        self.state = EngineState::Watching;
        info!(
            examined = report.examined,
            filtered = report.filtered_count(),
            "filtering started"
        );
        report
    }

    fn stop(&mut self, doc: &mut Document) -> usize {
        self.teardown_observer(doc);
        let mut restored = 0;
        for (shield, placeholder) in std::mem::take(&mut self.placeholders) {
            if !doc.is_connected(shield) {
                continue;
            }
            let id = doc.adopt(&placeholder.into_original());
            match doc.replace_with(shield, id) {
                Ok(()) => restored += 1,
                Err(e) => warn!(shield = %shield, error = %e, "could not restore original"),
            }
        }
        for id in doc.query_all(&CHECKED_SELECTOR) {
            if let Err(e) = doc.remove_attribute(id, CHECKED_ATTR) {
                debug!(node = %id, error = %e, "could not clear marker");
            }
        }
        self.state = EngineState::Stopped;
        info!(restored, "filtering stopped");
        restored
    }

    fn rescan(&mut self, doc: &mut Document) -> ScanReport {
        let mut report = ScanReport::default();
        if self.state != EngineState::Watching {
            debug!(state = ?self.state, "rescan skipped");
            return report;
        }
        for id in doc.query_all(&self.selectors) {
            if !doc.is_connected(id) || doc.has_class(id, SHIELD_CLASS) {
                continue;
            }
            if let Err(e) = doc.remove_attribute(id, CHECKED_ATTR) {
                debug!(node = %id, error = %e, "could not clear marker");
                continue;
            }
            self.filter_target(doc, id, &mut report);
        }
        debug!(examined = report.examined, filtered = report.filtered_count(), "rescanned");
        report
    }

    fn handle_batch(&mut self, doc: &mut Document, batch: &MutationBatch) -> ScanReport {
        let mut report = ScanReport::default();
        if self.state != EngineState::Watching {
            return report;
        }
        for record in batch {
            for removed in &record.removed {
                self.forget_removed(doc, *removed);
            }
            for added in &record.added {
                if !doc.is_element(*added) {
                    continue;
                }
                let mut pass = ScanReport::default();
                if doc.matches(*added, &self.selectors) {
                    self.filter_target(doc, *added, &mut pass);
                }
                for id in doc.query_within(*added, &self.selectors) {
                    self.filter_target(doc, id, &mut pass);
                }
                report.absorb(pass);
            }
        }
        report
    }

    fn process_pending(&mut self, doc: &mut Document) -> ScanReport {
        let batch = match self.observer.as_mut() {
            Some(handle) => handle.take_records(),
            None => return ScanReport::default(),
        };
        self.handle_batch(doc, &batch)
    }

    fn handle_click(&mut self, doc: &mut Document, target: NodeId) -> Result<ClickOutcome, DomError> {
        let mut outcome = ClickOutcome::default();
        for fired in doc.dispatch_click(target)? {
            match fired.action {
                ClickAction::Host(name) => outcome.host_actions.push(name),
                ClickAction::Reveal if outcome.revealed.is_none() => {
                    let mut cur = Some(fired.node);
                    while let Some(id) = cur {
                        if self.placeholders.contains_key(&id) {
                            outcome.revealed = self.reveal(doc, id)?;
                            break;
                        }
                        cur = doc.parent(id);
                    }
                }
                ClickAction::Reveal => {}
            }
        }
        Ok(outcome)
    }

    fn reveal(&mut self, doc: &mut Document, shield: NodeId) -> Result<Option<NodeId>, DomError> {
        if !doc.is_connected(shield) {
            return Ok(None);
        }
        let Some(placeholder) = self.placeholders.remove(&shield) else {
            return Ok(None);
        };
        let category = placeholder.category;
        let id = doc.adopt(&placeholder.into_original());
        doc.set_attribute(id, CHECKED_ATTR, "true")?;
        for inner in doc.query_within(id, &self.selectors) {
            doc.set_attribute(inner, CHECKED_ATTR, "true")?;
        }
        doc.replace_with(shield, id)?;
        debug!(shield = %shield, restored = %id, category = %category, "revealed");
        Ok(Some(id))
    }

    fn apply_settings_change(&mut self, doc: &mut Document, old: &Settings, new: &Settings) -> SettingsReaction {
        self.settings = new.clone();
        match (old.enabled, new.enabled) {
            (false, true) => SettingsReaction::Started(self.start(doc)),
            (true, false) => SettingsReaction::Stopped {
                restored: self.stop(doc),
            },
            (true, true) if old.filter_config_differs(new) => {
                SettingsReaction::Rescanned(self.rescan(doc))
            }
            _ => SettingsReaction::Unchanged,
        }
    }

    fn state(&self) -> EngineState {
        self.state
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn placeholder(&self, shield: NodeId) -> Option<&Placeholder> {
        self.placeholders.get(&shield)
    }

    fn placeholder_count(&self) -> usize {
        self.placeholders.len()
    }
}
