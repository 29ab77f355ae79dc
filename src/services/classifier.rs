//! Classifier for calmfeed.
//!
//! Evaluates free text against the pattern catalog and reports the first
//! matching enabled category. Pure: no I/O, no state.

use crate::services::pattern_catalog::PatternCatalog;
use crate::types::category::{Category, CategorySet};
use crate::types::settings::Settings;

/// Trait defining classifier operations.
pub trait ClassifierTrait {
    /// First enabled category whose rules match, in catalog order.
    fn classify(&self, text: &str, enabled: &CategorySet) -> Option<Category>;
    /// Like `classify`, honouring the master switch and toggles in `settings`.
    fn classify_with(&self, text: &str, settings: &Settings) -> Option<Category>;
    /// Every category that matches, in catalog order, ignoring toggles.
    fn matches(&self, text: &str) -> Vec<Category>;
}

/// Classifier over a pattern catalog.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    catalog: &'static PatternCatalog,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            catalog: PatternCatalog::builtin(),
        }
    }

    fn normalize(text: &str) -> Option<String> {
        if text.trim().is_empty() {
            None
        } else {
            Some(text.to_lowercase())
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierTrait for Classifier {
    fn classify(&self, text: &str, enabled: &CategorySet) -> Option<Category> {
        if enabled.is_empty() {
            return None;
        }
        let text = Self::normalize(text)?;
        self.catalog
            .entries()
            .filter(|(category, _)| enabled.contains(*category))
            .find(|(_, rules)| rules.iter().any(|rule| rule.is_match(&text)))
            .map(|(category, _)| category)
    }

    fn classify_with(&self, text: &str, settings: &Settings) -> Option<Category> {
        self.classify(text, &settings.active_categories())
    }

    fn matches(&self, text: &str) -> Vec<Category> {
        let Some(text) = Self::normalize(text) else {
            return Vec::new();
        };
        self.catalog
            .entries()
            .filter(|(_, rules)| rules.iter().any(|rule| rule.is_match(&text)))
            .map(|(category, _)| category)
            .collect()
    }
}
