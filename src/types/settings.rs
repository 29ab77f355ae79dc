use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::category::{Category, CategorySet};

/// The persisted filter settings record.
///
/// Stored under a single key as `{ enabled, categories, showImages,
/// showQuotes, allowPeek, filterCount }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub enabled: bool,
    pub categories: CategoryToggles,
    pub show_images: bool,
    pub show_quotes: bool,
    pub allow_peek: bool,
    pub filter_count: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            categories: CategoryToggles::default(),
            show_images: true,
            show_quotes: true,
            allow_peek: true,
            filter_count: 0,
        }
    }
}

impl Settings {
    /// Categories the classifier should evaluate, or an empty set when
    /// filtering is switched off.
    pub fn active_categories(&self) -> CategorySet {
        if self.enabled {
            self.categories.enabled_set()
        } else {
            CategorySet::empty()
        }
    }

    /// Snapshot of the flags the placeholder builder needs.
    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            show_images: self.show_images,
            show_quotes: self.show_quotes,
            allow_peek: self.allow_peek,
        }
    }

    /// Shallow-merges a stored or relayed record onto these settings.
    ///
    /// Known top-level fields of the right JSON type replace the current
    /// value; unknown or ill-typed fields are ignored. `categories` is
    /// merged per known name, so the record always keeps all seven.
    pub fn merged(&self, patch: &Value) -> Settings {
        let mut next = self.clone();
        let Some(map) = patch.as_object() else {
            return next;
        };

        if let Some(v) = map.get("enabled").and_then(Value::as_bool) {
            next.enabled = v;
        }
        if let Some(cats) = map.get("categories").and_then(Value::as_object) {
            for category in Category::ALL {
                if let Some(v) = cats.get(category.as_str()).and_then(Value::as_bool) {
                    next.categories.set(category, v);
                }
            }
        }
        if let Some(v) = map.get("showImages").and_then(Value::as_bool) {
            next.show_images = v;
        }
        if let Some(v) = map.get("showQuotes").and_then(Value::as_bool) {
            next.show_quotes = v;
        }
        if let Some(v) = map.get("allowPeek").and_then(Value::as_bool) {
            next.allow_peek = v;
        }
        if let Some(v) = map.get("filterCount").and_then(Value::as_u64) {
            next.filter_count = v;
        }
        next
    }

    /// Builds settings from a stored record, defaulting anything missing.
    pub fn from_record(record: &Value) -> Settings {
        Settings::default().merged(record)
    }

    /// True when two records differ in anything other than the counter.
    pub fn filter_config_differs(&self, other: &Settings) -> bool {
        self.categories != other.categories || self.display_options() != other.display_options()
    }
}

/// Per-category on/off switches. Always holds exactly the known categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryToggles {
    pub politics: bool,
    pub ai_tech: bool,
    pub gambling: bool,
    pub negative: bool,
    pub disaster: bool,
    pub celebrity: bool,
    pub financial: bool,
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self {
            politics: true,
            ai_tech: true,
            gambling: true,
            negative: true,
            disaster: true,
            celebrity: true,
            financial: true,
        }
    }
}

impl CategoryToggles {
    pub fn get(&self, category: Category) -> bool {
        match category {
            Category::Politics => self.politics,
            Category::AiTech => self.ai_tech,
            Category::Gambling => self.gambling,
            Category::Negative => self.negative,
            Category::Disaster => self.disaster,
            Category::Celebrity => self.celebrity,
            Category::Financial => self.financial,
        }
    }

    pub fn set(&mut self, category: Category, enabled: bool) {
        let slot = match category {
            Category::Politics => &mut self.politics,
            Category::AiTech => &mut self.ai_tech,
            Category::Gambling => &mut self.gambling,
            Category::Negative => &mut self.negative,
            Category::Disaster => &mut self.disaster,
            Category::Celebrity => &mut self.celebrity,
            Category::Financial => &mut self.financial,
        };
        *slot = enabled;
    }

    pub fn enabled_set(&self) -> CategorySet {
        Category::ALL.iter().copied().filter(|c| self.get(*c)).collect()
    }
}

/// Placeholder presentation flags, passed to the builder by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub show_images: bool,
    pub show_quotes: bool,
    pub allow_peek: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Settings::default().display_options()
    }
}
