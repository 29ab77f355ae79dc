use serde::Serialize;
use tracing::{debug, error};

use crate::managers::tab_registry::TabRegistryTrait;
use crate::services::settings_bridge::SettingsBridge;
use crate::types::category::Category;
use crate::types::errors::SettingsError;
use crate::types::message::RuntimeMessage;
use crate::types::settings::{CategoryToggles, Settings};

/// Form state shown by the options panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub enabled: bool,
    /// The per-category and display controls are greyed out while filtering is off.
    pub panel_dimmed: bool,
    pub categories: CategoryToggles,
    pub show_images: bool,
    pub show_quotes: bool,
    pub allow_peek: bool,
    pub filter_count: u64,
}

/// Trait defining the options panel interface.
///
/// Every setter saves the whole record and then relays it to the active tab.
/// The local state keeps the edit even if saving fails.
pub trait OptionsPanelTrait {
    fn view(&self) -> PanelView;
    fn settings(&self) -> &Settings;
    fn set_enabled(&mut self, enabled: bool, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError>;
    fn set_category(&mut self, category: Category, enabled: bool, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError>;
    fn set_category_named(&mut self, name: &str, enabled: bool, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError>;
    fn set_show_images(&mut self, on: bool, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError>;
    fn set_show_quotes(&mut self, on: bool, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError>;
    fn set_allow_peek(&mut self, on: bool, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError>;
    fn reset_filter_count(&mut self, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError>;
    /// Shallow-merges `patch` and saves.
    fn apply_patch(&mut self, patch: &serde_json::Value, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError>;
    /// Re-reads the stored record.
    fn reload(&mut self);
}

/// Thin controller binding the options form to the stored settings.
pub struct OptionsPanel {
    bridge: SettingsBridge,
    settings: Settings,
}

impl OptionsPanel {
    /// Loads the stored settings, falling back to defaults on failure.
    pub fn open(bridge: SettingsBridge) -> Self {
        let settings = Self::read(&bridge);
        Self { bridge, settings }
    }

    fn read(bridge: &SettingsBridge) -> Settings {
        match bridge.load() {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                error!(error = %e, "error loading settings");
                Settings::default()
            }
        }
    }

    fn commit(&self, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError> {
        if let Err(e) = self.bridge.save(&self.settings) {
            error!(error = %e, "error saving settings");
            return Err(e.into());
        }
        let message = RuntimeMessage::SettingsUpdated {
            settings: serde_json::to_value(&self.settings)
                .map_err(|e| SettingsError::InvalidValue(e.to_string()))?,
        };
        if let Err(e) = tabs.send_to_active(message) {
            debug!(reason = %e, "could not send settings to tab");
        }
        Ok(())
    }
}

impl OptionsPanelTrait for OptionsPanel {
    fn view(&self) -> PanelView {
        let s = &self.settings;
        PanelView {
            enabled: s.enabled,
            panel_dimmed: !s.enabled,
            categories: s.categories,
            show_images: s.show_images,
            show_quotes: s.show_quotes,
            allow_peek: s.allow_peek,
            filter_count: s.filter_count,
        }
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn set_enabled(&mut self, enabled: bool, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError> {
        self.settings.enabled = enabled;
        self.commit(tabs)
    }

    fn set_category(&mut self, category: Category, enabled: bool, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError> {
        self.settings.categories.set(category, enabled);
        self.commit(tabs)
    }

    fn set_category_named(&mut self, name: &str, enabled: bool, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError> {
        let category: Category = name
            .parse()
            .map_err(|_| SettingsError::UnknownCategory(name.to_string()))?;
        self.set_category(category, enabled, tabs)
    }

    fn set_show_images(&mut self, on: bool, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError> {
        self.settings.show_images = on;
        self.commit(tabs)
    }

    fn set_show_quotes(&mut self, on: bool, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError> {
        self.settings.show_quotes = on;
        self.commit(tabs)
    }

    fn set_allow_peek(&mut self, on: bool, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError> {
        self.settings.allow_peek = on;
        self.commit(tabs)
    }

    fn reset_filter_count(&mut self, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError> {
        self.settings.filter_count = 0;
        self.commit(tabs)
    }

    fn apply_patch(&mut self, patch: &serde_json::Value, tabs: &dyn TabRegistryTrait) -> Result<(), SettingsError> {
        if !patch.is_object() {
            return Err(SettingsError::InvalidValue(
                "settings patch must be an object".to_string(),
            ));
        }
        self.settings = self.settings.merged(patch);
        self.commit(tabs)
    }

    fn reload(&mut self) {
        self.settings = Self::read(&self.bridge);
    }
}
