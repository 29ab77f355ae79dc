//! Unit tests for the background worker: install, badge, counter messages.

use std::sync::Arc;

use serde_json::json;

use calmfeed::services::background::{badge_for, BackgroundTrait, BackgroundWorker, BADGE_COLOR};
use calmfeed::services::settings_bridge::{SettingsBridge, SETTINGS_KEY};
use calmfeed::services::storage_area::SqliteStorageArea;
use calmfeed::types::message::{RuntimeMessage, StorageChange};
use calmfeed::types::settings::Settings;

fn setup() -> (BackgroundWorker, SettingsBridge) {
    let bridge = SettingsBridge::new(Arc::new(SqliteStorageArea::in_memory().unwrap()));
    (BackgroundWorker::new(bridge.clone()), bridge)
}

#[test]
fn test_install_seeds_defaults_and_greets() {
    let (worker, bridge) = setup();
    let notification = worker.on_installed().unwrap();
    assert!(!notification.title.is_empty());
    assert!(notification.message.contains("peace of mind"));
    assert_eq!(notification.icon_url, "icons/icon128.png");
    assert_eq!(bridge.load().unwrap(), Some(Settings::default()));
}

#[test]
fn test_install_keeps_existing_record() {
    let (worker, bridge) = setup();
    let mut s = Settings::default();
    s.filter_count = 5;
    s.enabled = false;
    bridge.save(&s).unwrap();
    worker.on_installed().unwrap();
    assert_eq!(bridge.load().unwrap(), Some(s));
}

#[test]
fn test_increment_without_record_is_no_op() {
    let (worker, bridge) = setup();
    let written = worker.handle_message(&RuntimeMessage::IncrementFilterCount).unwrap();
    assert_eq!(written, None);
    assert_eq!(bridge.load().unwrap(), None);
}

#[test]
fn test_increment_bumps_stored_counter() {
    let (worker, bridge) = setup();
    worker.on_installed().unwrap();
    worker.handle_message(&RuntimeMessage::IncrementFilterCount).unwrap();
    let written = worker.handle_message(&RuntimeMessage::IncrementFilterCount).unwrap();
    assert_eq!(written.unwrap().filter_count, 2);
    assert_eq!(bridge.load().unwrap().unwrap().filter_count, 2);
}

#[test]
fn test_settings_updated_is_ignored() {
    let (worker, _bridge) = setup();
    let msg = RuntimeMessage::SettingsUpdated { settings: json!({"enabled": false}) };
    assert_eq!(worker.handle_message(&msg).unwrap(), None);
}

#[test]
fn test_badge_shows_count() {
    let mut s = Settings::default();
    s.filter_count = 42;
    let badge = badge_for(&s);
    assert_eq!(badge.text, "42");
    assert_eq!(badge.color.as_deref(), Some(BADGE_COLOR));
}

#[test]
fn test_badge_follows_storage_changes() {
    let (worker, _bridge) = setup();
    let change = StorageChange {
        key: SETTINGS_KEY.to_string(),
        old_value: None,
        new_value: Some(json!({"filterCount": 3})),
    };
    assert_eq!(worker.on_storage_change(&change).unwrap().text, "3");

    let cleared = StorageChange {
        key: SETTINGS_KEY.to_string(),
        old_value: None,
        new_value: None,
    };
    assert_eq!(worker.on_storage_change(&cleared), None);
}

#[test]
fn test_current_badge_reads_storage() {
    let (worker, bridge) = setup();
    assert_eq!(worker.current_badge().text, "");
    let mut s = Settings::default();
    s.filter_count = 9;
    bridge.save(&s).unwrap();
    assert_eq!(worker.current_badge().text, "9");
}
