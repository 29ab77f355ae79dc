use calmfeed::types::errors::*;

// === StorageError Tests ===

#[test]
fn storage_error_display_variants() {
    assert_eq!(
        StorageError::Unavailable("disk full".to_string()).to_string(),
        "Storage unavailable: disk full"
    );
    assert_eq!(
        StorageError::SerializationError("bad json".to_string()).to_string(),
        "Storage serialization error: bad json"
    );
}

#[test]
fn storage_error_from_serde_json() {
    let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    let err: StorageError = json_err.into();
    assert!(matches!(err, StorageError::SerializationError(_)));
}

#[test]
fn storage_error_from_rusqlite() {
    let err: StorageError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, StorageError::Unavailable(_)));
}

// === DomError Tests ===

#[test]
fn dom_error_display_variants() {
    assert_eq!(DomError::NodeNotFound(9).to_string(), "Node not found: 9");
    assert_eq!(DomError::NotAnElement(3).to_string(), "Node is not an element: 3");
    assert_eq!(DomError::AlreadyAttached(4).to_string(), "Node already attached: 4");
    assert_eq!(DomError::Detached(5).to_string(), "Node has no parent: 5");
    assert_eq!(
        DomError::InvalidSelector("div p".to_string()).to_string(),
        "Invalid selector: div p"
    );
}

#[test]
fn dom_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(DomError::NodeNotFound(1));
    assert!(err.source().is_none());
}

// === RelayError Tests ===

#[test]
fn relay_error_display_variants() {
    assert_eq!(RelayError::NoActiveTab.to_string(), "No active tab");
    assert_eq!(
        RelayError::NoReceiver("tab-1".to_string()).to_string(),
        "No receiver in tab: tab-1"
    );
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::UnknownCategory("sports".to_string()).to_string(),
        "Unknown category: sports"
    );
    assert_eq!(
        SettingsError::InvalidValue("not an object".to_string()).to_string(),
        "Invalid settings value: not an object"
    );
}

#[test]
fn settings_error_wraps_storage_error_as_source() {
    let err: SettingsError = StorageError::Unavailable("locked".to_string()).into();
    assert_eq!(err.to_string(), "Settings storage error: Storage unavailable: locked");
    let boxed: Box<dyn std::error::Error> = Box::new(err);
    assert!(boxed.source().is_some());
}
