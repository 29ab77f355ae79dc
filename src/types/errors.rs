use std::fmt;

// === StorageError ===

/// Errors raised by the persisted key-value storage area.
#[derive(Debug)]
pub enum StorageError {
    /// The backing store could not be read or written.
    Unavailable(String),
    /// A stored value could not be encoded or decoded.
    SerializationError(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            StorageError::SerializationError(msg) => {
                write!(f, "Storage serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::SerializationError(e.to_string())
    }
}

// === DomError ===

/// Errors related to the in-memory document model.
#[derive(Debug)]
pub enum DomError {
    /// No node exists with the given ID.
    NodeNotFound(usize),
    /// The operation needs an element but the node is a text node.
    NotAnElement(usize),
    /// The node must be detached before it can be inserted.
    AlreadyAttached(usize),
    /// The node has no parent to be replaced or removed from.
    Detached(usize),
    /// Insertion would make a node its own ancestor.
    HierarchyRequest(String),
    /// A selector string could not be parsed.
    InvalidSelector(String),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::NodeNotFound(id) => write!(f, "Node not found: {}", id),
            DomError::NotAnElement(id) => write!(f, "Node is not an element: {}", id),
            DomError::AlreadyAttached(id) => write!(f, "Node already attached: {}", id),
            DomError::Detached(id) => write!(f, "Node has no parent: {}", id),
            DomError::HierarchyRequest(msg) => write!(f, "Hierarchy request error: {}", msg),
            DomError::InvalidSelector(sel) => write!(f, "Invalid selector: {}", sel),
        }
    }
}

impl std::error::Error for DomError {}

// === RelayError ===

/// Errors from relaying a runtime message to a page context.
///
/// Both variants are expected in normal operation and are not logged as errors.
#[derive(Debug)]
pub enum RelayError {
    /// There is no active page context to deliver to.
    NoActiveTab,
    /// The page context exists but nothing is listening on it.
    NoReceiver(String),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::NoActiveTab => write!(f, "No active tab"),
            RelayError::NoReceiver(id) => write!(f, "No receiver in tab: {}", id),
        }
    }
}

impl std::error::Error for RelayError {}

// === SettingsError ===

/// Errors related to editing settings through the host interface.
#[derive(Debug)]
pub enum SettingsError {
    /// The provided category name is not one of the known categories.
    UnknownCategory(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
    /// The settings could not be persisted.
    Storage(StorageError),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::UnknownCategory(name) => write!(f, "Unknown category: {}", name),
            SettingsError::InvalidValue(msg) => write!(f, "Invalid settings value: {}", msg),
            SettingsError::Storage(e) => write!(f, "Settings storage error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StorageError> for SettingsError {
    fn from(e: StorageError) -> Self {
        SettingsError::Storage(e)
    }
}
