//! In-memory document model standing in for the host page.
//!
//! Provides just enough of a DOM for the filter: an arena of element and
//! text nodes under `body`, owned detached trees for copies, a selector
//! subset, bubbling click dispatch, and childList mutation observers.

pub mod document;
pub mod node;
pub mod observer;
pub mod selector;

pub use document::{Document, FiredListener, NodeId};
pub use node::{ClickAction, Element, Listener, Node};
pub use observer::{MutationBatch, MutationRecord, ObserverHandle};
pub use selector::SelectorList;
