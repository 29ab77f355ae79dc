use crate::dom::Node;

use super::category::Category;

/// Class carried by every placeholder container.
pub const SHIELD_CLASS: &str = "calmfeed-shield";

/// Bookkeeping for one filtered feed item.
///
/// The retained original is an independent deep copy taken at filter time;
/// it is never an alias of a live node.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub category: Category,
    pub retained_original: Node,
    pub revealable: bool,
}

impl Placeholder {
    /// Consumes the placeholder, handing back the node to restore.
    pub fn into_original(self) -> Node {
        self.retained_original
    }
}
