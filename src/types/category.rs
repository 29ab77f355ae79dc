use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content-topic label a feed item can be filtered under.
///
/// Variant order is the catalog's declaration order and decides ties when
/// text matches more than one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Politics,
    AiTech,
    Gambling,
    Negative,
    Disaster,
    Celebrity,
    Financial,
}

impl Category {
    /// Every category in declaration order.
    pub const ALL: [Category; 7] = [
        Category::Politics,
        Category::AiTech,
        Category::Gambling,
        Category::Negative,
        Category::Disaster,
        Category::Celebrity,
        Category::Financial,
    ];

    /// The stored key for this category (`"aiTech"`, `"politics"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Politics => "politics",
            Category::AiTech => "aiTech",
            Category::Gambling => "gambling",
            Category::Negative => "negative",
            Category::Disaster => "disaster",
            Category::Celebrity => "celebrity",
            Category::Financial => "financial",
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// A set of enabled categories.
///
/// Iteration always follows declaration order, never insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategorySet(u8);

impl CategorySet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Category::ALL.iter().copied().collect()
    }

    pub fn insert(&mut self, category: Category) {
        self.0 |= category.bit();
    }

    pub fn remove(&mut self, category: Category) {
        self.0 &= !category.bit();
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.iter().copied().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut set = CategorySet::empty();
        for category in iter {
            set.insert(category);
        }
        set
    }
}
