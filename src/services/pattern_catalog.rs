//! Pattern Catalog for calmfeed.
//!
//! Static mapping from each category to its ordered match rules. Rules are
//! case-insensitive, word-bounded regular expressions compiled once.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::category::Category;

/// Rule sources in declaration order.
const RULES: &[(Category, &[&str])] = &[
    (
        Category::Politics,
        &[
            r"\b(election|vote|democrat|republican|trump|biden|congress|senate|political|politician|campaign)\b",
            r"\b(liberal|conservative|left-wing|right-wing|partisan|policy|legislation)\b",
        ],
    ),
    (
        Category::AiTech,
        &[
            r"\b(AI (will|could|might) (kill|destroy|replace|end)|AGI|existential risk)\b",
            r"\b(revolutionary AI|breakthrough|game-changer|disrupting everything)\b",
            r"\b(crypto (crash|moon|scam)|NFT|blockchain revolution)\b",
        ],
    ),
    (
        Category::Gambling,
        &[
            r"\b(bet now|odds|sportsbook|casino|poker|slot machine|gambling)\b",
            r"\b(win big|jackpot|lottery|betting)\b",
        ],
    ),
    (
        Category::Negative,
        &[
            r"\b(breaking|urgent|crisis|disaster|tragedy|horror|terrible|awful)\b",
            r"\b(shocking|outrage|scandal|controversy|slams|blasts|destroys)\b",
            r"\b(you won't believe|everyone is talking about|went viral)\b",
        ],
    ),
    (
        Category::Disaster,
        &[
            r"\b(earthquake|hurricane|flood|wildfire|tsunami|tornado)\b",
            r"\b(death toll|casualties|victims|devastation)\b",
        ],
    ),
    (
        Category::Celebrity,
        &[
            r"\b(kardashian|celebrity drama|feud|breakup|relationship)\b",
            r"\b(shocking revelation|secret exposed)\b",
        ],
    ),
    (
        Category::Financial,
        &[
            r"\b(market crash|stock plunge|recession|economic collapse)\b",
            r"\b(financial crisis|bankruptcy|debt crisis)\b",
        ],
    ),
];

/// A single case-insensitive text pattern.
#[derive(Debug)]
pub struct MatchRule {
    source: &'static str,
    regex: Regex,
}

impl MatchRule {
    fn compile(source: &'static str) -> Self {
        // Sources are compile-time constants covered by tests.
        let regex = Regex::new(&format!("(?i){}", source))
            .unwrap_or_else(|e| panic!("invalid built-in rule {:?}: {}", source, e));
        Self { source, regex }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// All categories with their compiled rules, in declaration order.
#[derive(Debug)]
pub struct PatternCatalog {
    entries: Vec<(Category, Vec<MatchRule>)>,
}

static CATALOG: Lazy<PatternCatalog> = Lazy::new(|| PatternCatalog {
    entries: RULES
        .iter()
        .map(|(category, sources)| {
            (*category, sources.iter().copied().map(MatchRule::compile).collect())
        })
        .collect(),
});

impl PatternCatalog {
    /// The process-wide built-in catalog.
    pub fn builtin() -> &'static PatternCatalog {
        &CATALOG
    }

    /// Categories paired with their rules, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (Category, &[MatchRule])> {
        self.entries.iter().map(|(c, rules)| (*c, rules.as_slice()))
    }

    pub fn rules_for(&self, category: Category) -> &[MatchRule] {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, rules)| rules.as_slice())
            .unwrap_or(&[])
    }

    pub fn categories(&self) -> Vec<Category> {
        self.entries.iter().map(|(c, _)| *c).collect()
    }
}
