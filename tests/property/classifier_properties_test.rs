//! Property-based tests for the classifier.
//!
//! Classification is deterministic, honours the enabled set, and always
//! reports the earliest matching category in declaration order.

use calmfeed::services::classifier::{Classifier, ClassifierTrait};
use calmfeed::types::category::{Category, CategorySet};
use calmfeed::types::settings::Settings;
use proptest::prelude::*;

/// Phrases known to trigger each category, in declaration order.
const TRIGGERS: &[(Category, &str)] = &[
    (Category::Politics, "the election"),
    (Category::AiTech, "another NFT drop"),
    (Category::Gambling, "casino"),
    (Category::Negative, "an awful day"),
    (Category::Disaster, "wildfire spreading"),
    (Category::Celebrity, "a kardashian"),
    (Category::Financial, "recession fears"),
];

/// Filler words that match no rule.
const FILLER: &[&str] = &["garden", "coffee", "sunset", "puppy", "bread", "walk", "river"];

fn arb_set() -> impl Strategy<Value = CategorySet> {
    prop::collection::vec(any::<bool>(), 7).prop_map(|flags| {
        Category::ALL
            .iter()
            .zip(flags)
            .filter(|(_, on)| *on)
            .map(|(c, _)| *c)
            .collect()
    })
}

fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            (0..TRIGGERS.len()).prop_map(|i| TRIGGERS[i].1.to_string()),
            (0..FILLER.len()).prop_map(|i| FILLER[i].to_string()),
        ],
        0..8,
    )
    .prop_map(|words| words.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn classification_is_deterministic(text in arb_text(), set in arb_set()) {
        let c = Classifier::new();
        prop_assert_eq!(c.classify(&text, &set), c.classify(&text, &set));
    }

    #[test]
    fn result_is_first_enabled_match(text in arb_text(), set in arb_set()) {
        let c = Classifier::new();
        let expected = c.matches(&text).into_iter().find(|cat| set.contains(*cat));
        prop_assert_eq!(c.classify(&text, &set), expected);
    }

    #[test]
    fn result_is_always_enabled(text in arb_text(), set in arb_set()) {
        if let Some(category) = Classifier::new().classify(&text, &set) {
            prop_assert!(set.contains(category));
        }
    }

    #[test]
    fn master_switch_off_never_matches(text in arb_text()) {
        let mut settings = Settings::default();
        settings.enabled = false;
        prop_assert_eq!(Classifier::new().classify_with(&text, &settings), None);
    }

    #[test]
    fn filler_only_text_never_matches(words in prop::collection::vec(0..FILLER.len(), 0..10)) {
        let text: Vec<&str> = words.iter().map(|i| FILLER[*i]).collect();
        prop_assert_eq!(Classifier::new().classify(&text.join(" "), &CategorySet::all()), None);
    }

    #[test]
    fn case_does_not_matter(text in arb_text(), set in arb_set()) {
        let c = Classifier::new();
        prop_assert_eq!(c.classify(&text.to_uppercase(), &set), c.classify(&text, &set));
    }

    #[test]
    fn enabling_more_categories_never_loses_a_match(text in arb_text(), a in arb_set(), b in arb_set()) {
        let c = Classifier::new();
        let union: CategorySet = a.iter().chain(b.iter()).collect();
        if c.classify(&text, &a).is_some() {
            prop_assert!(c.classify(&text, &union).is_some());
        }
    }
}
