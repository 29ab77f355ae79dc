//! Unit tests for the classifier and pattern catalog.

use calmfeed::services::classifier::{Classifier, ClassifierTrait};
use calmfeed::types::category::{Category, CategorySet};
use calmfeed::types::settings::Settings;
use rstest::rstest;

#[rstest]
#[case("Who will win the election?", Category::Politics)]
#[case("New legislation passed today", Category::Politics)]
#[case("AI will replace us all", Category::AiTech)]
#[case("This NFT drop is a game-changer", Category::AiTech)]
#[case("Huge jackpot at the casino", Category::Gambling)]
#[case("You won't believe what happened", Category::Negative)]
#[case("Wildfire spreads across the valley", Category::Disaster)]
#[case("Kardashian feud heats up", Category::Celebrity)]
#[case("Economists warn of recession", Category::Financial)]
fn classifies_into_expected_category(#[case] text: &str, #[case] expected: Category) {
    let c = Classifier::new();
    assert_eq!(c.classify(text, &CategorySet::all()), Some(expected));
}

#[rstest]
#[case("ELECTION NIGHT")]
#[case("election night")]
#[case("ElEcTiOn night")]
fn matching_is_case_insensitive(#[case] text: &str) {
    let c = Classifier::new();
    assert_eq!(c.classify(text, &CategorySet::all()), Some(Category::Politics));
}

#[rstest]
#[case("devoted to my garden")]
#[case("the casinos of old")]
#[case("")]
fn no_partial_word_or_empty_match(#[case] text: &str) {
    let c = Classifier::new();
    assert_eq!(c.classify(text, &CategorySet::all()), None);
}

#[test]
fn earlier_category_wins_over_later() {
    let c = Classifier::new();
    // Negative ("crisis") is declared before Financial ("debt crisis").
    assert_eq!(
        c.classify("the debt crisis deepens", &CategorySet::all()),
        Some(Category::Negative)
    );
}

#[test]
fn only_enabled_categories_are_considered() {
    let c = Classifier::new();
    let only_financial: CategorySet = [Category::Financial].into_iter().collect();
    assert_eq!(
        c.classify("the debt crisis deepens", &only_financial),
        Some(Category::Financial)
    );
    assert_eq!(c.classify("casino night", &only_financial), None);
    assert_eq!(c.classify("casino night", &CategorySet::empty()), None);
}

#[test]
fn classify_with_respects_toggles() {
    let c = Classifier::new();
    let mut settings = Settings::default();
    settings.categories.gambling = false;
    assert_eq!(c.classify_with("casino night", &settings), None);
}
