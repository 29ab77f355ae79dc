//! Unit tests for the scan & watch engine: initial scan, watching,
//! reveal, stop/start, and reactions to settings changes.

use calmfeed::dom::{Document, Element, Listener, Node, NodeId, SelectorList};
use calmfeed::services::scan_engine::{
    EngineState, ScanEngine, ScanEngineTrait, SettingsReaction, CHECKED_ATTR,
};
use calmfeed::types::category::Category;
use calmfeed::types::placeholder::SHIELD_CLASS;
use calmfeed::types::settings::Settings;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn engine_with(settings: Settings) -> ScanEngine {
    ScanEngine::with_rng(settings, StdRng::seed_from_u64(11))
}

fn engine() -> ScanEngine {
    engine_with(Settings::default())
}

fn tweet(text: &str) -> Node {
    Element::new("div")
        .with_attr("data-testid", "tweet")
        .with_listener(Listener::host("open-tweet"))
        .with_child(Element::new("p").with_text(text))
        .into()
}

fn shields(doc: &Document) -> Vec<NodeId> {
    let sel: SelectorList = format!(".{}", SHIELD_CLASS).parse().unwrap();
    doc.query_all(&sel)
}

fn feed(texts: &[&str]) -> (Document, Vec<NodeId>) {
    let mut doc = Document::new();
    let body = doc.body();
    let nodes: Vec<Node> = texts.iter().map(|t| tweet(t)).collect();
    let ids = doc.append_all(body, &nodes).unwrap();
    (doc, ids)
}

fn peek_button(doc: &Document, shield: NodeId) -> NodeId {
    let sel: SelectorList = ".peek-button".parse().unwrap();
    doc.query_within(shield, &sel)[0]
}

// ─── Initial scan ───

#[test]
fn start_filters_matching_targets_only() {
    let (mut doc, ids) = feed(&["cute cat", "BREAKING: market crash wipes out savings", "nice sunset"]);
    let mut eng = engine();
    let report = eng.start(&mut doc);

    assert_eq!(report.examined, 3);
    assert_eq!(report.filtered.len(), 1);
    assert_eq!(report.filtered[0].1, Category::Negative);
    assert_eq!(eng.state(), EngineState::Watching);
    assert_eq!(eng.settings().filter_count, 1);
    assert_eq!(doc.observer_count(), 1);

    assert!(doc.is_connected(ids[0]));
    assert!(!doc.is_connected(ids[1]));
    assert!(doc.is_connected(ids[2]));
    let shield = report.filtered[0].0;
    assert_eq!(doc.children(doc.body())[1], shield);
    assert_eq!(doc.attribute(shield, "data-category"), Some("negative"));
    assert!(doc.text_content(shield).unwrap().contains("negative content filtered"));
}

#[test]
fn every_target_is_marked_checked() {
    let (mut doc, ids) = feed(&["cute cat", "nice sunset"]);
    engine().start(&mut doc);
    for id in ids {
        assert_eq!(doc.attribute(id, CHECKED_ATTR), Some("true"));
    }
}

#[test]
fn second_scan_adds_nothing() {
    let (mut doc, _) = feed(&["casino night", "quiet walk"]);
    let mut eng = engine();
    assert_eq!(eng.start(&mut doc).filtered.len(), 1);
    let again = eng.start(&mut doc);
    assert_eq!(again.examined, 0);
    assert!(again.filtered.is_empty());
    assert_eq!(shields(&doc).len(), 1);
}

#[test]
fn start_twice_keeps_one_subscription() {
    let (mut doc, _) = feed(&[]);
    let mut eng = engine();
    eng.start(&mut doc);
    eng.start(&mut doc);
    assert_eq!(doc.observer_count(), 1);

    let body = doc.body();
    doc.append(body, &tweet("jackpot tonight")).unwrap();
    let report = eng.process_pending(&mut doc);
    assert_eq!(report.filtered.len(), 1);
    assert_eq!(shields(&doc).len(), 1);
}

#[test]
fn disabled_settings_never_filter() {
    let mut settings = Settings::default();
    settings.enabled = false;
    let (mut doc, ids) = feed(&["casino night"]);
    let mut eng = engine_with(settings);
    let report = eng.start(&mut doc);
    assert!(report.filtered.is_empty());
    assert!(doc.is_connected(ids[0]));
}

#[test]
fn unmatched_host_markup_is_not_an_error() {
    let mut doc = Document::new();
    let body = doc.body();
    doc.append(body, &Element::new("div").with_text("casino").into()).unwrap();
    let report = engine().start(&mut doc);
    assert_eq!(report.examined, 0);
}

#[test]
fn custom_selectors_replace_platform_list() {
    let mut doc = Document::new();
    let body = doc.body();
    doc.append(body, &Element::new("li").with_class("item").with_text("poker").into())
        .unwrap();
    doc.append(body, &tweet("poker")).unwrap();
    let mut eng = engine().with_selectors(".item".parse().unwrap());
    let report = eng.start(&mut doc);
    assert_eq!(report.examined, 1);
    assert_eq!(report.filtered.len(), 1);
}

// ─── Watching ───

#[test]
fn inserted_nodes_and_descendants_are_filtered() {
    let (mut doc, _) = feed(&[]);
    let mut eng = engine();
    eng.start(&mut doc);

    let body = doc.body();
    let wrapper: Node = Element::new("section")
        .with_child(tweet("hurricane warning"))
        .with_child(tweet("garden update"))
        .into();
    doc.append_all(body, &[wrapper, tweet("lottery winners")]).unwrap();

    let report = eng.process_pending(&mut doc);
    assert_eq!(report.examined, 3);
    let cats: Vec<Category> = report.filtered.iter().map(|(_, c)| *c).collect();
    assert_eq!(cats, vec![Category::Disaster, Category::Gambling]);
    assert_eq!(eng.settings().filter_count, 2);
}

#[test]
fn own_replacements_are_not_refiltered() {
    let (mut doc, _) = feed(&[]);
    let mut eng = engine();
    eng.start(&mut doc);
    let body = doc.body();
    doc.append(body, &tweet("casino")).unwrap();
    assert_eq!(eng.process_pending(&mut doc).filtered.len(), 1);
    // The swap itself queued a record; handling it changes nothing.
    let report = eng.process_pending(&mut doc);
    assert_eq!(report.examined, 0);
    assert_eq!(eng.placeholder_count(), 1);
}

#[test]
fn nothing_is_processed_after_stop() {
    let (mut doc, _) = feed(&[]);
    let mut eng = engine();
    eng.start(&mut doc);
    eng.stop(&mut doc);
    let body = doc.body();
    let id = doc.append(body, &tweet("casino")).unwrap();
    assert_eq!(eng.process_pending(&mut doc).examined, 0);
    assert!(doc.is_connected(id));
    assert_eq!(doc.observer_count(), 0);
}

#[test]
fn placeholders_removed_by_the_page_are_forgotten() {
    let (mut doc, _) = feed(&[]);
    let mut eng = engine();
    eng.start(&mut doc);
    let body = doc.body();

    for n in 0..50 {
        doc.append(body, &tweet(&format!("casino night {}", n))).unwrap();
        eng.process_pending(&mut doc);
        let first = doc.children(body)[0];
        doc.remove(first).unwrap();
        eng.process_pending(&mut doc);
    }
    assert!(shields(&doc).is_empty());
    assert_eq!(eng.placeholder_count(), 0);
    assert_eq!(eng.settings().filter_count, 50);
}

#[test]
fn removing_a_wrapper_forgets_the_placeholders_inside_it() {
    let (mut doc, _) = feed(&[]);
    let mut eng = engine();
    eng.start(&mut doc);
    let body = doc.body();
    let wrapper: Node = Element::new("section")
        .with_child(tweet("lottery"))
        .with_child(tweet("poker"))
        .into();
    let section = doc.append(body, &wrapper).unwrap();
    let kept = doc.append(body, &tweet("jackpot")).unwrap();
    eng.process_pending(&mut doc);
    assert_eq!(eng.placeholder_count(), 3);
    assert!(!doc.is_connected(kept));

    doc.remove(section).unwrap();
    eng.process_pending(&mut doc);
    assert_eq!(eng.placeholder_count(), 1);
    assert_eq!(shields(&doc).len(), 1);
    assert_eq!(eng.stop(&mut doc), 1);
}

// ─── Reveal ───

#[test]
fn reveal_restores_original_and_stops_propagation() {
    let (mut doc, ids) = feed(&["odds are good at the sportsbook"]);
    let before = doc.snapshot(ids[0]).unwrap();
    let mut eng = engine();
    let shield = eng.start(&mut doc).filtered[0].0;

    let retained = eng.placeholder(shield).unwrap().retained_original.clone();
    assert_eq!(retained, before);

    let button = peek_button(&doc, shield);
    let outcome = eng.handle_click(&mut doc, button).unwrap();
    let restored = outcome.revealed.unwrap();
    assert!(outcome.host_actions.is_empty());
    assert!(!doc.is_connected(shield));
    assert_eq!(doc.children(doc.body()), &[restored]);
    assert_eq!(eng.placeholder_count(), 0);

    let mut live = doc.snapshot(restored).unwrap();
    live.as_element_mut().unwrap().remove_attr(CHECKED_ATTR);
    assert_eq!(live, before);
}

#[test]
fn revealed_content_is_not_filtered_again_by_watcher() {
    let (mut doc, _) = feed(&["casino"]);
    let mut eng = engine();
    let shield = eng.start(&mut doc).filtered[0].0;
    let button = peek_button(&doc, shield);
    eng.handle_click(&mut doc, button).unwrap();
    let report = eng.process_pending(&mut doc);
    assert!(report.filtered.is_empty());
    assert!(shields(&doc).is_empty());
}

#[test]
fn clicking_restored_content_reaches_host_handlers() {
    let (mut doc, _) = feed(&["casino"]);
    let mut eng = engine();
    let shield = eng.start(&mut doc).filtered[0].0;
    let button = peek_button(&doc, shield);
    let restored = eng
        .handle_click(&mut doc, button)
        .unwrap()
        .revealed
        .unwrap();
    let outcome = eng.handle_click(&mut doc, restored).unwrap();
    assert_eq!(outcome.host_actions, vec!["open-tweet".to_string()]);
    assert_eq!(outcome.revealed, None);
}

#[test]
fn no_peek_button_without_allow_peek() {
    let mut settings = Settings::default();
    settings.allow_peek = false;
    let (mut doc, _) = feed(&["casino"]);
    let mut eng = engine_with(settings);
    let shield = eng.start(&mut doc).filtered[0].0;
    let sel: SelectorList = ".peek-button".parse().unwrap();
    assert!(doc.query_within(shield, &sel).is_empty());
    assert!(!eng.placeholder(shield).unwrap().revealable);
}

#[test]
fn reveal_of_unknown_shield_is_none() {
    let (mut doc, ids) = feed(&["quiet"]);
    let mut eng = engine();
    eng.start(&mut doc);
    assert_eq!(eng.reveal(&mut doc, ids[0]).unwrap(), None);
}

// ─── Stop / restart ───

#[test]
fn stop_restores_exact_pre_filter_document() {
    let (mut doc, _) = feed(&["casino", "walk in the park", "tornado season"]);
    let body = doc.body();
    let before = doc.snapshot(body).unwrap();

    let mut eng = engine();
    assert_eq!(eng.start(&mut doc).filtered.len(), 2);
    assert_eq!(eng.stop(&mut doc), 2);

    assert_eq!(doc.snapshot(body).unwrap(), before);
    assert_eq!(eng.state(), EngineState::Stopped);
    assert_eq!(eng.placeholder_count(), 0);
}

#[test]
fn restart_after_stop_filters_again() {
    let (mut doc, _) = feed(&["casino"]);
    let mut eng = engine();
    eng.start(&mut doc);
    eng.stop(&mut doc);
    assert_eq!(eng.start(&mut doc).filtered.len(), 1);
}

// ─── Settings changes ───

#[test]
fn disabling_category_keeps_existing_placeholder_and_skips_new_ones() {
    let (mut doc, _) = feed(&["casino night"]);
    let mut eng = engine();
    let shield = eng.start(&mut doc).filtered[0].0;

    let old = eng.settings().clone();
    let mut new = old.clone();
    new.categories.gambling = false;
    let reaction = eng.apply_settings_change(&mut doc, &old, &new);
    assert!(matches!(reaction, SettingsReaction::Rescanned(ref r) if r.filtered.is_empty()));
    assert!(doc.is_connected(shield));

    let body = doc.body();
    let fresh = doc.append(body, &tweet("jackpot")).unwrap();
    assert!(eng.process_pending(&mut doc).filtered.is_empty());
    assert!(doc.is_connected(fresh));
}

#[test]
fn enabling_category_rescans_checked_items() {
    let mut settings = Settings::default();
    settings.categories.celebrity = false;
    let (mut doc, ids) = feed(&["celebrity drama again"]);
    let mut eng = engine_with(settings);
    assert!(eng.start(&mut doc).filtered.is_empty());

    let old = eng.settings().clone();
    let mut new = old.clone();
    new.categories.celebrity = true;
    match eng.apply_settings_change(&mut doc, &old, &new) {
        SettingsReaction::Rescanned(report) => {
            assert_eq!(report.filtered.len(), 1);
            assert_eq!(report.filtered[0].1, Category::Celebrity);
        }
        other => panic!("unexpected reaction: {:?}", other),
    }
    assert!(!doc.is_connected(ids[0]));
}

#[test]
fn master_switch_stops_and_starts() {
    let (mut doc, _) = feed(&["casino"]);
    let mut eng = engine();
    eng.start(&mut doc);

    let on = eng.settings().clone();
    let mut off = on.clone();
    off.enabled = false;
    assert_eq!(
        eng.apply_settings_change(&mut doc, &on, &off),
        SettingsReaction::Stopped { restored: 1 }
    );
    assert!(shields(&doc).is_empty());

    match eng.apply_settings_change(&mut doc, &off, &on) {
        SettingsReaction::Started(report) => assert_eq!(report.filtered.len(), 1),
        other => panic!("unexpected reaction: {:?}", other),
    }
    assert_eq!(eng.state(), EngineState::Watching);
}

#[test]
fn counter_only_change_is_a_no_op() {
    let (mut doc, _) = feed(&["casino"]);
    let mut eng = engine();
    eng.start(&mut doc);
    let old = eng.settings().clone();
    let mut new = old.clone();
    new.filter_count += 10;
    assert_eq!(eng.apply_settings_change(&mut doc, &old, &new), SettingsReaction::Unchanged);
    assert_eq!(eng.settings().filter_count, old.filter_count + 10);
}

#[test]
fn changes_while_disabled_do_nothing() {
    let mut settings = Settings::default();
    settings.enabled = false;
    let (mut doc, ids) = feed(&["casino"]);
    let mut eng = engine_with(settings.clone());
    let mut new = settings.clone();
    new.categories.politics = false;
    assert_eq!(eng.apply_settings_change(&mut doc, &settings, &new), SettingsReaction::Unchanged);
    assert!(!doc.has_attribute(ids[0], CHECKED_ATTR));
}
