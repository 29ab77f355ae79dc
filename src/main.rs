//! calmfeed — calm replacements for stressful feed content.
//!
//! Demo mode: runs the filter against a simulated infinite-scroll feed,
//! then edits settings through the options panel while the page is live.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use calmfeed::app::App;
use calmfeed::dom::{Document, Element, Node, SelectorList};
use calmfeed::managers::options_panel::OptionsPanelTrait;
use calmfeed::managers::tab_registry::TabRegistryTrait;
use calmfeed::services::background::BackgroundTrait;
use calmfeed::services::scan_engine::ScanEngineTrait;
use calmfeed::types::category::Category;
use tracing_subscriber::EnvFilter;

const FIRST_PAGE: &[&str] = &[
    "Look at my cat sleeping in the sun",
    "BREAKING: market crash wipes out savings",
    "New sourdough recipe turned out great",
    "The election results are in",
];

const SECOND_PAGE: &[&str] = &[
    "Bet now, best odds at the sportsbook",
    "Hiking photos from the weekend",
    "Hurricane makes landfall, death toll rising",
];

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn tweet(text: &str) -> Node {
    Element::new("div")
        .with_attr("data-testid", "tweet")
        .with_child(Element::new("span").with_text(text))
        .into()
}

fn print_feed(doc: &Mutex<Document>) {
    let doc = doc.lock().unwrap_or_else(PoisonError::into_inner);
    let feed = doc.children(doc.body()).to_vec();
    for id in feed {
        match doc.attribute(id, "data-category") {
            Some(category) => println!("    [shield: {}]", category),
            None => println!("    {}", doc.text_content(id).unwrap_or_default()),
        }
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    println!();
    println!("  calmfeed v{} — Demo Mode", env!("CARGO_PKG_VERSION"));
    println!();

    let mut app = App::in_memory()?;

    section("Install");
    let welcome = app.install()?;
    println!("  {}: {}", welcome.title, welcome.message);

    section("Initial scan");
    let doc = Arc::new(Mutex::new(Document::new()));
    {
        let mut d = doc.lock().map_err(|e| e.to_string())?;
        let body = d.body();
        let posts: Vec<Node> = FIRST_PAGE.iter().map(|t| tweet(t)).collect();
        d.append_all(body, &posts)?;
    }
    let mut page = app.open_page("https://social.example/home", doc.clone(), true);
    let report = page.boot();
    println!("  examined {}, filtered {}", report.examined, report.filtered_count());
    print_feed(&doc);

    section("Peek");
    let peek: SelectorList = ".peek-button".parse()?;
    let button = doc.lock().map_err(|e| e.to_string())?.query_all(&peek).first().copied();
    if let Some(button) = button {
        let outcome = page.click(button)?;
        println!("  revealed: {:?}", outcome.revealed.is_some());
    }
    print_feed(&doc);

    let tab_id = page.tab_id().to_string();
    let runner = tokio::spawn(page.run());

    section("Infinite scroll");
    {
        let mut d = doc.lock().map_err(|e| e.to_string())?;
        let body = d.body();
        let posts: Vec<Node> = SECOND_PAGE.iter().map(|t| tweet(t)).collect();
        d.append_all(body, &posts)?;
    }
    settle().await;
    print_feed(&doc);

    section("Options: allow politics");
    app.options.set_category(Category::Politics, false, &app.tabs)?;
    settle().await;
    print_feed(&doc);

    section("Options: filtering off");
    app.options.set_enabled(false, &app.tabs)?;
    settle().await;
    print_feed(&doc);

    section("Badge");
    let badge = app.background.current_badge();
    println!("  badge text {:?}, colour {:?}", badge.text, badge.color);

    app.tabs.close_tab(&tab_id);
    let engine = runner.await?;
    println!();
    println!("  page closed with {} live placeholders", engine.placeholder_count());
    Ok(())
}
