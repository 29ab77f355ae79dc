//! Placeholder Builder for calmfeed.
//!
//! Turns a filtered feed item into a calm replacement container and the
//! [`Placeholder`] record that keeps a deep copy of the original.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::dom::{Element, Listener, Node};
use crate::types::category::Category;
use crate::types::placeholder::{Placeholder, SHIELD_CLASS};
use crate::types::settings::DisplayOptions;

/// SVG scenes used as calming visuals.
const CALMING_SCENES: &[&str] = &[
    r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 300"><defs><linearGradient id="sky" x1="0" y1="0" x2="0" y2="1"><stop offset="0%" stop-color="#87CEEB"/><stop offset="100%" stop-color="#E0F6FF"/></linearGradient></defs><rect fill="url(#sky)" width="400" height="300"/><circle cx="320" cy="60" r="40" fill="#FFD700" opacity="0.8"/><ellipse cx="100" cy="250" rx="80" ry="30" fill="#98D8C8"/><ellipse cx="300" cy="260" rx="100" ry="35" fill="#98D8C8"/><path d="M 0 230 Q 100 200 200 230 T 400 230 L 400 300 L 0 300 Z" fill="#34C759"/></svg>"##,
    r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 300"><defs><linearGradient id="dusk" x1="0" y1="0" x2="0" y2="1"><stop offset="0%" stop-color="#FFB88C"/><stop offset="100%" stop-color="#DE6262"/></linearGradient></defs><rect fill="url(#dusk)" width="400" height="300"/><circle cx="200" cy="190" r="60" fill="#FFE29F" opacity="0.9"/><rect y="200" width="400" height="100" fill="#4A90B8"/><path d="M 0 220 Q 50 210 100 220 T 200 220 T 300 220 T 400 220" stroke="#A7D3EA" fill="none"/></svg>"##,
    r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 300"><rect fill="#E8F5E9" width="400" height="300"/><path d="M 0 300 L 120 140 L 240 300 Z" fill="#81C784"/><path d="M 160 300 L 280 120 L 400 300 Z" fill="#66BB6A"/><circle cx="80" cy="70" r="30" fill="#FFF59D"/></svg>"##,
];

/// Short encouraging lines shown inside a placeholder.
pub const ENCOURAGING_QUOTES: &[&str] = &[
    "Take a breath. You're doing great.",
    "Your wellbeing matters more than staying updated.",
    "Peace of mind is priceless.",
    "Protected content for your mental health.",
    "You chose calm over chaos today.",
    "This space is reserved for your peace.",
    "Filtered for your wellbeing \u{2728}",
    "Taking care of your mind, one post at a time.",
];

/// Label text for the reveal control.
pub const PEEK_LABEL: &str = "Show anyway";

fn scene_data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", BASE64.encode(svg.as_bytes()))
}

/// Builds the replacement container for a filtered item.
///
/// Returns the node to insert and the placeholder record that owns a deep
/// copy of `original`.
pub fn build(
    original: &Node,
    category: Category,
    options: DisplayOptions,
    rng: &mut dyn RngCore,
) -> (Node, Placeholder) {
    let mut content = Element::new("div").with_class("calmfeed-content");

    if options.show_images {
        if let Some(scene) = CALMING_SCENES.choose(&mut *rng) {
            content = content.with_child(
                Element::new("img")
                    .with_class("calming-image")
                    .with_attr("src", &scene_data_uri(scene))
                    .with_attr("alt", ""),
            );
        }
    }

    if options.show_quotes {
        if let Some(quote) = ENCOURAGING_QUOTES.choose(&mut *rng) {
            content = content.with_child(Element::new("div").with_class("quote").with_text(quote));
        }
    }

    content = content.with_child(
        Element::new("div")
            .with_class("filter-label")
            .with_text(&format!("{} content filtered", category)),
    );

    if options.allow_peek {
        content = content.with_child(
            Element::new("button")
                .with_class("peek-button")
                .with_text(PEEK_LABEL)
                .with_listener(Listener::reveal()),
        );
    }

    let container = Element::new("div")
        .with_class(SHIELD_CLASS)
        .with_attr("data-category", category.as_str())
        .with_child(content);

    let placeholder = Placeholder {
        category,
        retained_original: original.clone(),
        revealable: options.allow_peek,
    };
    (container.into(), placeholder)
}
