//! calmfeed — a client-side feed content filter.
//!
//! Classifies social-feed items by topic, swaps stressful ones for calm
//! placeholders, and keeps watching the page as more content loads. This
//! library crate exposes all modules for the binaries and integration tests.

pub mod app;
pub mod database;
pub mod dom;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
