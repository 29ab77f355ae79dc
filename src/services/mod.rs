// calmfeed services
// Services provide core functionality: classification, placeholders, the
// scan & watch engine, storage, settings sync, and the background worker.

pub mod background;
pub mod classifier;
pub mod page_context;
pub mod pattern_catalog;
pub mod placeholder_builder;
pub mod scan_engine;
pub mod settings_bridge;
pub mod storage_area;
