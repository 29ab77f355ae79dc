// calmfeed shared type definitions
// Each submodule defines types used across the crate.

pub mod category;
pub mod errors;
pub mod message;
pub mod placeholder;
pub mod settings;
