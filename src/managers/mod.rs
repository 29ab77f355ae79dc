// calmfeed state managers
// Managers hold state shared across pages: the open tabs and the options form.

pub mod options_panel;
pub mod tab_registry;
