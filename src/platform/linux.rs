// calmfeed data path on Linux: ~/.local/share/calmfeed

use std::env;
use std::path::PathBuf;

/// Uses `$XDG_DATA_HOME/calmfeed` if set, otherwise `~/.local/share/calmfeed`.
pub fn get_data_dir() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg).join("calmfeed")
    } else {
        let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("calmfeed")
    }
}
