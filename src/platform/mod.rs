// calmfeed platform abstraction
// Resolves where the storage database lives on Windows, macOS, and Linux.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "CALMFEED_DATA_DIR";

/// Returns the platform-specific data directory for calmfeed.
///
/// - **Linux**: `~/.local/share/calmfeed` (or `$XDG_DATA_HOME/calmfeed`)
/// - **macOS**: `~/Library/Application Support/calmfeed`
/// - **Windows**: `%APPDATA%/calmfeed`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// `$CALMFEED_DATA_DIR` when set and non-empty, else [`get_data_dir`].
pub fn resolve_data_dir() -> PathBuf {
    match std::env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => get_data_dir(),
    }
}
