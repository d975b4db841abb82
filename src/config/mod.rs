pub mod settings;

pub use settings::*;

use std::path::PathBuf;

/// Returns the config directory: `$LEASE_LENS_HOME`, else `~/.config/lease-lens/`.
pub fn dirs_global() -> PathBuf {
    if let Ok(home) = std::env::var("LEASE_LENS_HOME") {
        if !home.trim().is_empty() {
            return PathBuf::from(home);
        }
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("lease-lens")
}
