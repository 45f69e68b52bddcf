use std::path::PathBuf;

use serde::Deserialize;

/// `[folders]` section.
#[derive(Debug, Deserialize)]
pub struct FoldersConfig {
    /// Folder the camera writes into.
    #[serde(default = "default_watch")]
    pub watch: PathBuf,
    /// Root of the per-phone destination folders.
    #[serde(default = "default_clients")]
    pub clients: PathBuf,
}

impl Default for FoldersConfig {
    fn default() -> Self {
        Self {
            watch: default_watch(),
            clients: default_clients(),
        }
    }
}

fn default_watch() -> PathBuf {
    PathBuf::from("photo")
}

fn default_clients() -> PathBuf {
    PathBuf::from("clients")
}
