use serde::Deserialize;

/// Configuration for the state store backend.
#[derive(Debug, Deserialize)]
pub struct StateConfig {
    /// Which backend to use: `"memory"` or `"sqlite"`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Database URL for the `sqlite` backend (e.g. `sqlite://darkroom.db`).
    pub url: Option<String>,

    /// Table prefix for the `sqlite` backend. Defaults to `"darkroom_"`.
    pub prefix: Option<String>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: None,
            prefix: None,
        }
    }
}

fn default_backend() -> String {
    "memory".to_owned()
}
