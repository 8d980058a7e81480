use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// The router's native store, driven through the `uci` command.
    #[default]
    Uci,

    /// One TOML document per package; for hosts without `uci`.
    Toml,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uci => "uci",
            Self::Toml => "toml",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_toml_dir")]
    pub toml_dir: String,

    #[serde(default = "default_uci_bin")]
    pub uci_bin: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            toml_dir: default_toml_dir(),
            uci_bin: default_uci_bin(),
        }
    }
}

fn default_toml_dir() -> String {
    "/etc/pref-dns/store".to_string()
}

fn default_uci_bin() -> String {
    "uci".to_string()
}
