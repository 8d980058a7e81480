mod toml_store;
mod uci_store;

pub use toml_store::TomlFileStore;
pub use uci_store::UciStore;
