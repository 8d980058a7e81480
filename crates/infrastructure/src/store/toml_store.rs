use crate::atomic_file::write_atomic;
use async_trait::async_trait;
use pref_dns_application::ports::{ConfigChange, ConfigStore, ConfigValue};
use pref_dns_domain::DomainError;
use std::path::PathBuf;
use tokio::sync::Mutex;
use toml_edit::{Array, DocumentMut, Item, Table, Value};
use tracing::debug;

/// One `<dir>/<package>.toml` per package; top-level tables are sections,
/// keys are options. Every `apply` rewrites the file atomically, so there is
/// nothing left to commit.
pub struct TomlFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl TomlFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn path(&self, package: &str) -> PathBuf {
        self.dir.join(format!("{}.toml", package))
    }

    async fn load(&self, package: &str) -> Result<Option<DocumentMut>, DomainError> {
        let path = self.path(package);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::ConfigStore(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        content.parse::<DocumentMut>().map(Some).map_err(|e| {
            DomainError::ConfigStore(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

fn set_val(table: &mut Table, key: &str, new_val: Value) {
    match table.get_mut(key) {
        Some(item @ Item::Value(_)) => {
            let suffix = item.as_value().and_then(|v| v.decor().suffix()).cloned();
            *item = Item::Value(new_val);
            if let (Some(s), Some(v)) = (suffix, item.as_value_mut()) {
                v.decor_mut().set_suffix(s);
            }
        }
        Some(item) => *item = Item::Value(new_val),
        None => {
            table.insert(key, Item::Value(new_val));
        }
    }
}

fn str_array(values: &[String]) -> Value {
    let mut arr = Array::new();
    for v in values {
        arr.push(v.as_str());
    }
    Value::Array(arr)
}

fn to_config_value(value: &Value) -> Option<ConfigValue> {
    match value {
        Value::String(s) => Some(ConfigValue::Single(s.value().clone())),
        Value::Integer(i) => Some(ConfigValue::Single(i.value().to_string())),
        Value::Boolean(b) => Some(ConfigValue::Single(if *b.value() { "1" } else { "0" }.to_string())),
        Value::Array(arr) => Some(ConfigValue::List(
            arr.iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.value().clone()),
                    Value::Integer(i) => Some(i.value().to_string()),
                    _ => None,
                })
                .collect(),
        )),
        _ => None,
    }
}

fn section_mut<'a>(doc: &'a mut DocumentMut, section: &str) -> Result<&'a mut Table, DomainError> {
    doc.get_mut(section)
        .and_then(Item::as_table_mut)
        .ok_or_else(|| DomainError::ConfigStore(format!("section '{}' not found", section)))
}

fn apply_change(doc: &mut DocumentMut, change: &ConfigChange) -> Result<(), DomainError> {
    match change {
        ConfigChange::EnsureSection { section, .. } => {
            if doc.get(section).and_then(Item::as_table).is_none() {
                doc.insert(section, Item::Table(Table::new()));
            }
        }
        ConfigChange::Set {
            section,
            option,
            value,
        } => {
            let table = section_mut(doc, section)?;
            match value {
                ConfigValue::Single(v) => set_val(table, option, Value::from(v.as_str())),
                ConfigValue::List(items) if items.is_empty() => {
                    table.remove(option);
                }
                ConfigValue::List(items) => set_val(table, option, str_array(items)),
            }
        }
        ConfigChange::Delete { section, option } => {
            if let Ok(table) = section_mut(doc, section) {
                table.remove(option);
            }
        }
    }
    Ok(())
}

#[async_trait]
impl ConfigStore for TomlFileStore {
    async fn package_exists(&self, package: &str) -> Result<bool, DomainError> {
        Ok(tokio::fs::metadata(self.path(package))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false))
    }

    async fn get(
        &self,
        package: &str,
        section: &str,
        option: &str,
    ) -> Result<Option<ConfigValue>, DomainError> {
        let Some(doc) = self.load(package).await? else {
            return Ok(None);
        };
        Ok(doc
            .get(section)
            .and_then(Item::as_table)
            .and_then(|t| t.get(option))
            .and_then(Item::as_value)
            .and_then(to_config_value))
    }

    async fn apply(&self, package: &str, changes: &[ConfigChange]) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;

        let mut doc = match self.load(package).await? {
            Some(doc) => doc,
            None if changes
                .iter()
                .any(|c| matches!(c, ConfigChange::EnsureSection { .. })) =>
            {
                DocumentMut::new()
            }
            None => {
                return Err(DomainError::ConfigStore(format!(
                    "configuration package '{}' not found",
                    package
                )))
            }
        };

        for change in changes {
            apply_change(&mut doc, change)?;
        }

        write_atomic(&self.path(package), &doc.to_string()).await?;
        debug!(package = %package, changes = changes.len(), "Package written");
        Ok(())
    }

    async fn commit(&self, package: &str) -> Result<(), DomainError> {
        debug!(package = %package, "Nothing staged for file store");
        Ok(())
    }
}
