use async_trait::async_trait;
use pref_dns_domain::DomainError;

/// A stored option is either a single value or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Single(String),
    List(Vec<String>),
}

impl ConfigValue {
    pub fn as_single(&self) -> Option<&str> {
        match self {
            ConfigValue::Single(v) => Some(v.as_str()),
            ConfigValue::List(items) => items.first().map(String::as_str),
        }
    }

    /// A single value is treated as a one-element list.
    pub fn into_list(self) -> Vec<String> {
        match self {
            ConfigValue::Single(v) if v.is_empty() => Vec::new(),
            ConfigValue::Single(v) => vec![v],
            ConfigValue::List(items) => items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigChange {
    /// Creates a named section of the given type if it does not exist yet.
    EnsureSection {
        section: String,
        section_type: String,
    },
    Set {
        section: String,
        option: String,
        value: ConfigValue,
    },
    Delete {
        section: String,
        option: String,
    },
}

impl ConfigChange {
    pub fn ensure_section(section: &str, section_type: &str) -> Self {
        ConfigChange::EnsureSection {
            section: section.to_string(),
            section_type: section_type.to_string(),
        }
    }

    pub fn set(section: &str, option: &str, value: impl Into<String>) -> Self {
        ConfigChange::Set {
            section: section.to_string(),
            option: option.to_string(),
            value: ConfigValue::Single(value.into()),
        }
    }

    pub fn set_list(section: &str, option: &str, values: Vec<String>) -> Self {
        ConfigChange::Set {
            section: section.to_string(),
            option: option.to_string(),
            value: ConfigValue::List(values),
        }
    }

    pub fn delete(section: &str, option: &str) -> Self {
        ConfigChange::Delete {
            section: section.to_string(),
            option: option.to_string(),
        }
    }
}

/// The router's configuration store, addressed as `package.section.option`.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn package_exists(&self, package: &str) -> Result<bool, DomainError>;

    async fn get(
        &self,
        package: &str,
        section: &str,
        option: &str,
    ) -> Result<Option<ConfigValue>, DomainError>;

    /// Applies every change to `package` and commits. Readers observe either
    /// none or all of the changes.
    async fn apply(&self, package: &str, changes: &[ConfigChange]) -> Result<(), DomainError>;

    /// Flushes changes staged by other writers (e.g. the web UI) for `package`.
    async fn commit(&self, package: &str) -> Result<(), DomainError>;
}
