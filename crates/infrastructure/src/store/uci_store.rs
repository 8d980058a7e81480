use crate::atomic_file::write_atomic;
use async_trait::async_trait;
use pref_dns_application::ports::{ConfigChange, ConfigStore, ConfigValue};
use pref_dns_domain::DomainError;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

const DEFAULT_CONFIG_DIR: &str = "/etc/config";

/// The router's UCI store, driven through the `uci` command line tool.
///
/// `apply` stages every change and commits once; a failed step reverts the
/// package so nothing half-written reaches the committed file.
pub struct UciStore {
    uci_bin: String,
    config_dir: PathBuf,
    custom_dir: bool,
}

impl UciStore {
    pub fn new(uci_bin: impl Into<String>) -> Self {
        Self {
            uci_bin: uci_bin.into(),
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            custom_dir: false,
        }
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self.custom_dir = true;
        self
    }

    fn base_args(&self) -> Vec<String> {
        let mut args = vec!["-q".to_string()];
        if self.custom_dir {
            args.push("-c".to_string());
            args.push(self.config_dir.display().to_string());
        }
        args
    }

    async fn uci(&self, args: &[String]) -> Result<std::process::Output, DomainError> {
        let mut full = self.base_args();
        full.extend_from_slice(args);
        Command::new(&self.uci_bin)
            .args(&full)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DomainError::ConfigStore(format!("Failed to run {}: {}", self.uci_bin, e)))
    }

    async fn uci_checked(&self, args: &[String]) -> Result<String, DomainError> {
        let output = self.uci(args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::ConfigStore(format!(
                "uci {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn section_exists(&self, package: &str, section: &str) -> Result<bool, DomainError> {
        let output = self
            .uci(&["get".to_string(), format!("{}.{}", package, section)])
            .await?;
        Ok(output.status.success())
    }

    async fn run_change(&self, package: &str, change: &ConfigChange) -> Result<(), DomainError> {
        if let ConfigChange::EnsureSection { section, .. } = change {
            if self.section_exists(package, section).await? {
                return Ok(());
            }
        }
        for args in change_commands(package, change) {
            let tolerate_failure = args.first().map(String::as_str) == Some("delete");
            let output = self.uci(&args).await?;
            if !output.status.success() && !tolerate_failure {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(DomainError::ConfigStore(format!(
                    "uci {} failed: {}",
                    args.join(" "),
                    stderr.trim()
                )));
            }
        }
        Ok(())
    }
}

/// The `uci` invocations that realise one change, in order. Deleting an
/// option that does not exist is not an error.
fn change_commands(package: &str, change: &ConfigChange) -> Vec<Vec<String>> {
    match change {
        ConfigChange::EnsureSection {
            section,
            section_type,
        } => vec![vec![
            "set".to_string(),
            format!("{}.{}={}", package, section, section_type),
        ]],
        ConfigChange::Set {
            section,
            option,
            value: ConfigValue::Single(value),
        } => vec![vec![
            "set".to_string(),
            format!("{}.{}.{}={}", package, section, option, value),
        ]],
        ConfigChange::Set {
            section,
            option,
            value: ConfigValue::List(items),
        } => {
            let key = format!("{}.{}.{}", package, section, option);
            let mut commands = vec![vec!["delete".to_string(), key.clone()]];
            commands.extend(
                items
                    .iter()
                    .map(|item| vec!["add_list".to_string(), format!("{}={}", key, item)]),
            );
            commands
        }
        ConfigChange::Delete { section, option } => vec![vec![
            "delete".to_string(),
            format!("{}.{}.{}", package, section, option),
        ]],
    }
}

/// Splits the right-hand side of `uci show` output (`'a' 'b c'`) into its
/// values. A quote inside a value is written as `'\''`.
fn parse_show_value(raw: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut chars = raw.trim().chars().peekable();
    let mut in_quotes = false;
    let mut touched = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_quotes = !in_quotes;
                touched = true;
            }
            '\\' if !in_quotes => {
                if let Some(next) = chars.next() {
                    current.push(next);
                    touched = true;
                }
            }
            ' ' if !in_quotes => {
                if touched {
                    values.push(std::mem::take(&mut current));
                    touched = false;
                }
            }
            c => {
                current.push(c);
                touched = true;
            }
        }
    }
    if touched {
        values.push(current);
    }
    values
}

#[async_trait]
impl ConfigStore for UciStore {
    async fn package_exists(&self, package: &str) -> Result<bool, DomainError> {
        let output = self.uci(&["show".to_string(), package.to_string()]).await?;
        Ok(output.status.success())
    }

    async fn get(
        &self,
        package: &str,
        section: &str,
        option: &str,
    ) -> Result<Option<ConfigValue>, DomainError> {
        let output = self
            .uci(&[
                "show".to_string(),
                format!("{}.{}.{}", package, section, option),
            ])
            .await?;
        if !output.status.success() {
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some((_, raw)) = stdout.lines().next().and_then(|l| l.split_once('=')) else {
            return Ok(None);
        };

        let mut values = parse_show_value(raw);
        Ok(match values.len() {
            0 => None,
            1 => values.pop().map(ConfigValue::Single),
            _ => Some(ConfigValue::List(values)),
        })
    }

    #[instrument(skip(self, changes), fields(changes = changes.len()))]
    async fn apply(&self, package: &str, changes: &[ConfigChange]) -> Result<(), DomainError> {
        if !self.package_exists(package).await? {
            let creates = changes
                .iter()
                .any(|c| matches!(c, ConfigChange::EnsureSection { .. }));
            if !creates {
                return Err(DomainError::ConfigStore(format!(
                    "configuration package '{}' not found",
                    package
                )));
            }
            write_atomic(&self.config_dir.join(package), "").await?;
            debug!(package = %package, "Created empty configuration package");
        }

        for change in changes {
            if let Err(e) = self.run_change(package, change).await {
                warn!(package = %package, error = %e, "Reverting staged changes");
                if let Err(revert) = self
                    .uci_checked(&["revert".to_string(), package.to_string()])
                    .await
                {
                    warn!(package = %package, error = %revert, "Revert failed");
                }
                return Err(e);
            }
        }

        self.commit(package).await
    }

    async fn commit(&self, package: &str) -> Result<(), DomainError> {
        self.uci_checked(&["commit".to_string(), package.to_string()])
            .await?;
        debug!(package = %package, "Package committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_show_single_and_list() {
        assert_eq!(parse_show_value("'119.29.29.29'"), vec!["119.29.29.29"]);
        assert_eq!(
            parse_show_value("'1.1.1.1' '1.0.0.1'"),
            vec!["1.1.1.1", "1.0.0.1"]
        );
        assert_eq!(parse_show_value("'0 */6 * * *'"), vec!["0 */6 * * *"]);
        assert_eq!(parse_show_value("''"), vec![""]);
    }

    #[test]
    fn test_parse_show_escaped_quote() {
        assert_eq!(parse_show_value(r#"'it'\''s'"#), vec!["it's"]);
    }

    #[test]
    fn test_list_change_replaces_all_items() {
        let change = ConfigChange::set_list(
            "config",
            "cloudflare_ip",
            vec!["1.1.1.1".to_string(), "1.0.0.1".to_string()],
        );
        let commands = change_commands("mosdns", &change);
        assert_eq!(
            commands,
            vec![
                vec!["delete", "mosdns.config.cloudflare_ip"],
                vec!["add_list", "mosdns.config.cloudflare_ip=1.1.1.1"],
                vec!["add_list", "mosdns.config.cloudflare_ip=1.0.0.1"],
            ]
        );
    }

    #[test]
    fn test_anonymous_section_addressing() {
        let change = ConfigChange::set("@global[0]", "remote_dns", "127.0.0.1#5335");
        assert_eq!(
            change_commands("passwall", &change),
            vec![vec!["set", "passwall.@global[0].remote_dns=127.0.0.1#5335"]]
        );
    }

    #[test]
    fn test_ensure_section_sets_type() {
        let change = ConfigChange::ensure_section("config", "pref_dns");
        assert_eq!(
            change_commands("pref_dns", &change),
            vec![vec!["set", "pref_dns.config=pref_dns"]]
        );
    }
}
