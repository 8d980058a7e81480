use clap::{Parser, Subcommand, ValueEnum};
use pref_dns_application::use_cases::CronAction;
use pref_dns_domain::config::StoreBackend;

#[derive(Parser)]
#[command(name = "pref-dns")]
#[command(version)]
#[command(about = "Preferred DNS - keeps MosDNS, PassWall and cron in line with your DNS preferences")]
pub struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Result format on stdout
    #[arg(long, value_enum, default_value_t = Format::Json, global = true)]
    pub format: Format,

    /// Configuration store backend
    #[arg(long, value_enum, global = true)]
    pub store: Option<StoreArg>,

    /// Directory of the toml store
    #[arg(long, value_name = "DIR", global = true)]
    pub store_dir: Option<String>,

    /// Directory holding the service init scripts
    #[arg(long, value_name = "DIR", global = true)]
    pub init_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Text,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StoreArg {
    Uci,
    Toml,
}

impl From<StoreArg> for StoreBackend {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Uci => StoreBackend::Uci,
            StoreArg::Toml => StoreBackend::Toml,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CronArg {
    Enable,
    Disable,
}

impl From<CronArg> for CronAction {
    fn from(arg: CronArg) -> Self {
        match arg {
            CronArg::Enable => CronAction::Enable,
            CronArg::Disable => CronAction::Disable,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a domain and store its addresses in the MosDNS allow-list
    Resolve {
        domain: String,
        /// Upstream resolver (ip, ip:port or ip#port)
        server: String,
    },
    /// Re-resolve every configured domain
    Update,
    /// Commit saved settings and restart the affected services
    #[command(name = "commit-and-restart", alias = "commit_and_restart")]
    CommitAndRestart,
    /// Register or remove the scheduled update
    Cron {
        #[arg(value_enum)]
        action: CronArg,
    },
    /// Point PassWall's remote DNS at the MosDNS listen port
    Write,
    /// Restore PassWall DNS settings to their defaults
    Restore,
    /// Show install/running state of MosDNS, PassWall and cron
    Status {
        /// Keep polling until interrupted
        #[arg(long)]
        watch: bool,
    },
    /// Show the stored allow-list, PassWall's remote DNS and the scheduled job
    Current,
    /// Read or edit individual settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

impl Command {
    /// Read-only commands run without the action lock.
    pub fn writes(&self) -> bool {
        match self {
            Command::Status { .. } | Command::Current => false,
            Command::Config { command } => matches!(command, ConfigCommand::Set { .. }),
            _ => true,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print one field
    Get { field: String },
    /// Validate and store one field
    Set { field: String, value: String },
    /// Print every field with its effective value
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_accepts_both_spellings() {
        for name in ["commit-and-restart", "commit_and_restart"] {
            let cli = Cli::try_parse_from(["pref-dns", name]).unwrap();
            assert!(matches!(cli.command, Command::CommitAndRestart));
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pref-dns",
            "resolve",
            "speed.cloudflare.com",
            "119.29.29.29",
            "--format",
            "text",
        ])
        .unwrap();
        assert_eq!(cli.format, Format::Text);
        assert!(cli.command.writes());
    }

    #[test]
    fn test_read_only_commands() {
        let status = Cli::try_parse_from(["pref-dns", "status", "--watch"]).unwrap();
        assert!(!status.command.writes());
        let show = Cli::try_parse_from(["pref-dns", "config", "show"]).unwrap();
        assert!(!show.command.writes());
        let current = Cli::try_parse_from(["pref-dns", "current"]).unwrap();
        assert!(!current.command.writes());
        let set = Cli::try_parse_from(["pref-dns", "config", "set", "dns_server", "1.1.1.1"])
            .unwrap();
        assert!(set.command.writes());
    }

    #[test]
    fn test_cron_requires_known_action() {
        assert!(Cli::try_parse_from(["pref-dns", "cron", "toggle"]).is_err());
    }
}
