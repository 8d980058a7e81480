//! Preference-DNS domain layer
pub mod allow_list;
pub mod config;
pub mod cron_schedule;
pub mod errors;
pub mod hostname;
pub mod preference;
pub mod proxy_dns;
pub mod service;

pub use allow_list::{dedup_preserving_order, local_dns_target, AllowListState};
pub use config::{CliOverrides, Config};
pub use cron_schedule::{CronPreset, CronSchedule};
pub use errors::DomainError;
pub use hostname::{validate_hostname, ResolverAddress};
pub use preference::{PreferenceConfig, KNOWN_RESOLVERS};
pub use proxy_dns::{DnsMode, DnsShunt, ProxyDnsGlobal};
pub use service::{RestartOutcome, ServiceNames, ServiceRole, ServiceStatus};
