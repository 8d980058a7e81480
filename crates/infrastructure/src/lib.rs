//! Adapters behind the application ports: upstream DNS, config stores,
//! init scripts and the crontab.
mod atomic_file;
pub mod dns;
pub mod store;
pub mod system;
