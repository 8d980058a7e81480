//! Preference-DNS application layer: ports to the router's collaborators and
//! the reconciliation use cases built on them.
pub mod ports;
pub mod schema;
pub mod use_cases;
