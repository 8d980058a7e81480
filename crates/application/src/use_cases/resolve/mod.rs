mod domain_resolver;

pub use domain_resolver::DomainResolver;
