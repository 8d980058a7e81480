mod probe;
mod restart;

pub use probe::ServiceProbe;
pub use restart::{ReconcileReport, RestartCoordinator, RestartMap};
