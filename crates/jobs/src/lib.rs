pub mod runner;
pub mod status_poll;

pub use runner::JobRunner;
pub use status_poll::StatusPollJob;
