//! Runs the action binary as a subprocess and turns its output into the
//! notification lines a front end shows.
pub mod action_client;
pub mod error;
pub mod notifications;
pub mod request;
pub mod results;

pub use action_client::ActionClient;
pub use error::ClientError;
pub use notifications::{Level, Notification};
pub use request::{ActionRequest, OutputFormat};
pub use results::{CommitResult, ResolveResult, RestartField};
