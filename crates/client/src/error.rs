#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The action ran but its output was not the expected JSON.
    #[error("Failed to parse result")]
    Parse(String),

    /// The action could not be run at all.
    #[error("Execution error: {0}")]
    Execution(String),
}

impl ClientError {
    pub fn detail(&self) -> &str {
        match self {
            ClientError::Parse(detail) | ClientError::Execution(detail) => detail,
        }
    }
}
