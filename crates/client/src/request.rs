use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
        }
    }
}

/// One invocation of the action binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    Resolve { domain: String, server: String },
    CommitAndRestart,
    Cron { enable: bool },
    Update,
    Write,
    Restore,
}

impl ActionRequest {
    pub fn resolve(domain: impl Into<String>, server: impl Into<String>) -> Self {
        Self::Resolve {
            domain: domain.into(),
            server: server.into(),
        }
    }

    /// Arguments after the global flags.
    pub fn args(&self) -> Vec<String> {
        match self {
            ActionRequest::Resolve { domain, server } => {
                vec!["resolve".to_string(), domain.clone(), server.clone()]
            }
            ActionRequest::CommitAndRestart => vec!["commit_and_restart".to_string()],
            ActionRequest::Cron { enable } => vec![
                "cron".to_string(),
                if *enable { "enable" } else { "disable" }.to_string(),
            ],
            ActionRequest::Update => vec!["update".to_string()],
            ActionRequest::Write => vec!["write".to_string()],
            ActionRequest::Restore => vec!["restore".to_string()],
        }
    }

    /// Resolve and commit are decoded from JSON; the rest report a line of text.
    pub fn format(&self) -> OutputFormat {
        match self {
            ActionRequest::Resolve { .. } | ActionRequest::CommitAndRestart => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

impl fmt::Display for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.args().join(" "))
    }
}
