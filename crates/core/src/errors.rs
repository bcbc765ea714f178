use std::fmt;

use thiserror::Error;

/// Backend systems a command may depend on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Salesforce,
    Nextopia,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salesforce => "Salesforce",
            Self::Nextopia => "Nextopia",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{backend} request failed: {message}")]
    Transport { backend: Backend, message: String },
    #[error("{backend} rejected credentials: {message}")]
    Authentication { backend: Backend, message: String },
    #[error("{backend} query failed: {message}")]
    Query { backend: Backend, message: String },
}

/// Terminal failures for a single slash-command request.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("{0}")]
    Configuration(String),
    #[error("slack verification failed")]
    Authentication,
    #[error("unknown slash command {0}")]
    UnknownCommand(String),
    #[error("missing required {0} credentials")]
    BackendUnavailable(Backend),
    #[error("{0}")]
    BackendQuery(String),
    #[error("malformed slash command request: {0}")]
    MalformedRequest(String),
}

impl CommandError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Authentication => 401,
            _ => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Authentication => "authentication",
            Self::UnknownCommand(_) => "unknown_command",
            Self::BackendUnavailable(_) => "backend_unavailable",
            Self::BackendQuery(_) => "backend_query",
            Self::MalformedRequest(_) => "malformed_request",
        }
    }
}

impl From<GatewayError> for CommandError {
    fn from(value: GatewayError) -> Self {
        Self::BackendQuery(value.to_string())
    }
}
