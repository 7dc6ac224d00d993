use thiserror::Error;

/// Common error type for linewatch components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration validation failed: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type alias using linewatch's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single fetch-parse cycle.
///
/// Every variant is recoverable: the poll loop drops the cycle and tries
/// again on the next tick.
#[derive(Debug, Error)]
pub enum PollError {
    /// The response did not have the expected overall shape.
    #[error("Unexpected response structure: {0}")]
    Structural(String),

    /// A field was present but not in its expected textual format.
    #[error("Invalid format for {field}: {message}")]
    Format { field: String, message: String },

    /// A numeric cell could not be parsed.
    #[error("Non-numeric value {value:?} in stat {stat:?}")]
    ValueParse { stat: String, value: String },

    /// A required row or key was absent.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Network failure, timeout, or non-success HTTP status.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PollError {
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    pub fn format(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// The category of this error.
    pub fn kind(&self) -> PollErrorKind {
        match self {
            Self::Structural(_) => PollErrorKind::Structural,
            Self::Format { .. } => PollErrorKind::Format,
            Self::ValueParse { .. } => PollErrorKind::ValueParse,
            Self::MissingField(_) => PollErrorKind::MissingField,
            Self::Transport(_) => PollErrorKind::Transport,
        }
    }
}

/// Category of a [`PollError`], used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollErrorKind {
    Structural,
    Format,
    ValueParse,
    MissingField,
    Transport,
}

impl PollErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollErrorKind::Structural => "structural",
            PollErrorKind::Format => "format",
            PollErrorKind::ValueParse => "value_parse",
            PollErrorKind::MissingField => "missing_field",
            PollErrorKind::Transport => "transport",
        }
    }
}

impl std::fmt::Display for PollErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
