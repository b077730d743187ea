// ABOUTME: Error taxonomy for console sessions, wizards and resource operations
// ABOUTME: Every failure carries the resource kind and id, or the console's own text

use crate::resources::ResourceKind;
use crate::response::ParseError;
use std::io;
use thiserror::Error;

/// Error type for all adapter operations
///
/// Errors are raised where they are detected and propagate unchanged; the
/// adapter never retries and never rolls back on the console side.
#[derive(Debug, Error)]
pub enum JcliError {
    /// Required input absent, detected before talking to the console
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// A round-robin route was given fewer than two connectors
    #[error("Multiple values required: {0}")]
    MultipleValuesRequired(String),

    /// The console does not know the identifier
    #[error("Unknown {kind}: {id}")]
    NotFound { kind: ResourceKind, id: String },

    /// Input rejected by the console or by local validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A wizard step or the wizard completion was rejected
    #[error("Wizard syntax error: {0}")]
    WizardSyntax(String),

    /// The console replied with something that is neither success nor not-found
    #[error("Action failed: {0}")]
    GenericFailure(String),

    /// No matching reply within the command timeout
    #[error("Operation timeout")]
    Timeout,

    /// Could not connect or authenticate
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// I/O error on the transport
    #[error("Connection error: {0}")]
    Connection(#[from] io::Error),

    /// The console closed the connection mid-exchange
    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    /// Console output did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A response pattern failed to compile
    #[error("Invalid response pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Operation not allowed in the current prompt state
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    /// Configuration value could not be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Status family the boundary layer maps an error to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    BadRequest,
    Failed,
    Unavailable,
}

impl JcliError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            JcliError::NotFound { .. } => ErrorCategory::NotFound,
            JcliError::MissingParameter(_)
            | JcliError::MultipleValuesRequired(_)
            | JcliError::Validation(_)
            | JcliError::WizardSyntax(_) => ErrorCategory::BadRequest,
            JcliError::GenericFailure(_)
            | JcliError::Parse(_)
            | JcliError::Pattern(_)
            | JcliError::InvalidState(_)
            | JcliError::InvalidConfig(_) => ErrorCategory::Failed,
            JcliError::Timeout
            | JcliError::ServiceUnavailable(_)
            | JcliError::Connection(_)
            | JcliError::ConnectionClosed => ErrorCategory::Unavailable,
        }
    }

    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        JcliError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Result type alias for adapter operations
pub type JcliResult<T> = Result<T, JcliError>;
