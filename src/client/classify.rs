// ABOUTME: Maps a matched reply to a typed outcome using the tag of the matching expect entry
// ABOUTME: Pure function; the index-to-outcome mapping lives with each call site's Expect

use crate::client::error::{JcliError, JcliResult};
use crate::expect::{Match, OutcomeTag};
use crate::resources::ResourceKind;

/// What the command was about, for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub kind: ResourceKind,
    pub id: String,
}

impl Context {
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }
}

/// Classified console reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    NotFound { kind: ResourceKind, id: String },
    ValidationError(String),
    GenericFailure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Success text, or the matching [`JcliError`]
    pub fn into_result(self) -> JcliResult<String> {
        match self {
            Outcome::Success(text) => Ok(text),
            Outcome::NotFound { kind, id } => Err(JcliError::NotFound { kind, id }),
            Outcome::ValidationError(message) => Err(JcliError::Validation(message)),
            Outcome::GenericFailure(message) => Err(JcliError::GenericFailure(message)),
        }
    }
}

/// Classify a reply. Success keeps the raw captured text; failures carry the
/// whitespace-normalised console message.
pub fn classify(reply: &Match, context: &Context) -> Outcome {
    match reply.tag {
        OutcomeTag::Success => Outcome::Success(reply.captured.clone()),
        OutcomeTag::NotFound => Outcome::NotFound {
            kind: context.kind,
            id: context.id.clone(),
        },
        OutcomeTag::Validation => Outcome::ValidationError(reply.message()),
        OutcomeTag::Failure => Outcome::GenericFailure(reply.message()),
    }
}
