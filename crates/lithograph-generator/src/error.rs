//! Error types for the content pipeline.

use lithograph_core::CoreError;
use thiserror::Error;

use crate::stage::Stage;

/// Boxed error coming from outside the pipeline.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias using `GeneratorError`.
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Content pipeline errors.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A definition call was made outside of its stage.
    #[error(
        "This action is done in wrong stage. Expected \"{expected}\", have \"{actual}\". Check your content set definition sequence."
    )]
    StageViolation { expected: Stage, actual: Stage },

    /// The stage is already being completed by another call.
    #[error("Stage \"{stage}\" is already being completed; wait for it to finish.")]
    StageInTransition { stage: Stage },

    /// Something was registered twice under the same key.
    #[error("{kind} registered twice: {key}")]
    DuplicateRegistration { kind: &'static str, key: String },

    /// A pattern cannot produce or match anything useful.
    #[error("pattern error: {0}")]
    PatternViolation(String),

    /// A render was started while another one is still in progress.
    #[error(
        "Could not create another context: some context already present (old context is created for {active}, new context is requested for {requested})"
    )]
    RenderContextConflict { active: String, requested: String },

    /// No controller answered a describe probe.
    #[error(
        "Queried all of content controllers, but got no content item description (for url path \"{url_path}\")"
    )]
    RoutingInvariantViolation { url_path: String },

    /// A builder, render function or file operation failed.
    #[error("{operation} failed: {source}")]
    Upstream {
        operation: String,
        #[source]
        source: BoxError,
    },

    /// A definition is inconsistent with itself.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    /// A helper lookup found nothing usable.
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// Template rendering error.
    #[error("template error: {0}")]
    Template(String),

    /// Core library error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeneratorError {
    /// Wrap a failure of an external operation.
    pub fn upstream(operation: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Upstream {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// Create a duplicate registration error.
    pub fn duplicate(kind: &'static str, key: impl Into<String>) -> Self {
        Self::DuplicateRegistration {
            kind,
            key: key.into(),
        }
    }
}
