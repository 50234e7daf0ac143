use crate::shape::ShapeParseError;
use crate::types::BodyHandle;
use thiserror::Error;

/// Errors surfaced by fallible construction paths (loading, configuration).
///
/// Unknown joint or link names are deliberately not represented here: setters
/// treat them as no-ops and getters return `None`.
#[derive(Debug, Error)]
pub enum SimError {
    /// A body description was rejected before reaching the registry
    #[error("invalid body description: {0}")]
    InvalidDescription(String),

    /// The engine has no body under this handle
    #[error("unknown body {0}")]
    UnknownBody(BodyHandle),

    /// A link collision shape string could not be parsed
    #[error("invalid link shape: {0}")]
    ShapeParse(#[from] ShapeParseError),

    /// A configuration value is out of range or unparsable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SimError {
    pub fn invalid_description(reason: impl Into<String>) -> Self {
        Self::InvalidDescription(reason.into())
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}
