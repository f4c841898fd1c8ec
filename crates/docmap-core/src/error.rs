use crate::value::EntityId;
use docmap_schema::SchemaError;
use thiserror::Error as ThisError;

///
/// Error
///
/// Mapping-layer error taxonomy. Resolver and registry failures are fatal
/// to the surrounding call; `EntityNotFound` is the one recoverable case
/// (converted to an empty result by the try-variants). Storage failures are
/// wrapped so the cause stays attributable to the right layer.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("no schema registered for '{discriminator}'")]
    UnknownType { discriminator: String },

    #[error("type '{name}' is already registered")]
    DuplicateRegistration { name: String },

    #[error("expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("entity '{id}' not found")]
    EntityNotFound { id: EntityId },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("store: {message}")]
    Store { message: String },
}

impl Error {
    /// Storage-layer failure surfaced through the repository capability.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unknown_type(discriminator: impl Into<String>) -> Self {
        Self::UnknownType {
            discriminator: discriminator.into(),
        }
    }
}
