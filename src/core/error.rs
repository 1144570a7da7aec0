use thiserror::Error;

/// Errors raised while building or executing a market query
///
/// None of these are fatal: the console reports the message and keeps
/// its in-memory state for the next command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Malformed numeric or coordinate input
    #[error("Ошибка: {0}")]
    Validation(String),

    /// A well-formed but semantically invalid combination of parameters
    #[error("Ошибка: {0}")]
    Precondition(String),

    /// Referenced market or review does not exist
    #[error("{0}")]
    NotFound(String),
}
