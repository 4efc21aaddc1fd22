//! Change normalization error types.

use thiserror::Error;

/// Result type for change handling operations.
pub type EventResult<T> = Result<T, EventError>;

/// Error type for change handling.
#[derive(Debug, Error)]
pub enum EventError {
    /// The invocation did not carry the route parameter holding the document id.
    #[error("Missing route parameter '{param}' for collection '{collection}'")]
    MissingRouteParam {
        /// Collection the trigger is bound to.
        collection: String,
        /// Route parameter that was expected.
        param: String,
    },

    /// No trigger function is registered under the given name.
    #[error("Unknown trigger function: {0}")]
    UnknownFunction(String),

    /// Two (source, collection) pairs produced the same function name.
    #[error("Duplicate trigger function: {0}")]
    DuplicateFunction(String),
}
