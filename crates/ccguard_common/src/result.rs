//! Common result and error types for ccguard.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates a malformed input model or a bug in ccguard, never a rule
/// violation. Rule violations are reported through the diagnostic sink and
/// the operation still returns `Ok`.
pub type GuardResult<T> = Result<T, InternalError>;

/// An internal error indicating a broken translation-unit model or a bug,
/// not a coding-standard violation in the checked program.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
