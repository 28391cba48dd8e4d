//! Error types for the Lattice Grid runtime.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// The main error type for core runtime operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Timer-related error.
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Id generation error.
    #[error("Invalid id prefix '{prefix}': {message}")]
    InvalidIdPrefix { prefix: String, message: String },
}

/// Timer-specific errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// The timer ID is invalid or has already been removed.
    #[error("Invalid or expired timer ID")]
    InvalidTimerId,
    /// A repeating timer was requested with a zero interval.
    #[error("Repeating timer interval must be non-zero")]
    ZeroInterval,
}

impl CoreError {
    /// Create an id prefix error.
    pub fn invalid_id_prefix(prefix: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidIdPrefix {
            prefix: prefix.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_error_converts() {
        let err: CoreError = TimerError::InvalidTimerId.into();
        assert!(matches!(err, CoreError::Timer(TimerError::InvalidTimerId)));
        assert_eq!(err.to_string(), "Timer error: Invalid or expired timer ID");
    }

    #[test]
    fn test_id_prefix_message() {
        let err = CoreError::invalid_id_prefix("", "prefix must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid id prefix '': prefix must not be empty"
        );
    }
}
