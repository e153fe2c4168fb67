//! Generic error handling utilities
//!
//! Unified fatal-error reporting across the configuration, queue and
//! pipeline error types.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message the user can act on
    /// directly (bad config value, unknown key, missing file)
    fn is_user_actionable(&self) -> bool;

    /// The user-facing message for actionable errors
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// User-actionable errors show their own message; system errors show the
/// operation context. Full detail always goes to debug level.
///
/// # Examples
/// ```rust,no_run
/// # use drainq::core::error_handling::log_error_with_context;
/// # use drainq::app::cli::config::ConfigError;
/// let err = ConfigError::invalid("count", "expected a non-negative integer");
/// log_error_with_context(&err, "Configuration loading");
/// // Logs: "FATAL: Invalid value for 'count': expected a non-negative integer"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
