//! Result alias re-export and logging combinators.
//!
//! Lets list decoding drop bad entries without unwrap and without losing the
//! reason in the logs.

pub use crate::error::Result;

/// Extension trait for results whose failure is worth a log line but not a
/// failed operation.
pub trait ResultExt<T> {
    /// Convert to an `Option`, logging the error at `warn` if present.
    fn into_option_logged(self) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn into_option_logged(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping entry");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_into_option_logged_ok() {
        let result: Result<i32> = Ok(42);
        assert_eq!(result.into_option_logged(), Some(42));
    }

    #[test]
    fn test_into_option_logged_err() {
        let result: Result<i32> = Err(Error::invalid_identifier("x", "bad"));
        assert_eq!(result.into_option_logged(), None);
    }

    #[test]
    fn test_into_option_logged_foreign_error() {
        let result: std::result::Result<i32, String> = Err("boom".to_string());
        assert_eq!(result.into_option_logged(), None);
    }
}
