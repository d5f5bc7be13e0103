pub mod auth;
pub mod dashboard;
pub mod equipment;
pub mod error;
pub mod health;
pub mod rental;

use crate::error::app_error::AppError;

/// Path ids are numeric; anything else is a malformed request rather than a missing route.
#[allow(clippy::result_large_err)]
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::Validation(format!("Invalid {} id", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_positive_integers() {
        assert_eq!(parse_id("42", "rental").ok(), Some(42));
    }

    #[test]
    fn parse_id_rejects_garbage() {
        for raw in ["abc", "-1", "0", ""] {
            match parse_id(raw, "rental") {
                Err(AppError::Validation(message)) => assert_eq!(message, "Invalid rental id"),
                other => panic!("expected validation error for {raw:?}, got {other:?}"),
            }
        }
    }
}
