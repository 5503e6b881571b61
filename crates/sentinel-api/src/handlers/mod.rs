//! Route handlers organized by domain.

pub mod auth;
pub mod health;
pub mod user;

use sentinel_core::error::AppError;
use validator::Validate;

/// Runs `validator` rules, mapping the first failure into a validation error.
pub(crate) fn validate_body<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate().map_err(|errors| {
        let detail = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let reason = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field}: {reason}")
            })
            .unwrap_or_else(|| "Invalid request body".to_string());
        AppError::validation(detail)
    })
}
