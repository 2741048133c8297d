use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with an owned id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Record-validator failures surface verbatim as validation messages.
impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_message_is_kept_verbatim() {
        let err: CoreError = ValidationError::InvalidAmount { amount: 0.5 }.into();
        match err {
            CoreError::Validation(msg) => assert_eq!(msg, "Amount cannot be less than 1."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn not_found_display_includes_entity_and_id() {
        let err = CoreError::not_found("Merchant", "acme@example.com");
        assert_eq!(
            err.to_string(),
            "Entity not found: Merchant with id acme@example.com"
        );
    }
}
