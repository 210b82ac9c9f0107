/// Client-side checks that run before any gateway call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a {0}")]
    EmptyField(&'static str),

    #[error("The {field} must be {max} characters or less")]
    TooLong { field: &'static str, max: usize },

    #[error("Only image files can be uploaded")]
    NotAnImage,

    #[error("Images must be {max_mb}MB or smaller")]
    ImageTooLarge { max_mb: usize },

    #[error("A submission is already in progress")]
    InFlight,
}

/// Rejects values that are empty once surrounding whitespace is removed.
pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

/// `require` plus an upper bound counted in characters, not bytes.
pub fn require_within(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    require(field, value)?;
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
