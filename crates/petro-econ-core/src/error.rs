use thiserror::Error;

/// The only error that escapes the library. Every calculation-level failure
/// (undefined metric, non-convergence, missing optional group) is reported
/// as a value on the output envelope instead.
#[derive(Debug, Error)]
pub enum PetroEconError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl PetroEconError {
    pub fn invalid(field: &str, reason: &str) -> Self {
        PetroEconError::InvalidInput {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}
