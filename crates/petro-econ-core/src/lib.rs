pub mod error;
pub mod inputs;
pub mod types;

pub mod production;

pub mod valuation;

pub mod economics;

pub mod fiscal;

pub mod analysis;

pub use error::PetroEconError;
pub use types::*;

/// Standard result type for all petro-econ operations
pub type PetroEconResult<T> = Result<T, PetroEconError>;
