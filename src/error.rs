//! Error types shared by the vehicle model, the fleet manager and storage.

use thiserror::Error;

/// Failures raised by single-vehicle and fleet operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FleetError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Insufficient fuel: needed {needed:.2}, available {available:.2}")]
    InsufficientFuel { needed: f64, available: f64 },

    #[error("Overload: {0}")]
    Overload(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type FleetResult<T> = Result<T, FleetError>;

impl FleetError {
    pub fn invalid(message: impl Into<String>) -> Self {
        FleetError::InvalidOperation(message.into())
    }

    pub fn not_found(id: &str) -> Self {
        FleetError::NotFound(format!("Vehicle with ID '{}' not found.", id))
    }
}

/// Failures at the CSV persistence boundary.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Line {line}: unknown vehicle type '{vehicle_type}'")]
    UnknownType { line: usize, vehicle_type: String },

    #[error(transparent)]
    Fleet(#[from] FleetError),
}
