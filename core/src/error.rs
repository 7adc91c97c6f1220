use thiserror::Error;

use crate::engine::Outcome;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid parameter '{field}': {value}")]
    InvalidParameter { field: &'static str, value: f64 },

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: f64, available: f64 },

    #[error("Operation '{operation}' not allowed while {state}")]
    InvalidOperationInState {
        operation: &'static str,
        state: String,
    },

    #[error("Session already terminated ({outcome:?})")]
    AlreadyTerminated { outcome: Outcome },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// Reject a monetary input that is negative or not a finite number.
    pub fn check_amount(field: &'static str, value: f64) -> SimResult<f64> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(SimError::InvalidParameter { field, value })
        }
    }
}
