//! Generation error types.
//!
//! Only whole-request infeasibility is an error. Everything that goes wrong
//! at a single slot is recorded in the violation report instead.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that stop a generation request before any grid is produced.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid input: {} problem(s), first: {}", .0.len(), first_message(.0))]
    InvalidInput(Vec<ValidationError>),

    #[error("section {section} needs {required} periods but only {available} are schedulable")]
    InsufficientCapacity {
        section: String,
        required: usize,
        available: usize,
    },

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config read error: {0}")]
    ConfigRead(#[from] std::io::Error),
}

pub type GenerateResult<T> = Result<T, GenerateError>;

fn first_message(errors: &[ValidationError]) -> &str {
    errors.first().map(|e| e.message.as_str()).unwrap_or("none")
}
