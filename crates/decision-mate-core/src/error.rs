use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Not computable: {metric} — {reason}")]
    NotComputable { metric: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DecisionError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        DecisionError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Decimal overflow while computing `metric`.
    pub(crate) fn overflow(metric: &str, context: impl std::fmt::Display) -> Self {
        DecisionError::NotComputable {
            metric: metric.into(),
            reason: format!("arithmetic overflow {context}"),
        }
    }
}

impl From<serde_json::Error> for DecisionError {
    fn from(e: serde_json::Error) -> Self {
        DecisionError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for DecisionError {
    fn from(e: std::io::Error) -> Self {
        DecisionError::Storage(e.to_string())
    }
}
