pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "business")]
pub mod business;

#[cfg(feature = "personal")]
pub mod personal;

#[cfg(feature = "history")]
pub mod history;

pub use error::DecisionError;
pub use types::*;

#[cfg(feature = "business")]
pub use business::evaluator::{analyse_project, evaluate, FinancialSummary};
#[cfg(feature = "business")]
pub use business::inputs::ProjectInputs;
#[cfg(feature = "business")]
pub use business::sensitivity::{sensitivity, sensitivity_with, SensitivityConfig, SensitivityReport};

/// Standard result type for all decision-engine operations
pub type DecisionResult<T> = Result<T, DecisionError>;
