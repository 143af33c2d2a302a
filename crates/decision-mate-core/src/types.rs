use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Monetary amounts. Always Decimal, never f64.
pub type Money = Decimal;

/// Rates as decimals (0.10 = 10%), never percentages.
pub type Rate = Decimal;

/// A 1..=10 priority score on one criterion.
pub type Score = u8;

/// Result envelope returned by the reporting entry points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

impl<T: Serialize> ComputationOutput<T> {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub engine: String,
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap `result` in the envelope, timing from `started`.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    started: Instant,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            engine: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: started.elapsed().as_micros() as u64,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
