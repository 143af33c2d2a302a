use napi::Result as NapiResult;
use napi_derive::napi;

use decision_mate_core::business::sensitivity::SensitivityConfig;
use decision_mate_core::ProjectInputs;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_config(config_json: Option<String>) -> NapiResult<SensitivityConfig> {
    match config_json {
        Some(json) => serde_json::from_str(&json).map_err(to_napi_error),
        None => Ok(SensitivityConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// Business case
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_project(input_json: String) -> NapiResult<String> {
    let input: ProjectInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = decision_mate_core::evaluate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyse_project(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: ProjectInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = parse_config(config_json)?;
    let output = decision_mate_core::analyse_project(&input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_sensitivity(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: ProjectInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = parse_config(config_json)?;
    let output = decision_mate_core::sensitivity_with(&input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Personal
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_options(input_json: String) -> NapiResult<String> {
    let input: decision_mate_core::personal::scoring::PersonalDecision =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        decision_mate_core::personal::scoring::compare_options(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
