pub mod evaluator;
pub mod inputs;
pub mod sensitivity;
