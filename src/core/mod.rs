//! Core evaluation logic.

mod evaluator;

pub use evaluator::PolicyEvaluator;
