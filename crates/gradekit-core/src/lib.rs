//! gradekit-core: scoring core for automated short-answer grading.
//!
//! This crate defines the data model, the embedding-provider trait, the
//! text heuristics, and the grading service that combines them into a
//! 0–5 grade with feedback.

pub mod aggregate;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod similarity;
pub mod statistics;
pub mod text;
pub mod traits;

pub use engine::{Grader, GradingMode, ModelInfo};
pub use error::{InitializationError, ProviderError, StrategyFailure};
pub use model::{CriterionScores, GradeResult, ModelState};
pub use traits::{EmbeddingProvider, EmbeddingVector};
