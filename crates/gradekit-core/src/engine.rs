//! The grading service.
//!
//! A [`Grader`] owns the active embedding provider and the [`ModelState`]
//! chosen at initialization. Every grading call reads that state; nothing
//! mutates it afterwards.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    detailed_feedback, grade_from_score, overall_score, similarity_feedback_with_diagnostics,
    NO_ANSWER_FEEDBACK, NO_REFERENCE_FEEDBACK,
};
use crate::criteria;
use crate::model::{
    AssignmentType, CriterionScores, GradeResult, InitStrategy, ModelState, ProviderKind,
    SimilaritySource,
};
use crate::similarity::{cosine_similarity, lexical_similarity};
use crate::traits::EmbeddingProvider;

/// Which grading output to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingMode {
    /// Four-criterion breakdown with per-criterion feedback.
    #[default]
    Criteria,
    /// Similarity only, with band feedback and a diagnostic suffix.
    Similarity,
}

impl std::str::FromStr for GradingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "criteria" | "detailed" => Ok(GradingMode::Criteria),
            "similarity" | "simple" => Ok(GradingMode::Similarity),
            other => Err(format!("unknown grading mode: {other}")),
        }
    }
}

/// Describes the active model for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub provider: String,
    pub model_name: String,
    pub kind: ProviderKind,
    pub strategy: InitStrategy,
    pub fallback_used: bool,
    pub assignment_types: Vec<AssignmentType>,
}

/// Session-scoped grading service.
pub struct Grader {
    provider: Arc<dyn EmbeddingProvider>,
    state: ModelState,
}

impl Grader {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, state: ModelState) -> Self {
        Self { provider, state }
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: self.provider.name().to_string(),
            model_name: self.state.model_name.clone(),
            kind: self.state.kind,
            strategy: self.state.strategy,
            fallback_used: self.state.fallback_used,
            assignment_types: AssignmentType::all().to_vec(),
        }
    }

    /// Similarity between two texts, floored at 0.
    ///
    /// Embeds both texts in a single `encode` call. If that call fails, or
    /// returns the wrong number of vectors or vectors of different lengths,
    /// the Jaccard token overlap is used for this call only.
    pub async fn calculate_similarity(&self, a: &str, b: &str) -> (f64, SimilaritySource) {
        let texts = [a.to_string(), b.to_string()];
        match self.provider.encode(&texts).await {
            Ok(vectors) if vectors.len() == 2 && vectors[0].len() == vectors[1].len() => {
                let similarity = cosine_similarity(&vectors[0], &vectors[1]);
                (similarity.max(0.0), SimilaritySource::Embedding)
            }
            Ok(vectors) if vectors.len() == 2 => {
                tracing::warn!(
                    provider = self.provider.name(),
                    left = vectors[0].len(),
                    right = vectors[1].len(),
                    "embedding dimensions differ, using lexical similarity"
                );
                (lexical_similarity(a, b), SimilaritySource::Lexical)
            }
            Ok(vectors) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    returned = vectors.len(),
                    "provider returned wrong number of embeddings, using lexical similarity"
                );
                (lexical_similarity(a, b), SimilaritySource::Lexical)
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    network = e.is_network(),
                    "embedding failed, using lexical similarity: {e}"
                );
                (lexical_similarity(a, b), SimilaritySource::Lexical)
            }
        }
    }

    /// Grade with the four-criterion breakdown.
    pub async fn grade_response(&self, student: &str, reference: &str) -> GradeResult {
        if let Some(result) = reject_empty(student, reference) {
            return result;
        }

        let (similarity, source) = self.calculate_similarity(student, reference).await;
        let scores = CriterionScores::new(
            criteria::content_accuracy(similarity),
            criteria::completeness(student, reference),
            criteria::clarity(student),
            criteria::structure(student),
        );
        let grade = grade_from_score(overall_score(&scores));
        tracing::debug!(grade, ?scores, ?source, "graded response");

        GradeResult {
            grade,
            feedback: detailed_feedback(&scores),
            scores: Some(scores),
            similarity_source: source,
        }
    }

    /// Grade from similarity alone.
    pub async fn grade_similarity(&self, student: &str, reference: &str) -> GradeResult {
        if let Some(result) = reject_empty(student, reference) {
            return result;
        }

        let (similarity, source) = self.calculate_similarity(student, reference).await;
        let grade = grade_from_score(similarity);
        GradeResult {
            grade,
            feedback: similarity_feedback_with_diagnostics(grade, similarity, &self.state),
            scores: None,
            similarity_source: source,
        }
    }

    /// Grade in the given mode.
    pub async fn grade(&self, student: &str, reference: &str, mode: GradingMode) -> GradeResult {
        match mode {
            GradingMode::Criteria => self.grade_response(student, reference).await,
            GradingMode::Similarity => self.grade_similarity(student, reference).await,
        }
    }

    /// Grade an answer for a labelled assignment type.
    ///
    /// The label is recorded in the trace but does not change the weights.
    pub async fn grade_with_type(
        &self,
        student: &str,
        reference: &str,
        assignment_type: AssignmentType,
    ) -> GradeResult {
        tracing::debug!(%assignment_type, "grading typed assignment");
        self.grade_response(student, reference).await
    }

    /// Grade each answer against the same reference, preserving input order.
    ///
    /// The provider is flushed once after the whole batch.
    pub async fn grade_multiple_responses(
        &self,
        students: &[String],
        reference: &str,
        mode: GradingMode,
    ) -> Vec<GradeResult> {
        let results: Vec<GradeResult> = stream::iter(students)
            .then(|student| self.grade(student, reference, mode))
            .collect()
            .await;
        self.flush().await;
        results
    }

    /// Persist provider state such as newly cached embeddings.
    ///
    /// Failures are logged; grading results never depend on them.
    pub async fn flush(&self) {
        if let Err(e) = self.provider.flush().await {
            tracing::warn!(provider = self.provider.name(), "failed to flush provider: {e}");
        }
    }
}

fn reject_empty(student: &str, reference: &str) -> Option<GradeResult> {
    let feedback = if student.trim().is_empty() {
        NO_ANSWER_FEEDBACK
    } else if reference.trim().is_empty() {
        NO_REFERENCE_FEEDBACK
    } else {
        return None;
    };
    Some(GradeResult {
        grade: 0,
        feedback: feedback.to_string(),
        scores: None,
        similarity_source: SimilaritySource::None,
    })
}
