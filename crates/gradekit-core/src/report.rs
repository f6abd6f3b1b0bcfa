//! Batch grading reports with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{GradingMode, ModelInfo};
use crate::model::{AnswerSet, AssignmentType, GradeResult};
use crate::statistics::{summarize, BatchSummary};

/// A complete batch grading report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the answer set.
    pub assignment: AssignmentSummary,
    /// The model that produced the similarity scores.
    pub model: ModelInfo,
    pub mode: GradingMode,
    /// Per-student results, in answer-set order.
    pub results: Vec<StudentResult>,
    pub summary: BatchSummary,
}

/// Summary of an answer set (without the answers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub id: String,
    pub name: String,
    pub assignment_type: AssignmentType,
    pub reference: String,
    pub answer_count: usize,
}

/// One student's graded answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentResult {
    pub student: String,
    #[serde(flatten)]
    pub result: GradeResult,
}

impl BatchReport {
    /// Assemble a report. `results` must be in `set.answers` order.
    pub fn new(
        set: &AnswerSet,
        model: ModelInfo,
        mode: GradingMode,
        results: Vec<GradeResult>,
    ) -> Self {
        let summary = summarize(&results);
        let results = set
            .answers
            .iter()
            .zip(results)
            .map(|(answer, result)| StudentResult {
                student: answer.student.clone(),
                result,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            assignment: AssignmentSummary {
                id: set.id.clone(),
                name: set.name.clone(),
                assignment_type: set.assignment_type,
                reference: set.reference.clone(),
                answer_count: set.answers.len(),
            },
            model,
            mode,
            results,
            summary,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: BatchReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
