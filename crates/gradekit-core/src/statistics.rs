//! Summary statistics over a batch of grades.

use serde::{Deserialize, Serialize};

use crate::model::GradeResult;

/// Aggregate view of one graded batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of graded answers.
    pub count: usize,
    /// Mean grade, or 0.0 for an empty batch.
    pub average_grade: f64,
    pub highest_grade: Option<u8>,
    pub lowest_grade: Option<u8>,
    /// `distribution[g]` is the number of answers that received grade `g`.
    pub distribution: [usize; 6],
}

/// Summarize a batch of results.
pub fn summarize(results: &[GradeResult]) -> BatchSummary {
    let mut distribution = [0usize; 6];
    for r in results {
        distribution[usize::from(r.grade.min(5))] += 1;
    }

    let count = results.len();
    let average_grade = if count == 0 {
        0.0
    } else {
        results.iter().map(|r| f64::from(r.grade)).sum::<f64>() / count as f64
    };

    BatchSummary {
        count,
        average_grade,
        highest_grade: results.iter().map(|r| r.grade).max(),
        lowest_grade: results.iter().map(|r| r.grade).min(),
        distribution,
    }
}
