//! Grade aggregation and feedback synthesis.

use crate::model::{Criterion, CriterionScores, ModelState};

/// Feedback returned when the student submitted nothing.
pub const NO_ANSWER_FEEDBACK: &str =
    "No answer provided. Please submit a response so it can be graded.";

/// Feedback returned when there is no reference to grade against.
pub const NO_REFERENCE_FEEDBACK: &str =
    "Error: No reference answer provided. Grading requires a reference answer.";

const POSITIVE_MARKER: &str = "✓";
const NEUTRAL_MARKER: &str = "~";
const WARNING_MARKER: &str = "⚠";

/// Weighted sum of the criterion scores.
pub fn overall_score(scores: &CriterionScores) -> f64 {
    scores.iter().map(|(c, s)| s * c.weight()).sum()
}

/// Map a `[0, 1]` score onto the integer scale `0..=5`.
///
/// Halves round to the nearest even grade.
pub fn grade_from_score(score: f64) -> u8 {
    let scaled = (score * 5.0).round_ties_even();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, 5.0) as u8
}

/// One templated sentence per criterion, joined in the order content
/// accuracy, completeness, clarity, structure.
pub fn detailed_feedback(scores: &CriterionScores) -> String {
    scores
        .iter()
        .map(|(criterion, score)| criterion_sentence(criterion, score))
        .collect::<Vec<_>>()
        .join("\n")
}

fn criterion_sentence(criterion: Criterion, score: f64) -> String {
    let (marker, text) = if score >= 0.8 {
        (POSITIVE_MARKER, positive_text(criterion))
    } else if score >= 0.6 {
        (NEUTRAL_MARKER, neutral_text(criterion))
    } else {
        (WARNING_MARKER, warning_text(criterion))
    };
    format!("{marker} {text}")
}

fn positive_text(criterion: Criterion) -> &'static str {
    match criterion {
        Criterion::ContentAccuracy => {
            "Content accuracy: your answer captures the key ideas of the reference."
        }
        Criterion::Completeness => "Completeness: you covered the main points thoroughly.",
        Criterion::Clarity => "Clarity: your sentences are clear and well paced.",
        Criterion::Structure => "Structure: the answer is well organized and punctuated.",
    }
}

fn neutral_text(criterion: Criterion) -> &'static str {
    match criterion {
        Criterion::ContentAccuracy => {
            "Content accuracy: mostly on target, but some ideas differ from the reference."
        }
        Criterion::Completeness => "Completeness: a few important points are missing.",
        Criterion::Clarity => "Clarity: readable, though sentence length could be more balanced.",
        Criterion::Structure => {
            "Structure: acceptable, but check capitalization and punctuation."
        }
    }
}

fn warning_text(criterion: Criterion) -> &'static str {
    match criterion {
        Criterion::ContentAccuracy => {
            "Content accuracy: the answer diverges significantly from the expected content."
        }
        Criterion::Completeness => {
            "Completeness: many key points from the reference are not addressed."
        }
        Criterion::Clarity => {
            "Clarity: write complete sentences of moderate length to express your ideas."
        }
        Criterion::Structure => {
            "Structure: use full sentences with capitalization and ending punctuation."
        }
    }
}

/// Fixed feedback for single-score grading, by grade band.
pub fn similarity_feedback(grade: u8) -> &'static str {
    match grade {
        5 => "Excellent! Your answer closely matches the expected response.",
        4 => "Very good answer that covers most of the expected content.",
        3 => "Good answer, but there's room for more detail or precision.",
        2 => "Fair attempt, but important elements are missing.",
        _ => "Please review the topic again. Your answer needs significant improvement.",
    }
}

/// Band feedback plus a diagnostic suffix naming the dummy provider or the
/// similarity score.
pub fn similarity_feedback_with_diagnostics(
    grade: u8,
    similarity: f64,
    state: &ModelState,
) -> String {
    let base = similarity_feedback(grade);
    if state.is_dummy() {
        format!("{base} (Note: graded with the offline dummy model; accuracy may be reduced.)")
    } else {
        format!("{base} (Similarity score: {similarity:.2})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InitStrategy, ProviderKind};

    fn state(kind: ProviderKind) -> ModelState {
        ModelState {
            kind,
            model_name: "all-minilm".into(),
            strategy: InitStrategy::Primary,
            fallback_used: false,
        }
    }

    #[test]
    fn overall_uses_fixed_weights() {
        let scores = CriterionScores::new(1.0, 0.0, 0.0, 0.0);
        assert!((overall_score(&scores) - 0.4).abs() < 1e-12);
        let scores = CriterionScores::new(1.0, 1.0, 1.0, 1.0);
        assert!((overall_score(&scores) - 1.0).abs() < 1e-12);
        let scores = CriterionScores::new(0.0, 0.0, 0.0, 1.0);
        assert!((overall_score(&scores) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn grade_mapping_and_clamping() {
        assert_eq!(grade_from_score(0.0), 0);
        assert_eq!(grade_from_score(1.0), 5);
        assert_eq!(grade_from_score(0.8148), 4);
        assert_eq!(grade_from_score(1.4), 5);
        assert_eq!(grade_from_score(-0.5), 0);
        assert_eq!(grade_from_score(f64::NAN), 0);
        // 0.5 * 5 = 2.5 rounds to the even grade
        assert_eq!(grade_from_score(0.5), 2);
        assert_eq!(grade_from_score(0.7), 4);
    }

    #[test]
    fn detailed_feedback_buckets_and_order() {
        let scores = CriterionScores::new(0.9, 0.8, 0.7, 0.3);
        let feedback = detailed_feedback(&scores);
        let lines: Vec<&str> = feedback.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("✓ Content accuracy"));
        assert!(lines[1].starts_with("✓ Completeness"));
        assert!(lines[2].starts_with("~ Clarity"));
        assert!(lines[3].starts_with("⚠ Structure"));
    }

    #[test]
    fn similarity_feedback_bands() {
        assert!(similarity_feedback(5).starts_with("Excellent"));
        assert!(similarity_feedback(3).starts_with("Good answer"));
        assert_eq!(similarity_feedback(1), similarity_feedback(0));
    }

    #[test]
    fn diagnostic_suffix_names_provider_or_score() {
        let dummy = similarity_feedback_with_diagnostics(4, 0.8, &state(ProviderKind::Dummy));
        assert!(dummy.contains("dummy model"));
        assert!(!dummy.contains("Similarity score"));

        let real = similarity_feedback_with_diagnostics(4, 0.8712, &state(ProviderKind::Real));
        assert!(real.ends_with("(Similarity score: 0.87)"));
    }
}
