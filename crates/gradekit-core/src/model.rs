//! Core data model types for gradekit.
//!
//! These are the values that flow through a grading call: criterion scores,
//! grade results, and the session-wide model state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of assignment an answer belongs to.
///
/// Accepted on every grading call; it does not alter the criterion weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentType {
    #[default]
    ShortAnswer,
    Essay,
    Definition,
    ProblemSolving,
}

impl AssignmentType {
    /// Every supported assignment type, in display order.
    pub fn all() -> &'static [AssignmentType] {
        &[
            AssignmentType::ShortAnswer,
            AssignmentType::Essay,
            AssignmentType::Definition,
            AssignmentType::ProblemSolving,
        ]
    }
}

impl fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentType::ShortAnswer => write!(f, "short_answer"),
            AssignmentType::Essay => write!(f, "essay"),
            AssignmentType::Definition => write!(f, "definition"),
            AssignmentType::ProblemSolving => write!(f, "problem_solving"),
        }
    }
}

impl FromStr for AssignmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "short_answer" | "short" => Ok(AssignmentType::ShortAnswer),
            "essay" => Ok(AssignmentType::Essay),
            "definition" => Ok(AssignmentType::Definition),
            "problem_solving" => Ok(AssignmentType::ProblemSolving),
            other => Err(format!("unknown assignment type: {other}")),
        }
    }
}

/// One of the four grading criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    ContentAccuracy,
    Completeness,
    Clarity,
    Structure,
}

impl Criterion {
    /// All criteria in feedback order.
    pub const ALL: [Criterion; 4] = [
        Criterion::ContentAccuracy,
        Criterion::Completeness,
        Criterion::Clarity,
        Criterion::Structure,
    ];

    /// Fixed aggregation weight. The four weights sum to 1.0.
    pub fn weight(self) -> f64 {
        match self {
            Criterion::ContentAccuracy => 0.4,
            Criterion::Completeness => 0.3,
            Criterion::Clarity => 0.2,
            Criterion::Structure => 0.1,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::ContentAccuracy => write!(f, "content_accuracy"),
            Criterion::Completeness => write!(f, "completeness"),
            Criterion::Clarity => write!(f, "clarity"),
            Criterion::Structure => write!(f, "structure"),
        }
    }
}

/// Per-criterion scores for one grading call. Every value lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionScores {
    pub content_accuracy: f64,
    pub completeness: f64,
    pub clarity: f64,
    pub structure: f64,
}

impl CriterionScores {
    /// Build a score set, clamping every value into `[0, 1]`.
    pub fn new(content_accuracy: f64, completeness: f64, clarity: f64, structure: f64) -> Self {
        Self {
            content_accuracy: clamp_unit(content_accuracy),
            completeness: clamp_unit(completeness),
            clarity: clamp_unit(clarity),
            structure: clamp_unit(structure),
        }
    }

    pub fn get(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::ContentAccuracy => self.content_accuracy,
            Criterion::Completeness => self.completeness,
            Criterion::Clarity => self.clarity,
            Criterion::Structure => self.structure,
        }
    }

    /// Iterate `(criterion, score)` pairs in feedback order.
    pub fn iter(&self) -> impl Iterator<Item = (Criterion, f64)> + '_ {
        Criterion::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// Clamp a score into `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Where the content-accuracy similarity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilaritySource {
    /// Cosine similarity over provider embeddings.
    Embedding,
    /// Jaccard token overlap after a per-call embedding failure.
    Lexical,
    /// Scoring was bypassed (empty input).
    None,
}

/// The outcome of grading one student answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    /// Integer grade in `0..=5`.
    pub grade: u8,
    /// Human-readable feedback.
    pub feedback: String,
    /// Criterion breakdown; absent in single-score mode and for empty input.
    #[serde(default)]
    pub scores: Option<CriterionScores>,
    /// Which similarity path produced the content score.
    pub similarity_source: SimilaritySource,
}

/// Which embedding provider variant is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Real,
    Dummy,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Real => write!(f, "real"),
            ProviderKind::Dummy => write!(f, "dummy"),
        }
    }
}

/// An embedding-provider initialization strategy, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStrategy {
    /// Network and cache enabled.
    Primary,
    /// Previously cached local resources only.
    CacheOnly,
    /// Network with certificate verification disabled.
    NoSslVerify,
    /// Deterministic offline TF-IDF provider.
    Dummy,
}

impl fmt::Display for InitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitStrategy::Primary => write!(f, "primary"),
            InitStrategy::CacheOnly => write!(f, "cache_only"),
            InitStrategy::NoSslVerify => write!(f, "no_ssl_verify"),
            InitStrategy::Dummy => write!(f, "dummy"),
        }
    }
}

/// Session-wide record of which provider is active and how it was reached.
///
/// Set once at initialization and owned by the grading service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelState {
    pub kind: ProviderKind,
    pub model_name: String,
    pub strategy: InitStrategy,
    pub fallback_used: bool,
}

impl ModelState {
    pub fn is_dummy(&self) -> bool {
        self.kind == ProviderKind::Dummy
    }
}

/// One student's submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAnswer {
    /// Student identifier, unique within an answer set.
    pub student: String,
    /// The free-text answer.
    pub text: String,
}

/// A reference answer together with the student answers to grade against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The authoritative answer.
    pub reference: String,
    #[serde(default)]
    pub assignment_type: AssignmentType,
    /// Label from the file that named no known type. Such sets are graded
    /// as short answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unrecognized_assignment_type: Option<String>,
    #[serde(default)]
    pub answers: Vec<StudentAnswer>,
}
