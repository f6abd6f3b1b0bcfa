//! TOML answer-set parser.
//!
//! Loads answer sets from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{AnswerSet, AssignmentType, StudentAnswer};

/// Intermediate TOML structure for parsing answer-set files.
#[derive(Debug, Deserialize)]
struct TomlAnswerFile {
    assignment: TomlAssignmentHeader,
    #[serde(default)]
    answers: Vec<TomlAnswer>,
}

#[derive(Debug, Deserialize)]
struct TomlAssignmentHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    reference: String,
    #[serde(default)]
    assignment_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlAnswer {
    student: String,
    #[serde(default)]
    text: String,
}

/// Parse a single answer set from a TOML file.
pub fn parse_answer_set(path: &Path) -> Result<AnswerSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer set: {}", path.display()))?;
    parse_answer_set_str(&content)
        .with_context(|| format!("failed to parse answer set: {}", path.display()))
}

/// Parse an answer set from a TOML string.
pub fn parse_answer_set_str(content: &str) -> Result<AnswerSet> {
    let file: TomlAnswerFile = toml::from_str(content).context("invalid TOML")?;

    let (assignment_type, unrecognized_assignment_type) =
        match file.assignment.assignment_type {
            Some(label) => match label.parse::<AssignmentType>() {
                Ok(t) => (t, None),
                Err(_) => (AssignmentType::default(), Some(label)),
            },
            None => (AssignmentType::default(), None),
        };

    Ok(AnswerSet {
        id: file.assignment.id,
        name: file.assignment.name,
        description: file.assignment.description,
        reference: file.assignment.reference,
        assignment_type,
        unrecognized_assignment_type,
        answers: file
            .answers
            .into_iter()
            .map(|a| StudentAnswer {
                student: a.student,
                text: a.text,
            })
            .collect(),
    })
}

/// Load every `.toml` answer set in a directory, sorted by file name.
pub fn load_answer_directory(dir: &Path) -> Result<Vec<AnswerSet>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    paths.iter().map(|p| parse_answer_set(p)).collect()
}

/// A non-fatal problem found in an answer set.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Student the warning refers to, if any.
    pub student: Option<String>,
    pub message: String,
}

/// Check an answer set for problems that would make grading meaningless.
pub fn validate_answer_set(set: &AnswerSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if set.reference.trim().is_empty() {
        warnings.push(ValidationWarning {
            student: None,
            message: "reference answer is empty; every answer will receive grade 0".into(),
        });
    }
    if let Some(label) = &set.unrecognized_assignment_type {
        warnings.push(ValidationWarning {
            student: None,
            message: format!(
                "unknown assignment type '{label}', graded as {}",
                AssignmentType::default()
            ),
        });
    }
    if set.answers.is_empty() {
        warnings.push(ValidationWarning {
            student: None,
            message: "no student answers".into(),
        });
    }

    let mut seen = HashSet::new();
    for answer in &set.answers {
        if !seen.insert(answer.student.as_str()) {
            warnings.push(ValidationWarning {
                student: Some(answer.student.clone()),
                message: "duplicate student id".into(),
            });
        }
        if answer.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                student: Some(answer.student.clone()),
                message: "answer is empty".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[assignment]
id = "astro-1"
name = "Orbits"
reference = "The Earth orbits around the Sun."
assignment_type = "short_answer"

[[answers]]
student = "ada"
text = "The Earth revolves around the Sun."

[[answers]]
student = "bob"
text = "The Sun orbits the Earth."
"#;

    #[test]
    fn parse_sample() {
        let set = parse_answer_set_str(SAMPLE).unwrap();
        assert_eq!(set.id, "astro-1");
        assert_eq!(set.assignment_type, AssignmentType::ShortAnswer);
        assert_eq!(set.answers.len(), 2);
        assert_eq!(set.answers[1].student, "bob");
        assert!(validate_answer_set(&set).is_empty());
    }

    #[test]
    fn missing_assignment_type_defaults() {
        let set = parse_answer_set_str(
            "[assignment]\nid = \"x\"\nname = \"X\"\nreference = \"r\"\n",
        )
        .unwrap();
        assert_eq!(set.assignment_type, AssignmentType::ShortAnswer);
        assert!(set.answers.is_empty());
    }

    #[test]
    fn unknown_assignment_type_is_a_warning() {
        let set = parse_answer_set_str(
            "[assignment]\nid = \"x\"\nname = \"X\"\nreference = \"r\"\nassignment_type = \"poem\"\n",
        )
        .unwrap();
        assert_eq!(set.assignment_type, AssignmentType::ShortAnswer);
        assert_eq!(set.unrecognized_assignment_type.as_deref(), Some("poem"));

        let warnings = validate_answer_set(&set);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("unknown assignment type 'poem'")));
    }

    #[test]
    fn validation_warnings() {
        let set = parse_answer_set_str(
            r#"
[assignment]
id = "x"
name = "X"
reference = "  "

[[answers]]
student = "ada"
text = ""

[[answers]]
student = "ada"
text = "something"
"#,
        )
        .unwrap();
        let warnings = validate_answer_set(&set);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("reference answer is empty")));
        assert!(messages.contains(&"answer is empty"));
        assert!(messages.contains(&"duplicate student id"));
    }

    #[test]
    fn load_directory_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.toml"), SAMPLE.replace("astro-1", "b")).unwrap();
        std::fs::write(dir.path().join("a.toml"), SAMPLE.replace("astro-1", "a")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let sets = load_answer_directory(dir.path()).unwrap();
        let ids: Vec<&str> = sets.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = parse_answer_set(Path::new("definitely/missing.toml")).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }
}
