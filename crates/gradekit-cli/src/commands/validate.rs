//! The `gradekit validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(answers_path: PathBuf) -> Result<()> {
    let sets = if answers_path.is_dir() {
        gradekit_core::parser::load_answer_directory(&answers_path)?
    } else {
        vec![gradekit_core::parser::parse_answer_set(&answers_path)?]
    };

    let mut total_warnings = 0;

    for set in &sets {
        println!(
            "Answer set: {} ({} answers, {})",
            set.name,
            set.answers.len(),
            set.assignment_type
        );

        let warnings = gradekit_core::parser::validate_answer_set(set);
        for w in &warnings {
            let prefix = w
                .student
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All answer sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
