//! The `gradekit batch` command.

use std::path::PathBuf;

use anyhow::Result;

use gradekit_core::parser::{parse_answer_set, validate_answer_set};
use gradekit_core::report::BatchReport;
use gradekit_core::GradingMode;

pub async fn execute(
    answers_path: PathBuf,
    mode: String,
    output: Option<PathBuf>,
    offline: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mode: GradingMode = mode.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let set = parse_answer_set(&answers_path)?;

    for w in validate_answer_set(&set) {
        match &w.student {
            Some(student) => eprintln!("Warning: [{student}] {}", w.message),
            None => eprintln!("Warning: {}", w.message),
        }
    }

    let grader = super::build_grader(config_path.as_deref(), offline).await?;

    eprintln!(
        "gradekit v{}: grading {} answers for '{}' ({})",
        env!("CARGO_PKG_VERSION"),
        set.answers.len(),
        set.name,
        set.assignment_type
    );

    let texts: Vec<String> = set.answers.iter().map(|a| a.text.clone()).collect();
    let results = grader
        .grade_multiple_responses(&texts, &set.reference, mode)
        .await;

    let report = BatchReport::new(&set, grader.model_info(), mode, results);
    print_report(&report);

    if let Some(path) = output {
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_report(report: &BatchReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Student",
        "Grade",
        "Content",
        "Completeness",
        "Clarity",
        "Structure",
    ]);

    for entry in &report.results {
        let score_cells: Vec<Cell> = match &entry.result.scores {
            Some(scores) => scores
                .iter()
                .map(|(_, s)| Cell::new(format!("{s:.2}")))
                .collect(),
            None => (0..4).map(|_| Cell::new("-")).collect(),
        };
        let mut row = vec![
            Cell::new(&entry.student),
            Cell::new(format!("{}/5", entry.result.grade)),
        ];
        row.extend(score_cells);
        table.add_row(row);
    }

    println!("{table}");

    let summary = &report.summary;
    println!();
    println!("Average grade: {:.1}/5", summary.average_grade);
    if let (Some(high), Some(low)) = (summary.highest_grade, summary.lowest_grade) {
        println!("Highest grade: {high}/5");
        println!("Lowest grade:  {low}/5");
    }

    println!();
    for entry in &report.results {
        println!("[{}] {}/5", entry.student, entry.result.grade);
        for line in entry.result.feedback.lines() {
            println!("  {line}");
        }
    }
}
