//! The `gradekit grade` command.

use std::path::PathBuf;

use anyhow::Result;

use gradekit_core::model::{AssignmentType, GradeResult};
use gradekit_core::GradingMode;

pub async fn execute(
    student: String,
    reference: String,
    mode: String,
    assignment_type: String,
    json: bool,
    offline: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mode: GradingMode = mode.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let assignment_type: AssignmentType = assignment_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let grader = super::build_grader(config_path.as_deref(), offline).await?;

    let result = match mode {
        GradingMode::Criteria => {
            grader
                .grade_with_type(&student, &reference, assignment_type)
                .await
        }
        GradingMode::Similarity => grader.grade_similarity(&student, &reference).await,
    };
    grader.flush().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(())
}

fn print_result(result: &GradeResult) {
    println!("Grade: {}/5", result.grade);
    println!("Feedback:");
    for line in result.feedback.lines() {
        println!("  {line}");
    }
    if let Some(scores) = &result.scores {
        println!("Scores:");
        for (criterion, score) in scores.iter() {
            let name = criterion.to_string();
            println!("  {name:<17} {score:.2}");
        }
    }
}
