//! The `gradekit info` command.

use std::path::PathBuf;

use anyhow::Result;

pub async fn execute(offline: bool, config_path: Option<PathBuf>) -> Result<()> {
    let grader = super::build_grader(config_path.as_deref(), offline).await?;
    let info = grader.model_info();

    println!("Provider:       {}", info.provider);
    println!("Model type:     {}", info.kind);
    println!("Model name:     {}", info.model_name);
    println!("Strategy:       {}", info.strategy);
    println!("Fallback used:  {}", info.fallback_used);
    let types: Vec<String> = info.assignment_types.iter().map(|t| t.to_string()).collect();
    println!("Assignment types: {}", types.join(", "));

    if grader.state().is_dummy() {
        println!("\nWarning: using the offline dummy model. Accuracy may be reduced.");
    }

    Ok(())
}
