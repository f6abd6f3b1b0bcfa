//! The `gradekit init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create gradekit.toml
    if std::path::Path::new("gradekit.toml").exists() {
        println!("gradekit.toml already exists, skipping.");
    } else {
        std::fs::write("gradekit.toml", SAMPLE_CONFIG)?;
        println!("Created gradekit.toml");
    }

    // Create example answer set
    std::fs::create_dir_all("answer-sets")?;
    let example_path = std::path::Path::new("answer-sets/example.toml");
    if example_path.exists() {
        println!("answer-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_ANSWER_SET)?;
        println!("Created answer-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point [model] endpoint in gradekit.toml at your embedding server");
    println!("  2. Run: gradekit validate --answers answer-sets/example.toml");
    println!("  3. Run: gradekit batch --answers answer-sets/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradekit configuration

[model]
name = "all-minilm"
endpoint = "http://localhost:11434"
offline_mode = false
local_files_only = false
fallback_to_dummy = true
timeout_secs = 30
# cache_dir = "${HOME}/.cache/gradekit/models"

[ssl]
verify_ssl = true
# ca_bundle = "/etc/ssl/certs/corporate-ca.pem"
"#;

const EXAMPLE_ANSWER_SET: &str = r#"[assignment]
id = "astronomy-orbits"
name = "Planetary Orbits"
description = "What orbits what in our solar system?"
assignment_type = "short_answer"
reference = "The Earth orbits around the Sun."

[[answers]]
student = "student-1"
text = "The Earth revolves around the Sun."

[[answers]]
student = "student-2"
text = "Earth goes around the Sun in space."

[[answers]]
student = "student-3"
text = "The Sun orbits the Earth."
"#;
