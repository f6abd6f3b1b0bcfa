//! Subcommand implementations.

use std::path::Path;

use anyhow::Result;

use gradekit_core::Grader;
use gradekit_providers::config::load_config_from;
use gradekit_providers::initialize_grader;

pub mod batch;
pub mod grade;
pub mod info;
pub mod init;
pub mod validate;

/// Load configuration and run the provider cascade once for this process.
pub async fn build_grader(config_path: Option<&Path>, offline: bool) -> Result<Grader> {
    let mut config = load_config_from(config_path)?;
    if offline {
        config.model.offline_mode = true;
    }
    tracing::debug!(
        model = %config.model.name,
        endpoint = %config.model.endpoint,
        offline = config.model.offline_mode,
        "initializing embedding provider"
    );
    let grader = initialize_grader(&config).await?;
    Ok(grader)
}
