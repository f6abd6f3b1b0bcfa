//! gradekit CLI, the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gradekit",
    version,
    about = "Automated short-answer grading assistant"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one student answer against a reference answer
    Grade {
        /// The student's answer
        #[arg(long)]
        student: String,

        /// The reference answer
        #[arg(long)]
        reference: String,

        /// Grading mode: criteria, similarity
        #[arg(long, default_value = "criteria")]
        mode: String,

        /// Assignment type label (short_answer, essay, definition, problem_solving)
        #[arg(long, default_value = "short_answer")]
        assignment_type: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Never contact the embedding endpoint
        #[arg(long)]
        offline: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade every answer in an answer-set file
    Batch {
        /// Path to the .toml answer set
        #[arg(long)]
        answers: PathBuf,

        /// Grading mode: criteria, similarity
        #[arg(long, default_value = "criteria")]
        mode: String,

        /// Save the JSON report to this path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Never contact the embedding endpoint
        #[arg(long)]
        offline: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate answer-set TOML files
    Validate {
        /// Path to answer-set file or directory
        #[arg(long)]
        answers: PathBuf,
    },

    /// Initialize the embedding provider and show which one is active
    Info {
        /// Never contact the embedding endpoint
        #[arg(long)]
        offline: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example answer set
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gradekit=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            student,
            reference,
            mode,
            assignment_type,
            json,
            offline,
            config,
        } => {
            commands::grade::execute(
                student,
                reference,
                mode,
                assignment_type,
                json,
                offline,
                config,
            )
            .await
        }
        Commands::Batch {
            answers,
            mode,
            output,
            offline,
            config,
        } => commands::batch::execute(answers, mode, output, offline, config).await,
        Commands::Validate { answers } => commands::validate::execute(answers),
        Commands::Info { offline, config } => commands::info::execute(offline, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
