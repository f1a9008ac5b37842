//! papergen CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use papergen_core::model::ExamType;

mod commands;

#[derive(Parser)]
#[command(name = "papergen", version, about = "Exam paper generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and a demo question bank
    Init,

    /// Validate a blueprint file (.json or .toml)
    Validate {
        /// Path to the blueprint document
        #[arg(long)]
        blueprint: PathBuf,
    },

    /// Generate a paper for a course
    Generate {
        /// Course id or code
        #[arg(long)]
        course: String,

        /// mid_term or final (default from config)
        #[arg(long)]
        exam_type: Option<ExamType>,

        /// Blueprint id (default blueprint when omitted)
        #[arg(long)]
        blueprint: Option<Uuid>,

        /// Seed for question selection
        #[arg(long)]
        seed: Option<u64>,

        /// Also write the paper to this JSON file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Report how many unused questions each slot and group has
    Check {
        /// Course id or code
        #[arg(long)]
        course: String,

        /// Blueprint id (default blueprint when omitted)
        #[arg(long)]
        blueprint: Option<Uuid>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List papers generated for a course
    Papers {
        /// Course id or code
        #[arg(long)]
        course: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print a stored paper
    Show {
        /// Paper id
        #[arg(long)]
        paper: Uuid,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Delete a paper, returning its questions to the pool
    Delete {
        /// Paper id
        #[arg(long)]
        paper: Uuid,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Manage blueprints
    Blueprints {
        #[command(subcommand)]
        action: commands::blueprints::Action,

        /// Config file path
        #[arg(long, global = true)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("papergen=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { blueprint } => commands::validate::execute(blueprint),
        Commands::Generate {
            course,
            exam_type,
            blueprint,
            seed,
            output,
            config,
        } => commands::generate::execute(course, exam_type, blueprint, seed, output, config).await,
        Commands::Check {
            course,
            blueprint,
            config,
        } => commands::check::execute(course, blueprint, config).await,
        Commands::Papers { course, config } => commands::papers::list(course, config),
        Commands::Show { paper, config } => commands::papers::show(paper, config),
        Commands::Delete { paper, config } => commands::papers::delete(paper, config),
        Commands::Blueprints { action, config } => commands::blueprints::execute(action, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
