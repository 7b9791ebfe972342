//! jobscribe Command-Line Interface
//!
//! Renders and writes HTCondor submit descriptions, DAGMan input files and
//! SLURM batch scripts.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{render, sbatch, version, write};

/// jobscribe - job-submission files for HTCondor/DAGMan and SLURM
#[derive(Parser)]
#[command(name = "jobscribe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the DAGMan input file described by a workflow manifest
    Render {
        /// Workflow manifest (YAML or JSON)
        #[arg(short, long)]
        input: String,

        /// Also print every inline submit description
        #[arg(long)]
        submit: bool,
    },

    /// Write a workflow's DAGMan input file and its submit descriptions
    Write {
        /// Workflow manifest (YAML or JSON)
        #[arg(short, long)]
        input: String,

        /// Directory to write into (defaults to the paths in the manifest)
        #[arg(short, long)]
        output_dir: Option<String>,
    },

    /// Write a single-task SLURM batch script
    Sbatch {
        /// Batch script to write
        #[arg(short, long)]
        output: String,

        /// Executable to run
        #[arg(short, long)]
        executable: String,

        /// Arguments passed to the executable
        #[arg(short, long, default_value = "", allow_hyphen_values = true)]
        arguments: String,

        /// sbatch option as KEY=VALUE (repeatable)
        #[arg(long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,

        /// Copy the executable to the node before running it
        #[arg(long)]
        transfer_executable: bool,

        /// File copied to the node before execution (repeatable)
        #[arg(long = "input-file")]
        input_files: Vec<String>,

        /// File moved back after execution (repeatable)
        #[arg(long = "output-file")]
        output_files: Vec<String>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Render { input, submit } => render::execute(&input, submit),

        Commands::Write { input, output_dir } => write::execute(&input, output_dir.as_deref()),

        Commands::Sbatch {
            output,
            executable,
            arguments,
            options,
            transfer_executable,
            input_files,
            output_files,
        } => sbatch::execute(&sbatch::SbatchArgs {
            output,
            executable,
            arguments,
            options,
            transfer_executable,
            input_files,
            output_files,
        }),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
