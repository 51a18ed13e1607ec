pub mod export;
pub mod prompt;
pub mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use export::{process_export_command, ExportCommand};
use prompt::{process_prompt_command, PromptCommand};
use report::{process_records_command, process_totals_command, TotalsCommand};
use tracing::level_filters::LevelFilter;

use crate::utils::{
    dir::create_application_default_path,
    logging::{enable_logging, CLI_PREFIX},
};

#[derive(Parser, Debug)]
#[command(name = "Mierukun", version, long_about = None)]
#[command(about = "Classroom observation recorder", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory used for logs. By default $XDG_STATE_HOME/mierukun or $HOME/.local/state/mierukun"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Display time spent in every category of a lesson transcript")]
    Totals {
        #[command(flatten)]
        command: TotalsCommand,
    },
    #[command(about = "Display closed intervals reconstructed from a lesson transcript")]
    Records {
        #[arg(long, short, help = "Transcript file, one JSON event per line")]
        input: PathBuf,
    },
    #[command(about = "Export a lesson transcript as character separated text")]
    Export {
        #[command(flatten)]
        command: ExportCommand,
    },
    #[command(about = "Print the feedback prompt filled with lesson details")]
    Prompt {
        #[command(flatten)]
        command: PromptCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let dir = args.dir.map_or_else(create_application_default_path, Ok)?;
    enable_logging(CLI_PREFIX, &dir, logging_level, args.log)?;

    match args.commands {
        Commands::Totals { command } => process_totals_command(command).await,
        Commands::Records { input } => process_records_command(&input).await,
        Commands::Export { command } => process_export_command(command).await,
        Commands::Prompt { command } => process_prompt_command(command),
    }
}
