pub mod commands;

use clap::{Parser, Subcommand};
use nebo_core::config::ProcessEnv;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "nebo",
    about = "Nebo operator CLI",
    long_about = "Check slash-command readiness and generate meeting links without going through Slack.",
    after_help = "Examples:\n  nebo doctor --json\n  nebo meet weekly sync"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Validate process config and the per-request slash-command settings")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print a meeting link; random words when no name is given")]
    Meet {
        #[arg(help = "Meeting name, spaces become dashes")]
        name: Vec<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Doctor { json } => commands::doctor::run(json, &ProcessEnv),
        Command::Meet { name } => commands::meet::run(&name),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
