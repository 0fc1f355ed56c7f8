use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod display;
#[cfg(target_os = "windows")]
mod hook;
mod shutdown;

const DEFAULT_PROCESS: &str = "NeedForSpeedHeat.exe";

#[derive(Parser)]
#[command(name = "hshift")]
#[command(about = "H-pattern gear shifter for NFS Heat")]
struct Args {
    /// Executable name of the game process.
    #[arg(short, long, default_value = DEFAULT_PROCESS)]
    process: String,

    /// Signature set JSON; defaults to the built-in set.
    #[arg(short, long)]
    signatures: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Locate the gear field addresses and print them.
    Scan,
    /// Force a gear once and exit.
    Shift {
        /// Target gear: r, n, or 1-8.
        gear: String,

        /// Known current gear address (skips the scan).
        #[arg(long)]
        current: Option<String>,

        /// Known last gear address (skips the scan).
        #[arg(long)]
        last: Option<String>,
    },
    /// Scan, then drive gears from the keyboard (default).
    Run {
        /// Key map JSON; defaults to the number row.
        #[arg(short, long)]
        keys: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("hshift=info".parse()?)
                .add_directive("hshift_core=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let signatures = args.signatures.as_deref();

    match args.command.unwrap_or(Command::Run { keys: None }) {
        Command::Scan => commands::scan::run(&args.process, signatures),
        Command::Shift {
            gear,
            current,
            last,
        } => commands::shift::run(
            &args.process,
            &gear,
            signatures,
            current.as_deref(),
            last.as_deref(),
        ),
        Command::Run { keys } => commands::run::run(&args.process, signatures, keys.as_deref()),
    }
}
