use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use crate::{evaluate::EvaluateArgs, replay::ReplayArgs};

mod evaluate;
mod file_utils;
mod parsers;
mod replay;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints the penalty of every route of a tour
    #[command(visible_alias = "e")]
    Evaluate {
        #[command(flatten)]
        args: EvaluateArgs,
    },
    /// Replays random moves through a penalty evaluator
    #[command(visible_alias = "r")]
    Replay {
        #[command(flatten)]
        args: ReplayArgs,
    },
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Some(Commands::Evaluate { args }) => evaluate::run(args)?,
        Some(Commands::Replay { args }) => replay::run(args)?,
        None => {}
    }

    Ok(())
}
