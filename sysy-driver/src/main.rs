//! SysY Type Engine Inspector
//!
//! Loads a JSON type description, builds every type through the type engine
//! and reports declarators, sizes and relation checks.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use sysy_types::Description;

#[derive(Parser)]
#[command(name = "sysy-types")]
#[command(about = "Inspect SysY types and their compatibility")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the declarator and size of every declared type
    Print {
        /// Type description file (JSON)
        input: PathBuf,
    },

    /// Evaluate the relation checks of a description file
    Check {
        /// Type description file (JSON)
        input: PathBuf,

        /// Exit with status 1 if any check fails
        #[arg(long)]
        strict: bool,
    },

    /// Re-emit the built types as JSON
    Dump {
        /// Type description file (JSON)
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Print { input } => {
            let desc = load(&input)?;
            print!("{}", commands::print_types(&desc)?);
        }
        Commands::Check { input, strict } => {
            let desc = load(&input)?;
            let (report, failed) = commands::check_types(&desc)?;
            print!("{}", report);
            if strict && failed {
                return Err("one or more checks failed".into());
            }
        }
        Commands::Dump { input } => {
            let desc = load(&input)?;
            println!("{}", commands::dump_types(&desc)?);
        }
    }
    Ok(())
}

fn load(path: &std::path::Path) -> Result<Description, sysy_types::TypeError> {
    log::info!("Loading type description from {}", path.display());
    Description::from_path(path)
}
