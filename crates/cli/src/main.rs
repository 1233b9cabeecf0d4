mod scaffold;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Scaffolding for strata migrations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new migration source file with a timestamp-derived version
    New {
        /// Migration name, e.g. "add users email"
        name: String,

        /// Directory the migration file is written to
        #[arg(long, default_value = "migrations")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::New { name, dir } => {
            let path = scaffold::create_migration(&dir, &name)?;
            println!("Created {}", path.display());
        }
    }

    Ok(())
}
