use clap::Parser;
use miette::Result;

use marq::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => marq::cli::build::run(args)?,
        Commands::Check(args) => marq::cli::check::run(args)?,
        Commands::Completions(args) => marq::cli::completions::run(args)?,
    }

    Ok(())
}
