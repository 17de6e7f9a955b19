pub mod build;
pub mod check;
pub mod completions;

use clap::{Parser, Subcommand};

/// marq - Markup document compiler
#[derive(Parser, Debug)]
#[command(name = "marq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render documents to HTML
    Build(build::BuildArgs),

    /// Parse documents and report problems without writing output
    Check(check::CheckArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
