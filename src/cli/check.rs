//! Check command implementation.
//!
//! Parses documents and reports problems without writing any output.
//! Diagnostics go to stdout in `path:line: message` form; the exit
//! status reflects whether any were found.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::error::{MarqError, Result};
use crate::fs::DirFs;
use crate::output::Printer;
use crate::parser::parse_file;

use super::build::collect_inputs;

/// Parse documents and report problems without writing output
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Input files or directories to check
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let printer = Printer::new();
    let files = collect_inputs(&args.paths)?;
    if files.is_empty() {
        return Err(MarqError::Build {
            message: "No input documents found".to_string(),
            help: Some("marq checks .md files; pass files or directories containing them".to_string()),
        });
    }

    let mut problems = 0;
    for file in &files {
        problems += check_file(file, &printer)?;
    }

    if problems > 0 {
        return Err(MarqError::Parse {
            message: format!("{} problem(s) in {} document(s)", problems, files.len()),
            help: None,
        });
    }
    printer.success("Checked", &format!("{} document(s)", files.len()));
    Ok(())
}

fn check_file(path: &Path, printer: &Printer) -> Result<usize> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MarqError::Build {
            message: format!("Invalid file name: {}", path.display()),
            help: None,
        })?;

    printer.status("Checking", name);
    let root = DirFs::new(dir);
    let (_, errors) = parse_file(&root, name)?;
    for err in &errors {
        println!("{}", err);
    }
    Ok(errors.len())
}
