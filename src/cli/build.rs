//! Build command implementation.
//!
//! Renders markup documents to HTML fragments (or a JSON dump of the
//! parsed tree plus diagnostics). Directory arguments are scanned for
//! `.md` files; `--watch` keeps rebuilding as inputs change.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use clap::{Args, ValueEnum};
use notify::{RecursiveMode, Watcher};
use walkdir::WalkDir;

use crate::error::{MarqError, Result};
use crate::fs::DirFs;
use crate::output::Printer;
use crate::parser::parse_file;
use crate::render;

/// Render documents to HTML
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Input files or directories to process
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output directory
    #[arg(long, short, default_value = "dist")]
    pub output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "html")]
    pub emit: Emit,

    /// Rebuild whenever an input changes
    #[arg(long)]
    pub watch: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emit {
    /// An HTML fragment per document
    Html,
    /// The document tree and diagnostics as JSON
    Json,
}

pub fn run(args: BuildArgs) -> Result<()> {
    let printer = Printer::new();
    build_once(&args, &printer)?;

    if args.watch {
        watch(&args, &printer)?;
    }
    Ok(())
}

fn build_once(args: &BuildArgs, printer: &Printer) -> Result<()> {
    let files = collect_inputs(&args.paths)?;
    if files.is_empty() {
        return Err(MarqError::Build {
            message: "No input documents found".to_string(),
            help: Some("marq builds .md files; pass files or directories containing them".to_string()),
        });
    }

    if !args.output.exists() {
        fs::create_dir_all(&args.output).map_err(|e| MarqError::Io {
            path: args.output.clone(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }

    let mut problems = 0;
    for file in &files {
        problems += build_file(file, args, printer)?;
    }

    printer.success(
        "Finished",
        &format!("{} document(s), {} problem(s)", files.len(), problems),
    );
    Ok(())
}

/// Parse and render one document. Returns the number of problems found.
fn build_file(path: &Path, args: &BuildArgs, printer: &Printer) -> Result<usize> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MarqError::Build {
            message: format!("Invalid file name: {}", path.display()),
            help: None,
        })?;

    printer.status("Parsing", name);
    let root = DirFs::new(dir);
    let (document, errors) = parse_file(&root, name)?;
    for err in &errors {
        printer.warning("Problem", &err.to_string());
    }

    let (content, extension) = match args.emit {
        Emit::Html => (render::render(&document), "html"),
        Emit::Json => {
            let dump = serde_json::json!({
                "document": document,
                "errors": errors,
            });
            let text = serde_json::to_string_pretty(&dump).map_err(|e| MarqError::Build {
                message: format!("Cannot serialize {}: {}", name, e),
                help: None,
            })?;
            (text, "json")
        }
    };

    let out_path = args.output.join(Path::new(name).with_extension(extension));
    fs::write(&out_path, content).map_err(|e| MarqError::Io {
        path: out_path.clone(),
        message: format!("Failed to write output: {}", e),
    })?;
    printer.status("Writing", &out_path.display().to_string());

    Ok(errors.len())
}

/// Expand files and directories into the list of documents to build.
pub(crate) fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|e| MarqError::Build {
                    message: format!("Cannot scan {}: {}", path.display(), e),
                    help: None,
                })?;
                let is_md = entry.path().extension().is_some_and(|ext| ext == "md");
                if entry.file_type().is_file() && is_md {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Block on file-system events and rebuild after each burst of changes.
fn watch(args: &BuildArgs, printer: &Printer) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).map_err(|e| MarqError::Build {
        message: format!("Cannot start watcher: {}", e),
        help: None,
    })?;
    for path in &args.paths {
        let mode = if path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(path, mode).map_err(|e| MarqError::Build {
            message: format!("Cannot watch {}: {}", path.display(), e),
            help: None,
        })?;
    }
    printer.info("Watching", "inputs for changes (ctrl-c to stop)");

    loop {
        match rx.recv() {
            Ok(Ok(event)) if is_change(&event) => {
                // editors emit bursts of events; settle before rebuilding
                while rx.recv_timeout(Duration::from_millis(100)).is_ok() {}
                if let Err(err) = build_once(args, printer) {
                    printer.error("Error", &err.to_string());
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }
    Ok(())
}

fn is_change(event: &notify::Event) -> bool {
    use notify::EventKind;
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
