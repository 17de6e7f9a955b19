use miette::Diagnostic;
use thiserror::Error;

/// Main error type for marq operations
#[derive(Error, Diagnostic, Debug)]
pub enum MarqError {
    #[error("IO error: {0}")]
    #[diagnostic(code(marq::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(marq::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(marq::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Build error: {message}")]
    #[diagnostic(code(marq::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, MarqError>;
