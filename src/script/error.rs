use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::collaborators::BoxError;

/// Everything that can abort a script run. Nothing is retried; the first
/// error stops the run and is handed back to the caller.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {}: {source}", .path.display())]
    SourceIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("script {} is not valid {encoding}", .path.display())]
    SourceDecode {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("Could not find file {}", .0.display())]
    IncludeNotFound(PathBuf),

    #[error("failed to read included script {}: {source}", .path.display())]
    IncludeIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("included script {} is not valid {encoding}", .path.display())]
    IncludeDecode {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("include of {} exceeds the maximum include depth of {limit}", .path.display())]
    IncludeDepthExceeded { path: PathBuf, limit: usize },

    #[error("unknown character encoding: {0}")]
    UnknownEncoding(String),

    #[error(transparent)]
    Executor(BoxError),

    #[error(transparent)]
    Prompter(BoxError),
}

impl ScriptError {
    /// Re-tag a top-level source failure as a failure of an included file.
    pub(crate) fn into_include_error(self) -> Self {
        match self {
            ScriptError::SourceIo { path, source } => ScriptError::IncludeIo { path, source },
            ScriptError::SourceDecode { path, encoding } => {
                ScriptError::IncludeDecode { path, encoding }
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScriptError>;
