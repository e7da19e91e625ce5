//! Errors raised by the build invocation layer

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the tool itself, as opposed to content issues
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Generator binary not found: {program}")]
    GeneratorNotFound { program: String },

    #[error("Failed to start generator {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for generator: {0}")]
    Wait(#[source] std::io::Error),

    #[error("Refusing to delete {path:?}: {reason}")]
    UnsafeCleanTarget { path: PathBuf, reason: String },

    #[error("Failed to delete {path:?}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path:?}: {message}")]
    Config { path: PathBuf, message: String },
}

impl BuildError {
    /// Exit code reported to the invoking shell
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::GeneratorNotFound { .. } => 127,
            _ => 1,
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
