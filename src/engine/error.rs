//! Job-level error taxonomy.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a job (or, for `EngineNotFound`, the whole process)
#[derive(Debug, Error)]
pub enum StereoError {
    #[error("FFmpeg not found! Install FFmpeg and add it to your PATH, or place {binary} next to this program (searched: {})", join_paths(searched))]
    EngineNotFound {
        binary: String,
        searched: Vec<PathBuf>,
    },

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("All processing configurations failed ({})", attempts.join("; "))]
    AllConfigurationsFailed { attempts: Vec<String> },

    #[error("Failed to write metadata sidecar {}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl StereoError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
