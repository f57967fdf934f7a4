// Error taxonomy for loading, selecting and rendering scenarios
//
// None of these are fatal to a session: a failed load leaves the selector
// empty, a bad selection is a no-op, a failed render leaves the canvas blank.

use std::path::PathBuf;

/// Scenario file missing, unreadable or not a JSON array of scenarios
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read scenarios from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenarios: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
}

/// Selected index does not refer to a loaded scenario
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("scenario index {index} out of range ({len} loaded)")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("canvas width must be finite and positive, got {width}")]
    InvalidCanvas { width: f64 },

    #[error("failed to write diagram: {0}")]
    Format(#[from] std::fmt::Error),
}
