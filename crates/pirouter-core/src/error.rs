//! Error types for pirouter-core.

use thiserror::Error;

/// Probe failure taxonomy.
///
/// Every external probe converts its failures into one of these variants at
/// its own boundary. Callers map them to documented default values; probes
/// never panic past this type.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// External tool exceeded its hard timeout.
    #[error("probe timed out after {timeout_secs}s: {tool}")]
    Timeout { tool: String, timeout_secs: u64 },

    /// Tool binary or data source is missing on this system.
    #[error("probe source unavailable: {0}")]
    Unavailable(String),

    /// Output did not have the expected shape.
    #[error("probe parse failure: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Timeout constructor that keeps call sites terse.
    pub fn timeout(tool: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout {
            tool: tool.into(),
            timeout_secs,
        }
    }
}

/// Result type alias for probe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;
