use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Settings ──
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("invalid trim mode {0:?}, expected literal or charset")]
    InvalidTrimMode(String),

    // ── Planning ──
    #[error("unrecognized timestamp {value:?}")]
    InvalidTimestamp { value: String },

    #[error("malformed mount directory line {line:?}")]
    MalformedMountLine { line: String },

    // ── State file ──
    #[error("failed to write volume list to {path}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}
