//! Error types for the facade layer.

/// Errors from configuration loading and facade setup.
#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
