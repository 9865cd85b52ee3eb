use std::path::PathBuf;

/// Errors that can occur while setting up a transport.
///
/// Sending a frame never fails from the caller's point of view; these errors
/// only surface while opening the underlying device.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the output device or file.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TransportError>;
