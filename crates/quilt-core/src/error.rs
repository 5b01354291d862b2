//! Error types for the quilt-core crate.

use core::fmt;

/// Errors from parsing the textual device-identifier wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceIdError {
    /// The encoded text is not exactly the fixed wire length.
    InvalidLength { expected: usize, actual: usize },
    /// A hex group at the given byte index is malformed.
    InvalidGroup { index: usize },
    /// A raw byte buffer is not exactly 16 bytes.
    InvalidByteLength { actual: usize },
}

impl fmt::Display for DeviceIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceIdError::InvalidLength { expected, actual } => {
                write!(
                    f,
                    "invalid device id length: expected {expected} characters, got {actual}"
                )
            }
            DeviceIdError::InvalidGroup { index } => {
                write!(f, "malformed hex group at byte {index}")
            }
            DeviceIdError::InvalidByteLength { actual } => {
                write!(f, "invalid device id: expected 16 bytes, got {actual}")
            }
        }
    }
}

impl std::error::Error for DeviceIdError {}
