//! Error types for Framecast.

use thiserror::Error;

/// Main error type for the render path.
///
/// Every fatal condition is surfaced synchronously to the host within the
/// render call that hit it; nothing is retried here. The one intentional
/// non-error is a busy frame mutex, which skips the broadcast copy and is
/// reported through the publish outcome instead.
#[derive(Error, Debug)]
pub enum FramecastError {
    #[error("bad handle: {0}")]
    BadHandle(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("format mismatch: {0}")]
    FormatMismatch(String),

    #[error("device open failed: {0}")]
    DeviceOpenFailed(String),

    #[error("sender check failed: {0}")]
    SenderCheckFailed(String),

    #[error("transfer failed: {0}")]
    TransferFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FramecastError {
    /// Whether the host should treat this as a dropped frame rather than a
    /// failed render. Only a device-context open failure qualifies; it can
    /// be transient and the next render retries naturally.
    pub fn is_frame_drop(&self) -> bool {
        matches!(self, Self::DeviceOpenFailed(_))
    }
}

/// Result type alias for Framecast operations.
pub type Result<T> = std::result::Result<T, FramecastError>;
