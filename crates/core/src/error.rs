use crate::types::PixelFormat;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("Adapter is not initialized")]
    NotInitialized,
    #[error("Host rejected pixel format {0:?}")]
    FormatRejected(PixelFormat),
    #[error("Frame of {width}x{height} is too large")]
    FrameTooLarge { width: u32, height: u32 },
    #[error("No active session")]
    NoSession,
    #[error("Buffer format {found:?} does not match negotiated format {expected:?}")]
    FormatMismatch {
        expected: PixelFormat,
        found: PixelFormat,
    },
}
