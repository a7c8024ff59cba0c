//! Pixel format negotiation
//!
//! Runs once per load, before the buffer exists. The first rejection is
//! final for that load attempt; there is no fallback format.

use crate::config::Settings;
use crate::error::AdapterError;
use crate::host::Host;
use crate::logging::{log, LogCategory, LogLevel};
use crate::types::PixelFormat;

/// Declare the configured format to the host
pub fn negotiate<H: Host + ?Sized>(
    host: &mut H,
    settings: &Settings,
) -> Result<PixelFormat, AdapterError> {
    let format = settings.pixel_format;
    if !host.set_pixel_format(format) {
        log(LogCategory::Video, LogLevel::Error, || {
            format!("Host rejected pixel format {}", format.option_value())
        });
        return Err(AdapterError::FormatRejected(format));
    }

    log(LogCategory::Video, LogLevel::Info, || {
        format!("Negotiated pixel format {}", format.option_value())
    });
    Ok(format)
}
