use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ScreenshotError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Browser launch failed: {0}")]
    BrowserLaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Navigation timed out after {0:?}")]
    NavigationTimeout(Duration),

    #[error("Screenshot capture failed: {0}")]
    CaptureFailed(String),

    #[error("All capture slots busy after waiting {0:?}")]
    ServiceBusy(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScreenshotError {
    /// True for errors caused by the caller's input; these map to a 4xx
    /// response and are never worth retrying.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ScreenshotError::InvalidUrl(_) | ScreenshotError::InvalidDimensions { .. }
        )
    }

    /// True when the failure is saturation rather than a broken request or
    /// render; callers may retry later with backoff.
    pub fn is_busy(&self) -> bool {
        matches!(self, ScreenshotError::ServiceBusy(_))
    }
}
