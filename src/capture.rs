//! Capture engine driving one headless-browser session
//!
//! Each capture run launches a fresh, isolated Chrome session, navigates,
//! takes a full-page screenshot, and tears the session down. Nothing is
//! reused across requests, so cookies and local storage cannot leak
//! between callers.

use crate::{create_browser_config, Config, ScreenshotError};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use futures::StreamExt;
use tracing::{debug, warn};

/// Renders a page to image bytes.
///
/// The orchestrator and HTTP layer depend on this seam rather than on
/// Chrome directly, so they can be exercised with a stub engine in tests.
#[async_trait]
pub trait Capture: Send + Sync {
    async fn capture(&self, url: &str, width: u32, height: u32)
        -> Result<Vec<u8>, ScreenshotError>;
}

/// Chrome-backed capture engine.
pub struct ChromeCaptureEngine {
    config: Config,
}

impl ChromeCaptureEngine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    async fn navigate_and_capture(
        &self,
        browser: &Browser,
        url: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ScreenshotError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScreenshotError::NavigationFailed(e.to_string()))?;

        // Viewport must be in place before navigation so responsive
        // layouts render at the requested size.
        let emulation = SetDeviceMetricsOverrideParams::builder()
            .width(width)
            .height(height)
            .device_scale_factor(self.config.viewport.device_scale_factor)
            .mobile(self.config.viewport.mobile)
            .build()
            .map_err(ScreenshotError::Internal)?;

        page.execute(emulation)
            .await
            .map_err(|e| ScreenshotError::NavigationFailed(e.to_string()))?;

        page.goto(url)
            .await
            .map_err(|e| ScreenshotError::NavigationFailed(e.to_string()))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| ScreenshotError::NavigationFailed(e.to_string()))?;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .from_surface(true)
            .capture_beyond_viewport(true)
            .build();

        let data = page
            .screenshot(params)
            .await
            .map_err(|e| ScreenshotError::CaptureFailed(e.to_string()))?;

        debug!("Captured {} bytes for {}", data.len(), url);
        Ok(data)
    }
}

#[async_trait]
impl Capture for ChromeCaptureEngine {
    async fn capture(
        &self,
        url: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ScreenshotError> {
        let session_id = uuid::Uuid::new_v4().to_string();
        let browser_config = create_browser_config(&self.config, &session_id)
            .map_err(ScreenshotError::BrowserLaunchFailed)?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScreenshotError::BrowserLaunchFailed(e.to_string()))?;

        // Drive the CDP event stream until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("CDP handler error: {}", e);
                    break;
                }
            }
        });

        let result = tokio::time::timeout(
            self.config.navigation_timeout,
            self.navigate_and_capture(&browser, url, width, height),
        )
        .await;

        // Teardown happens whether the race was won, lost, or errored; a
        // timed-out render must not leave a Chrome process behind.
        if let Err(e) = browser.close().await {
            warn!("Browser close failed for session {}: {}", session_id, e);
        }
        handler_task.abort();

        match result {
            Ok(inner) => inner,
            Err(_) => Err(ScreenshotError::NavigationTimeout(
                self.config.navigation_timeout,
            )),
        }
    }
}
