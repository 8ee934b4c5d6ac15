//! Configuration management with serde serialization/deserialization
//!
//! This module provides the configuration structures for the screenshot
//! server, including concurrency limits, timeouts, cache settings, and
//! Chrome launch arguments.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for the screenshot server
///
/// Controls the capture pipeline: how many browser sessions may run at
/// once, how long a page load may take, and how long rendered images stay
/// cached.
///
/// # Examples
///
/// ```rust
/// use screenshot_server::Config;
///
/// // Use default configuration
/// let config = Config::default();
///
/// // Create custom configuration
/// let config = Config {
///     max_concurrent_captures: 8,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Maximum number of browser sessions running at once (default: 4)
    ///
    /// Each capture launches its own headless Chrome process; this bound
    /// is what keeps the host from drowning in them.
    pub max_concurrent_captures: usize,

    /// How long a request may wait for a capture slot (default: 10 seconds)
    ///
    /// Requests still queued when this elapses fail with a busy error
    /// rather than piling up indefinitely.
    #[serde(with = "duration_secs")]
    pub queue_timeout: Duration,

    /// Hard timeout for navigate-and-capture (default: 30 seconds)
    ///
    /// Pages that have not reached a quiescent load state by then are
    /// abandoned and the browser session is torn down.
    #[serde(with = "duration_secs")]
    pub navigation_timeout: Duration,

    /// How long a rendered image stays valid in the cache (default: 1 hour)
    #[serde(with = "duration_secs")]
    pub cache_ttl: Duration,

    /// Interval between background sweeps of expired cache entries
    /// (default: 120 seconds)
    #[serde(with = "duration_secs")]
    pub cache_sweep_interval: Duration,

    /// Default viewport used when the request omits dimensions
    pub viewport: Viewport,

    /// Upper bound on requested viewport width/height (default: 4096)
    ///
    /// Oversized viewports make Chrome allocate absurd render surfaces;
    /// requests beyond this are rejected as client errors.
    pub max_dimension: u32,

    /// Path to Chrome/Chromium executable (default: auto-detect)
    pub chrome_path: Option<String>,

    /// Custom User-Agent string for page loads (default: Chrome default)
    pub user_agent: Option<String>,

    /// Include raw error detail in failure responses (default: false)
    ///
    /// Production-style deployments keep this off so internal diagnostics
    /// never leak to callers.
    pub dev_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_captures: 4,
            queue_timeout: Duration::from_secs(10),
            navigation_timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(3600),
            cache_sweep_interval: Duration::from_secs(120),
            viewport: Viewport::default(),
            max_dimension: 4096,
            chrome_path: None,
            user_agent: None,
            dev_mode: false,
        }
    }
}

/// Browser viewport configuration
///
/// Controls the window size Chrome lays the page out with. The captured
/// image covers the full scrollable page, so the viewport only affects
/// responsive layout, not output dimensions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Viewport {
    /// Viewport width in pixels (default: 1920)
    pub width: u32,

    /// Viewport height in pixels (default: 1080)
    pub height: u32,

    /// Device pixel ratio for high-DPI displays (default: 1.0)
    pub device_scale_factor: f64,

    /// Whether to emulate a mobile device (default: false)
    pub mobile: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            device_scale_factor: 1.0,
            mobile: false,
        }
    }
}

/// Generate Chrome command-line arguments for one capture session
///
/// Every capture gets a fresh browser process with its own user-data and
/// temp directories, so sessions never share cookies, local storage, or
/// singleton locks.
pub fn get_chrome_args(config: &Config, session_id: &str) -> Vec<String> {
    let unique_id = format!("{}-{}", std::process::id(), session_id);

    let mut args = vec![
        "--headless".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--disable-background-timer-throttling".to_string(),
        "--disable-backgrounding-occluded-windows".to_string(),
        "--disable-renderer-backgrounding".to_string(),
        "--disable-features=TranslateUI".to_string(),
        "--disable-extensions".to_string(),
        "--disable-default-apps".to_string(),
        "--disable-sync".to_string(),
        "--no-first-run".to_string(),
        "--ignore-certificate-errors".to_string(),
        format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        ),
        format!("--user-data-dir=/tmp/chromium-screenshot-{}", unique_id),
        format!("--temp-dir=/tmp/chromium-temp-{}", unique_id),
    ];

    if let Some(user_agent) = &config.user_agent {
        args.push(format!("--user-agent={user_agent}"));
    }

    args
}

pub fn create_browser_config(
    config: &Config,
    session_id: &str,
) -> Result<chromiumoxide::browser::BrowserConfig, String> {
    use chromiumoxide::browser::BrowserConfig;

    let mut builder = BrowserConfig::builder()
        .window_size(config.viewport.width, config.viewport.height)
        .args(get_chrome_args(config, session_id));

    if let Some(chrome_path) = &config.chrome_path {
        builder = builder.chrome_executable(chrome_path);
    }

    builder.build()
}

/// Serialize/deserialize `Duration` fields as whole seconds, matching the
/// flat integer config keys callers supply.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
