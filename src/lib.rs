//! # Screenshot Server
//!
//! An HTTP service that renders web pages to full-page PNG screenshots
//! using headless Chrome. Rendered images are cached with a TTL so
//! repeated requests for the same page and viewport are served without a
//! new browser launch, and a concurrency gate bounds how many Chrome
//! sessions may run at once.
//!
//! ## Request pipeline
//!
//! ```text
//! GET /api/screenshot?url=...  ->  normalize  ->  cache lookup
//!                                                    | miss
//!                                                    v
//!                              gate lease -> capture engine -> cache store
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use screenshot_server::{Config, ScreenshotService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = Arc::new(ScreenshotService::new(Config::default()));
//!     let outcome = service.handle("example.com", None, None).await?;
//!     println!("Captured {} bytes (cached: {})", outcome.image.len(), outcome.cached);
//!     Ok(())
//! }
//! ```

/// Configuration and Chrome launch settings
pub mod config;

/// Error types for the capture pipeline
pub mod error;

/// URL normalization and validation
pub mod normalize;

/// TTL-expiring screenshot cache
pub mod cache;

/// Concurrency gate bounding simultaneous browser sessions
pub mod gate;

/// Capture engine driving headless Chrome
pub mod capture;

/// Request orchestration
pub mod service;

/// HTTP routes and error mapping
pub mod server;

/// Performance metrics collection
pub mod metrics;


pub use cache::{CacheKey, ScreenshotCache};
pub use capture::{Capture, ChromeCaptureEngine};
pub use config::{create_browser_config, get_chrome_args, Config, Viewport};
pub use error::ScreenshotError;
pub use gate::{CaptureGate, Lease};
pub use metrics::Metrics;
pub use normalize::normalize_url;
pub use server::create_router;
pub use service::{CaptureOutcome, CaptureRequest, ScreenshotService};
