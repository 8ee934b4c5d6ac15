//! Request orchestration for the screenshot pipeline
//!
//! The `ScreenshotService` coordinates one request end to end: normalize
//! the URL, consult the cache, and on a miss take a gate lease and drive
//! the capture engine, storing the result for later callers.

use crate::{
    normalize_url, Capture, CacheKey, CaptureGate, ChromeCaptureEngine, Config, Metrics,
    ScreenshotCache, ScreenshotError,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A validated capture request after normalization and defaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// What the caller gets back: the image and whether it came from cache.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub image: Arc<Vec<u8>>,
    pub cached: bool,
}

/// Coordinates normalization, caching, gating, and capture for every
/// request.
///
/// Constructed once at startup with explicitly owned cache/gate/engine
/// state and shared behind an `Arc`; tests build fresh instances with a
/// stub engine.
///
/// Concurrent misses for the same key are not deduplicated: each proceeds
/// through its own capture and the last write wins the cache entry.
pub struct ScreenshotService {
    config: Config,
    cache: Arc<ScreenshotCache>,
    gate: CaptureGate,
    engine: Arc<dyn Capture>,
    metrics: Arc<Metrics>,
}

impl ScreenshotService {
    pub fn new(config: Config) -> Self {
        let engine = Arc::new(ChromeCaptureEngine::new(config.clone()));
        Self::with_engine(config, engine)
    }

    /// Build a service around an arbitrary capture engine. This is the
    /// seam tests use to avoid launching Chrome.
    pub fn with_engine(config: Config, engine: Arc<dyn Capture>) -> Self {
        let cache = Arc::new(ScreenshotCache::new(config.cache_ttl));
        let gate = CaptureGate::new(config.max_concurrent_captures, config.queue_timeout);
        Self {
            config,
            cache,
            gate,
            engine,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ScreenshotCache> {
        &self.cache
    }

    /// Capture slots currently free, for health reporting.
    pub fn available_capture_slots(&self) -> usize {
        self.gate.available_slots()
    }

    /// Total capture slots the gate was configured with.
    pub fn max_capture_slots(&self) -> usize {
        self.gate.max_slots()
    }

    /// Serve one screenshot request.
    ///
    /// Missing dimensions default from the configured viewport. Client
    /// errors (bad URL, out-of-range dimensions) fail before any cache or
    /// gate interaction; capture failures release the gate lease and are
    /// never cached.
    pub async fn handle(
        &self,
        raw_url: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<CaptureOutcome, ScreenshotError> {
        let request_id = uuid::Uuid::new_v4();

        let request = self.validate(raw_url, width, height).map_err(|e| {
            self.metrics.record_invalid_request();
            debug!(%request_id, "rejected request for {:?}: {}", raw_url, e);
            e
        })?;

        let key = CacheKey::new(&request.url, request.width, request.height);

        if let Some(image) = self.cache.get(&key) {
            self.metrics.record_cache_hit();
            debug!(%request_id, "cache hit for {}", key.as_str());
            return Ok(CaptureOutcome {
                image,
                cached: true,
            });
        }
        self.metrics.record_cache_miss();

        let lease = self.gate.acquire().await.map_err(|e| {
            if e.is_busy() {
                self.metrics.record_gate_rejection();
                warn!(%request_id, "no capture slot within {:?}", self.config.queue_timeout);
            }
            e
        })?;

        let start = Instant::now();
        let result = self
            .engine
            .capture(&request.url, request.width, request.height)
            .await;
        let duration = start.elapsed();

        // The lease drops on both arms; a failed render must not keep
        // holding a browser slot.
        match result {
            Ok(data) => {
                self.metrics.record_capture(duration, true);
                let image = Arc::new(data);
                self.cache.put(key, image.clone());
                self.metrics.set_cache_entries(self.cache.len());
                drop(lease);
                info!(
                    %request_id,
                    "captured {} ({}x{}) in {:?}",
                    request.url, request.width, request.height, duration
                );
                Ok(CaptureOutcome {
                    image,
                    cached: false,
                })
            }
            Err(e) => {
                self.metrics.record_capture(duration, false);
                drop(lease);
                warn!(%request_id, "capture failed for {}: {}", request.url, e);
                Err(e)
            }
        }
    }

    fn validate(
        &self,
        raw_url: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<CaptureRequest, ScreenshotError> {
        let url = normalize_url(raw_url)?;

        let width = width.unwrap_or(self.config.viewport.width);
        let height = height.unwrap_or(self.config.viewport.height);

        if width == 0
            || height == 0
            || width > self.config.max_dimension
            || height > self.config.max_dimension
        {
            return Err(ScreenshotError::InvalidDimensions { width, height });
        }

        Ok(CaptureRequest { url, width, height })
    }
}
