//! Transform orchestration: the decision layer of the crate.
//!
//! [`Transformer::transform`] answers one question per call: given an image
//! id and a set of transform options, what is the encoded result — and can a
//! cached one be reused? It derives the cache key, consults the result cache,
//! and on a miss fetches the source and assembles the operation chain:
//!
//! ```text
//! key → cache get → [hit: return]
//!     → fetch source → resolve format
//!     → normalize → [blur] → smartcrop | crop | fit → [overlay]
//!     → encode → cache set → return
//! ```
//!
//! The chain is linear: no retries, no backtracking, each optional stage a
//! one-shot conditional. The only locally recovered failures are a missing
//! source (returned as a null-image result, not cached) and a missing or
//! unfetchable overlay (compositing is skipped). Everything else propagates.
//!
//! Pixel work happens behind the [`ImageEngine`] seam; this module only
//! decides *what* to run and *in what order*.

use std::sync::Arc;

use bytes::Bytes;
use log::{debug, warn};
use thiserror::Error;

use crate::cache::{CacheError, ResultCache};
use crate::engine::{EncodeParams, EngineError, ImageEngine, ImageOp};
use crate::fetch::{FetchError, SourceFetcher, SourceOrigin};
use crate::fingerprint::cache_key;
use crate::geometry::crop_dimensions;
use crate::options::{Gravity, OutputFormat, TransformOptions, TransformResult};
use crate::smartcrop::{SmartcropEngine, SmartcropError};

/// Edge of the square canvas overlay badges are scaled onto.
const OVERLAY_CANVAS: u32 = 200;

/// Top-left offset at which the badge lands on the main image.
const OVERLAY_OFFSET: (u32, u32) = (35, 35);

/// Opaque accent flattened behind the badge's transparent padding.
const OVERLAY_BACKGROUND: [u8; 3] = [232, 106, 51];

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("smartcrop error: {0}")]
    Smartcrop(#[from] SmartcropError),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

/// Orchestrator tunables.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Longest edge either crop path will work at. Crop targets above this
    /// are clamped (aspect preserved) before saliency analysis and resizing,
    /// bounding the cost of crop-detection work.
    pub max_crop_size: u32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_crop_size: 2000,
        }
    }
}

/// The transform orchestrator.
///
/// Holds the injected collaborators and a [`TransformConfig`]; owns no other
/// state. Construct one at startup and share it by reference — it is
/// `Send + Sync` and processes each call as one sequential async task.
///
/// Concurrent calls that miss on the same key are not deduplicated: both
/// recompute and both write. The writes are idempotent (same key, same
/// value), so the race costs work, not correctness.
pub struct Transformer {
    cache: Arc<dyn ResultCache>,
    sources: Arc<dyn SourceFetcher>,
    overlays: Arc<dyn SourceFetcher>,
    engine: Arc<dyn ImageEngine>,
    smartcrop: Arc<dyn SmartcropEngine>,
    config: TransformConfig,
}

impl Transformer {
    pub fn new(
        cache: Arc<dyn ResultCache>,
        sources: Arc<dyn SourceFetcher>,
        overlays: Arc<dyn SourceFetcher>,
        engine: Arc<dyn ImageEngine>,
        smartcrop: Arc<dyn SmartcropEngine>,
        config: TransformConfig,
    ) -> Self {
        Self {
            cache,
            sources,
            overlays,
            engine,
            smartcrop,
            config,
        }
    }

    /// Produce the transformed image for `id` under `options`, reusing a
    /// cached result when one exists.
    ///
    /// The cache key is derived from the options exactly as requested. When
    /// `options.format` is unset the output format is resolved from the
    /// source's native format *after* the key exists, so the stored result
    /// carries the resolved format while the key does not — a format-less
    /// request and an explicit request for the native format occupy two keys.
    ///
    /// A source fetch that yields no bytes short-circuits to
    /// `TransformResult { format: options.format, image: None }`, which is
    /// returned without being cached.
    pub async fn transform(
        &self,
        id: &str,
        options: &TransformOptions,
        origin: SourceOrigin,
    ) -> Result<TransformResult, TransformError> {
        let key = cache_key(id, origin, options);

        if let Some(cached) = self.cache.get(&key).await? {
            debug!("cache hit for {id}");
            return Ok(cached);
        }
        debug!("cache miss for {id}, computing");

        let Some(source) = self.sources.fetch(id, origin).await? else {
            debug!("no source bytes for {id}");
            return Ok(TransformResult {
                format: options.format,
                image: None,
            });
        };

        let info = self.engine.identify(&source)?;
        let format = options.format.unwrap_or(info.format);

        let mut ops = vec![ImageOp::Normalize];

        if options.blur {
            ops.push(ImageOp::Blur {
                sigma: options.blur_sigma,
            });
        }

        if options.smartcrop {
            let width = require_width(options, "smartcrop")?;
            let (target_w, target_h) =
                crop_dimensions(self.config.max_crop_size, width, options.height);
            let region = self.smartcrop.crop(&source, target_w, target_h)?;
            ops.push(ImageOp::Extract { region });
            // Square output at the target width
            ops.push(ImageOp::Cover {
                width: target_w,
                height: target_w,
                gravity: Gravity::Center,
            });
        } else if options.crop {
            let width = require_width(options, "crop")?;
            let (target_w, target_h) =
                crop_dimensions(self.config.max_crop_size, width, options.height);
            ops.push(ImageOp::Cover {
                width: target_w,
                height: target_h,
                gravity: options.gravity,
            });
        } else if options.width.is_some() || options.height.is_some() {
            ops.push(ImageOp::FitWithin {
                width: options.width,
                height: options.height,
            });
        }

        if options.overlay {
            if let Some(badge) = self.overlay_badge(options).await? {
                ops.push(ImageOp::Composite {
                    image: badge,
                    left: OVERLAY_OFFSET.0,
                    top: OVERLAY_OFFSET.1,
                });
            }
        }

        let encode = EncodeParams {
            format,
            quality: options.quality,
            progressive: options.progressive,
        };
        let encoded = self.engine.apply(&source, &ops, &encode)?;

        let result = TransformResult {
            format: Some(format),
            image: Some(Bytes::from(encoded)),
        };
        self.cache.set(&key, result.clone()).await?;
        Ok(result)
    }

    /// Fetch the overlay image and prepare it as a composite-ready badge:
    /// scaled onto a fixed square canvas with transparent padding, then
    /// flattened onto the accent background.
    ///
    /// A missing or unfetchable overlay yields `None` — the caller skips
    /// compositing and the rest of the pipeline is unaffected. Engine
    /// failures while preparing the badge still propagate.
    async fn overlay_badge(
        &self,
        options: &TransformOptions,
    ) -> Result<Option<Bytes>, TransformError> {
        let Some(overlay_id) = options.overlay_image.as_deref() else {
            debug!("overlay requested without an overlay image");
            return Ok(None);
        };

        let bytes = match self.overlays.fetch(overlay_id, SourceOrigin::Storage).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("overlay {overlay_id} not found, compositing skipped");
                return Ok(None);
            }
            Err(e) => {
                warn!("overlay {overlay_id} fetch failed, compositing skipped: {e}");
                return Ok(None);
            }
        };

        let badge_ops = [
            ImageOp::Contain {
                width: OVERLAY_CANVAS,
                height: OVERLAY_CANVAS,
            },
            ImageOp::Flatten {
                background: OVERLAY_BACKGROUND,
            },
        ];
        let encode = EncodeParams {
            format: OutputFormat::Png,
            quality: None,
            progressive: false,
        };
        let badge = self.engine.apply(&bytes, &badge_ops, &encode)?;
        Ok(Some(Bytes::from(badge)))
    }
}

fn require_width(options: &TransformOptions, branch: &str) -> Result<u32, TransformError> {
    options
        .width
        .ok_or_else(|| TransformError::InvalidOptions(format!("{branch} requires a target width")))
}
