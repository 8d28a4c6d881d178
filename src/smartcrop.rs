//! Content-aware crop analysis: the seam to a saliency engine.
//!
//! The orchestrator hands an analyzer the source bytes and a target size;
//! the analyzer answers with the sub-region worth keeping. What "worth
//! keeping" means is the analyzer's business — edge density, face detection,
//! a hosted vision service. This crate ships only [`CenterWeighted`], which
//! assumes the subject is centered; saliency-based analyzers plug in through
//! the same trait.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmartcropError {
    #[error("crop analysis failed: {0}")]
    Analysis(String),
}

/// A sub-region of an image, in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// `crop(bytes, width, height) -> best region for that target size`.
pub trait SmartcropEngine: Send + Sync {
    fn crop(&self, bytes: &[u8], width: u32, height: u32) -> Result<CropRegion, SmartcropError>;
}

/// Analyzer that picks the largest centered region of the target aspect.
///
/// Reads only the image header for dimensions — no pixel decode.
pub struct CenterWeighted;

impl CenterWeighted {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CenterWeighted {
    fn default() -> Self {
        Self::new()
    }
}

impl SmartcropEngine for CenterWeighted {
    fn crop(&self, bytes: &[u8], width: u32, height: u32) -> Result<CropRegion, SmartcropError> {
        if width == 0 || height == 0 {
            return Err(SmartcropError::Analysis(
                "target dimensions must be positive".into(),
            ));
        }

        let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| SmartcropError::Analysis(format!("unrecognized image data: {e}")))?;
        let (src_w, src_h) = reader
            .into_dimensions()
            .map_err(|e| SmartcropError::Analysis(format!("unreadable dimensions: {e}")))?;

        let target_aspect = width as f64 / height as f64;
        let src_aspect = src_w as f64 / src_h as f64;

        let (region_w, region_h) = if src_aspect > target_aspect {
            // Source is wider than the target: full height, trimmed width
            let w = ((src_h as f64 * target_aspect).round() as u32).min(src_w);
            (w.max(1), src_h)
        } else {
            let h = ((src_w as f64 / target_aspect).round() as u32).min(src_h);
            (src_w, h.max(1))
        };

        Ok(CropRegion {
            x: (src_w - region_w) / 2,
            y: (src_h - region_h) / 2,
            width: region_w,
            height: region_h,
        })
    }
}
