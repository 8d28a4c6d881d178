//! Pixel engine seam: operation descriptions and the trait every engine
//! implements.
//!
//! The orchestrator never touches pixels. It assembles an ordered list of
//! [`ImageOp`]s plus [`EncodeParams`] — *what* to do — and an engine executes
//! them in order — *how*. This separation keeps the decision layer testable
//! with a recording mock and lets deployments swap the pixel implementation
//! without touching pipeline logic.
//!
//! The production implementation is [`RustEngine`](rust_engine::RustEngine),
//! pure Rust over the `image` crate.

pub mod rust_engine;

use bytes::Bytes;
use thiserror::Error;

use crate::options::{Gravity, OutputFormat, Quality};
use crate::smartcrop::CropRegion;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("processing failed: {0}")]
    Process(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("unsupported format: {0}")]
    Unsupported(String),
}

/// Native format and pixel dimensions of an undecoded source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

/// One step of a transform pipeline, in source-to-output order.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOp {
    /// Auto-rotate per embedded orientation metadata.
    Normalize,
    /// Gaussian blur. A sigma of zero or less is a no-op.
    Blur { sigma: f32 },
    /// Cut a sub-region out of the image.
    Extract { region: CropRegion },
    /// Fill the target box and trim the overhang at the anchor.
    Cover {
        width: u32,
        height: u32,
        gravity: Gravity,
    },
    /// Fit inside the given bounds, preserving aspect, never enlarging.
    FitWithin {
        width: Option<u32>,
        height: Option<u32>,
    },
    /// Scale onto a fixed canvas with transparent padding.
    Contain { width: u32, height: u32 },
    /// Replace transparency with an opaque background color.
    Flatten { background: [u8; 3] },
    /// Alpha-composite another image at a fixed offset.
    Composite { image: Bytes, left: u32, top: u32 },
}

/// Final encoding parameters.
///
/// `progressive` is carried for engines whose encoders support it; it always
/// participates in cache fingerprints either way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeParams {
    pub format: OutputFormat,
    pub quality: Option<Quality>,
    pub progressive: bool,
}

/// Trait for pixel engines.
///
/// Both operations are synchronous: pixel work is CPU-bound and the
/// orchestrator runs one sequential task per request.
pub trait ImageEngine: Send + Sync {
    /// Read native format and dimensions without a full decode.
    fn identify(&self, bytes: &[u8]) -> Result<ImageInfo, EngineError>;

    /// Decode, run the ops in order, encode.
    fn apply(
        &self,
        bytes: &[u8],
        ops: &[ImageOp],
        encode: &EncodeParams,
    ) -> Result<Vec<u8>, EngineError>;
}
