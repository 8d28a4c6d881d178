//! Pure Rust pixel engine — everything statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, GIF) | `image` crate (pure Rust decoders) |
//! | Orientation normalize | `kamadak-exif` tag read + `image` rotate/flip |
//! | Blur | `image::imageops` Gaussian blur |
//! | Extract / crop | `DynamicImage::crop_imm` |
//! | Resize | Lanczos3 via `resize_exact` on pre-computed dimensions |
//! | Composite / flatten | `image::imageops::overlay` over RGBA buffers |
//! | Encode | format encoders from the `image` crate |
//!
//! The JPEG encoder emits baseline DCT; the `progressive` flag in
//! [`EncodeParams`] is accepted and ignored here.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, Rgba, RgbaImage};

use super::{EncodeParams, EngineError, ImageEngine, ImageInfo, ImageOp};
use crate::geometry::{anchor_offset, contain_dimensions, cover_dimensions, fit_within};
use crate::options::OutputFormat;
use crate::smartcrop::CropRegion;

/// Pixel engine built on the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustEngine;

impl RustEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageEngine for RustEngine {
    fn identify(&self, bytes: &[u8]) -> Result<ImageInfo, EngineError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| EngineError::Decode(format!("unrecognized image data: {e}")))?;
        let format = reader
            .format()
            .ok_or_else(|| EngineError::Unsupported("unknown image format".into()))?;
        let format = native_format(format)?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| EngineError::Decode(format!("unreadable dimensions: {e}")))?;

        Ok(ImageInfo {
            format,
            width,
            height,
        })
    }

    fn apply(
        &self,
        bytes: &[u8],
        ops: &[ImageOp],
        encode: &EncodeParams,
    ) -> Result<Vec<u8>, EngineError> {
        let mut img = decode(bytes)?;
        for op in ops {
            img = apply_op(img, op, bytes)?;
        }
        encode_image(&img, encode)
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, EngineError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| EngineError::Decode(format!("unrecognized image data: {e}")))?
        .decode()
        .map_err(|e| EngineError::Decode(e.to_string()))
}

fn apply_op(img: DynamicImage, op: &ImageOp, source: &[u8]) -> Result<DynamicImage, EngineError> {
    match *op {
        ImageOp::Normalize => Ok(apply_orientation(img, orientation_of(source))),
        ImageOp::Blur { sigma } => {
            if sigma > 0.0 {
                Ok(img.blur(sigma))
            } else {
                Ok(img)
            }
        }
        ImageOp::Extract { region } => extract(img, region),
        ImageOp::Cover {
            width,
            height,
            gravity,
        } => {
            let (fill_w, fill_h) = cover_dimensions(img.dimensions(), (width, height));
            let filled = img.resize_exact(fill_w, fill_h, FilterType::Lanczos3);
            let window = (width.min(fill_w), height.min(fill_h));
            let (x, y) = anchor_offset(gravity, (fill_w, fill_h), window);
            Ok(filled.crop_imm(x, y, window.0, window.1))
        }
        ImageOp::FitWithin { width, height } => {
            let (target_w, target_h) = fit_within(img.dimensions(), width, height);
            if (target_w, target_h) == img.dimensions() {
                Ok(img)
            } else {
                Ok(img.resize_exact(target_w, target_h, FilterType::Lanczos3))
            }
        }
        ImageOp::Contain { width, height } => {
            let (scaled_w, scaled_h) = contain_dimensions(img.dimensions(), (width, height));
            let scaled = img.resize_exact(scaled_w, scaled_h, FilterType::Lanczos3);

            let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
            let x = (width - scaled_w) / 2;
            let y = (height - scaled_h) / 2;
            image::imageops::overlay(&mut canvas, &scaled.to_rgba8(), x as i64, y as i64);
            Ok(DynamicImage::ImageRgba8(canvas))
        }
        ImageOp::Flatten { background } => {
            let (w, h) = img.dimensions();
            let [r, g, b] = background;
            let mut canvas = RgbaImage::from_pixel(w, h, Rgba([r, g, b, 255]));
            image::imageops::overlay(&mut canvas, &img.to_rgba8(), 0, 0);
            Ok(DynamicImage::ImageRgba8(canvas))
        }
        ImageOp::Composite {
            ref image,
            left,
            top,
        } => {
            let layer = decode(image)?;
            let mut base = img.to_rgba8();
            image::imageops::overlay(&mut base, &layer.to_rgba8(), left as i64, top as i64);
            Ok(DynamicImage::ImageRgba8(base))
        }
    }
}

/// Cut a region out of the image, clamped to its bounds.
fn extract(img: DynamicImage, region: CropRegion) -> Result<DynamicImage, EngineError> {
    let (w, h) = img.dimensions();
    let x = region.x.min(w);
    let y = region.y.min(h);
    let crop_w = region.width.min(w - x);
    let crop_h = region.height.min(h - y);

    if crop_w == 0 || crop_h == 0 {
        return Err(EngineError::Process(format!(
            "crop region {region:?} lies outside a {w}x{h} image"
        )));
    }

    Ok(img.crop_imm(x, y, crop_w, crop_h))
}

/// EXIF orientation tag value (1-8), or 1 when absent or unreadable.
fn orientation_of(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    exif::Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|meta| {
            meta.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .unwrap_or(1)
}

fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

fn native_format(format: ImageFormat) -> Result<OutputFormat, EngineError> {
    match format {
        ImageFormat::Jpeg => Ok(OutputFormat::Jpeg),
        ImageFormat::Png => Ok(OutputFormat::Png),
        ImageFormat::WebP => Ok(OutputFormat::Webp),
        ImageFormat::Gif => Ok(OutputFormat::Gif),
        other => Err(EngineError::Unsupported(format!("{other:?}"))),
    }
}

fn encode_image(img: &DynamicImage, encode: &EncodeParams) -> Result<Vec<u8>, EngineError> {
    let mut out = Cursor::new(Vec::new());
    match encode.format {
        OutputFormat::Jpeg => {
            // JPEG carries no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let quality = encode.quality.unwrap_or_default();
            let encoder = JpegEncoder::new_with_quality(&mut out, quality.value());
            rgb.write_with_encoder(encoder)
                .map_err(|e| EngineError::Encode(e.to_string()))?;
        }
        OutputFormat::Png => {
            img.write_to(&mut out, ImageFormat::Png)
                .map_err(|e| EngineError::Encode(e.to_string()))?;
        }
        OutputFormat::Webp => {
            // The pure-Rust WebP encoder is lossless; quality does not apply
            img.write_to(&mut out, ImageFormat::WebP)
                .map_err(|e| EngineError::Encode(e.to_string()))?;
        }
        OutputFormat::Gif => {
            img.write_to(&mut out, ImageFormat::Gif)
                .map_err(|e| EngineError::Encode(e.to_string()))?;
        }
    }
    Ok(out.into_inner())
}
