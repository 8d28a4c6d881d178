//! End-to-end pipeline tests: the real orchestrator wired to the real
//! pure-Rust engine, the in-memory cache, and an in-memory fetcher over
//! generated pixel data.
//!
//! Unit tests assert which ops the orchestrator assembles; these assert what
//! actually comes out the other end — dimensions, formats, pixels.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};

use darkroom::cache::MemoryCache;
use darkroom::engine::rust_engine::RustEngine;
use darkroom::fetch::{FetchError, SourceFetcher, SourceOrigin};
use darkroom::options::{OutputFormat, TransformOptions};
use darkroom::smartcrop::CenterWeighted;
use darkroom::transform::{TransformConfig, Transformer};

/// Fetcher over a fixed id → bytes map, counting every call.
struct MapFetcher {
    entries: HashMap<String, Bytes>,
    calls: AtomicUsize,
}

impl MapFetcher {
    fn new(entries: Vec<(&str, Vec<u8>)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(id, bytes)| (id.to_string(), Bytes::from(bytes)))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceFetcher for MapFetcher {
    async fn fetch(&self, id: &str, _origin: SourceOrigin) -> Result<Option<Bytes>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.get(id).cloned())
    }
}

fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn decode(bytes: &[u8]) -> DynamicImage {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap()
}

struct Pipeline {
    sources: Arc<MapFetcher>,
    transformer: Transformer,
}

fn pipeline(sources: Vec<(&str, Vec<u8>)>, overlays: Vec<(&str, Vec<u8>)>) -> Pipeline {
    let _ = env_logger::builder().is_test(true).try_init();

    let sources = Arc::new(MapFetcher::new(sources));
    let transformer = Transformer::new(
        Arc::new(MemoryCache::default()),
        sources.clone(),
        Arc::new(MapFetcher::new(overlays)),
        Arc::new(RustEngine::new()),
        Arc::new(CenterWeighted::new()),
        TransformConfig::default(),
    );
    Pipeline {
        sources,
        transformer,
    }
}

#[tokio::test]
async fn resize_produces_requested_width_and_caches() {
    let p = pipeline(vec![("photo.png", png(800, 400, [40, 80, 120]))], vec![]);
    let options = TransformOptions {
        width: Some(200),
        ..TransformOptions::default()
    };

    let first = p
        .transformer
        .transform("photo.png", &options, SourceOrigin::Storage)
        .await
        .unwrap();

    let img = decode(first.image.as_ref().unwrap());
    assert_eq!(img.dimensions(), (200, 100));
    assert_eq!(first.format, Some(OutputFormat::Png));

    let second = p
        .transformer
        .transform("photo.png", &options, SourceOrigin::Storage)
        .await
        .unwrap();

    assert_eq!(second, first);
    assert_eq!(p.sources.calls(), 1);
}

#[tokio::test]
async fn resize_never_enlarges_past_the_source() {
    let p = pipeline(vec![("small.png", png(100, 80, [10, 10, 10]))], vec![]);
    let options = TransformOptions {
        width: Some(800),
        height: Some(600),
        ..TransformOptions::default()
    };

    let result = p
        .transformer
        .transform("small.png", &options, SourceOrigin::Storage)
        .await
        .unwrap();

    assert_eq!(decode(result.image.as_ref().unwrap()).dimensions(), (100, 80));
}

#[tokio::test]
async fn explicit_jpeg_format_reencodes() {
    let p = pipeline(vec![("photo.png", png(64, 64, [200, 150, 100]))], vec![]);
    let options = TransformOptions {
        format: Some(OutputFormat::Jpeg),
        ..TransformOptions::default()
    };

    let result = p
        .transformer
        .transform("photo.png", &options, SourceOrigin::Storage)
        .await
        .unwrap();

    let bytes = result.image.as_ref().unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    assert_eq!(result.format, Some(OutputFormat::Jpeg));
}

#[tokio::test]
async fn smartcrop_yields_a_square_at_target_width() {
    let p = pipeline(vec![("wide.png", png(800, 400, [90, 90, 90]))], vec![]);
    let options = TransformOptions {
        width: Some(200),
        smartcrop: true,
        ..TransformOptions::default()
    };

    let result = p
        .transformer
        .transform("wide.png", &options, SourceOrigin::Storage)
        .await
        .unwrap();

    assert_eq!(decode(result.image.as_ref().unwrap()).dimensions(), (200, 200));
}

#[tokio::test]
async fn anchored_crop_hits_target_exactly() {
    let p = pipeline(vec![("wide.png", png(800, 400, [90, 90, 90]))], vec![]);
    let options = TransformOptions {
        width: Some(200),
        height: Some(100),
        crop: true,
        ..TransformOptions::default()
    };

    let result = p
        .transformer
        .transform("wide.png", &options, SourceOrigin::Storage)
        .await
        .unwrap();

    assert_eq!(decode(result.image.as_ref().unwrap()).dimensions(), (200, 100));
}

#[tokio::test]
async fn blur_keeps_dimensions_but_changes_pixels() {
    // A two-tone source so blurring has an edge to smear
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(120, 120, |x, _| {
        if x < 60 {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    }));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    let p = pipeline(vec![("edges.png", out.into_inner())], vec![]);

    let plain = p
        .transformer
        .transform("edges.png", &TransformOptions::default(), SourceOrigin::Storage)
        .await
        .unwrap();
    let blurred = p
        .transformer
        .transform(
            "edges.png",
            &TransformOptions {
                blur: true,
                blur_sigma: 4.0,
                ..TransformOptions::default()
            },
            SourceOrigin::Storage,
        )
        .await
        .unwrap();

    assert_eq!(
        decode(blurred.image.as_ref().unwrap()).dimensions(),
        (120, 120)
    );
    assert_ne!(blurred.image, plain.image);
}

#[tokio::test]
async fn overlay_badge_lands_at_fixed_offset() {
    let p = pipeline(
        vec![("photo.png", png(400, 400, [255, 255, 255]))],
        vec![("badge.png", png(100, 100, [255, 0, 0]))],
    );
    let options = TransformOptions {
        overlay: true,
        overlay_image: Some("badge.png".into()),
        ..TransformOptions::default()
    };

    let result = p
        .transformer
        .transform("photo.png", &options, SourceOrigin::Storage)
        .await
        .unwrap();

    let img = decode(result.image.as_ref().unwrap()).to_rgba8();
    assert_eq!(img.dimensions(), (400, 400));
    // Inside the 200x200 badge placed at (35,35)
    assert_eq!(img.get_pixel(100, 100).0, [255, 0, 0, 255]);
    // Outside it the source shows through
    assert_eq!(img.get_pixel(350, 350).0, [255, 255, 255, 255]);
}

#[tokio::test]
async fn missing_overlay_matches_plain_pipeline_output() {
    let p = pipeline(vec![("photo.png", png(300, 200, [50, 100, 150]))], vec![]);
    let with_overlay = TransformOptions {
        width: Some(150),
        overlay: true,
        overlay_image: Some("gone.png".into()),
        ..TransformOptions::default()
    };
    let without = TransformOptions {
        width: Some(150),
        ..TransformOptions::default()
    };

    let a = p
        .transformer
        .transform("photo.png", &with_overlay, SourceOrigin::Storage)
        .await
        .unwrap();
    let b = p
        .transformer
        .transform("photo.png", &without, SourceOrigin::Storage)
        .await
        .unwrap();

    assert_eq!(a.image, b.image);
}

#[tokio::test]
async fn missing_source_returns_null_image() {
    let p = pipeline(vec![], vec![]);
    let options = TransformOptions {
        format: Some(OutputFormat::Webp),
        ..TransformOptions::default()
    };

    let result = p
        .transformer
        .transform("nope.png", &options, SourceOrigin::External)
        .await
        .unwrap();

    assert_eq!(result.format, Some(OutputFormat::Webp));
    assert_eq!(result.image, None);
}
