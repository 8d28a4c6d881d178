//! Request and result types for image transformation.
//!
//! These structs describe *what* a caller wants, not *how* it is produced.
//! [`TransformOptions`] is the immutable per-call request record: the
//! orchestrator never writes back into it. Values derived during a call
//! (most importantly the output format resolved from the source image) are
//! threaded through the pipeline separately, so the record used for cache
//! addressing is exactly what the caller sent.
//!
//! ## Types
//!
//! - [`TransformOptions`] — the full transform request (dimensions, format,
//!   quality, blur, crop selection, overlay).
//! - [`Quality`] — lossy encoding quality (1–100, default 80). Clamped on
//!   construction.
//! - [`OutputFormat`] — the encodable image formats.
//! - [`Gravity`] — nine-point anchor used for positioned crops.
//! - [`TransformResult`] — what the cache stores and `transform` returns.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Encodable output formats.
///
/// When a request leaves `format` unset, the orchestrator resolves it from
/// the source image's native format and encodes to that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
            OutputFormat::Gif => "gif",
        }
    }
}

/// Positional anchor for cropped resizes: which part of the image survives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gravity {
    #[default]
    Center,
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Gravity {
    pub fn as_str(self) -> &'static str {
        match self {
            Gravity::Center => "center",
            Gravity::North => "north",
            Gravity::Northeast => "northeast",
            Gravity::East => "east",
            Gravity::Southeast => "southeast",
            Gravity::South => "south",
            Gravity::Southwest => "southwest",
            Gravity::West => "west",
            Gravity::Northwest => "northwest",
        }
    }
}

/// A single transform request.
///
/// `crop` and `smartcrop` select mutually exclusive geometry branches;
/// `smartcrop` wins when both are set. Every field here participates in the
/// options fingerprint — see [`fingerprint`](crate::fingerprint::fingerprint).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<OutputFormat>,
    pub quality: Option<Quality>,
    pub progressive: bool,
    pub blur: bool,
    pub blur_sigma: f32,
    pub crop: bool,
    pub smartcrop: bool,
    pub gravity: Gravity,
    pub overlay: bool,
    pub overlay_image: Option<String>,
}

/// The value stored in the result cache and returned to callers.
///
/// `image` is `None` only when the source fetch produced no bytes; that
/// result is returned as-is and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    pub format: Option<OutputFormat>,
    pub image: Option<Bytes>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(200).value(), 100);
    }

    #[test]
    fn quality_default_is_80() {
        assert_eq!(Quality::default().value(), 80);
    }

    #[test]
    fn gravity_defaults_to_center() {
        assert_eq!(TransformOptions::default().gravity, Gravity::Center);
    }

    #[test]
    fn options_deserialize_with_partial_fields() {
        let opts: TransformOptions =
            serde_json::from_str(r#"{"width": 500, "format": "webp", "blur": true}"#).unwrap();
        assert_eq!(opts.width, Some(500));
        assert_eq!(opts.height, None);
        assert_eq!(opts.format, Some(OutputFormat::Webp));
        assert!(opts.blur);
        assert!(!opts.crop);
        assert_eq!(opts.gravity, Gravity::Center);
    }

    #[test]
    fn result_roundtrips_through_serde() {
        let result = TransformResult {
            format: Some(OutputFormat::Png),
            image: Some(Bytes::from_static(b"\x89PNG")),
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: TransformResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
