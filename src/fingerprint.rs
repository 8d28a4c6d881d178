//! Options fingerprinting and cache-key derivation.
//!
//! The result cache is addressed by a stable digest of the transform request:
//! same id, same origin, and field-for-field equal options must always land
//! on the same key, and any field that affects pixel output must change it.
//!
//! ## Encoding
//!
//! The fingerprint is SHA-256 over a canonical byte serialization of
//! [`TransformOptions`]: a domain prefix, then every field in declaration
//! order. Optional fields are written as a presence tag (`\x00`/`\x01`)
//! followed by the value, so `None` can never collide with a legitimate
//! value. Strings are length-prefixed. Scalars are little-endian.
//!
//! The key is built from the options **as requested**. When `format` is
//! unset it is resolved from the source's native format later in the call,
//! after the key already exists — so a format-less request and an explicit
//! request for the native format occupy different keys. That asymmetry is
//! deliberate (see DESIGN.md).

use sha2::{Digest, Sha256};

use crate::fetch::SourceOrigin;
use crate::options::TransformOptions;

/// Namespace tag prefixed to every cache key.
///
/// Bump this to invalidate all existing keys when the fingerprint encoding
/// changes.
pub const CACHE_NAMESPACE: &str = "transform";

/// SHA-256 fingerprint of a transform request, as lowercase hex.
///
/// Pure: equal option records produce equal output on every call.
pub fn fingerprint(options: &TransformOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"options\0");

    update_opt_u32(&mut hasher, options.width);
    update_opt_u32(&mut hasher, options.height);
    update_opt_str(&mut hasher, options.format.map(|f| f.as_str()));
    update_opt_u8(&mut hasher, options.quality.map(|q| q.value()));
    update_bool(&mut hasher, options.progressive);
    update_bool(&mut hasher, options.blur);
    hasher.update(options.blur_sigma.to_le_bytes());
    update_bool(&mut hasher, options.crop);
    update_bool(&mut hasher, options.smartcrop);
    update_str(&mut hasher, options.gravity.as_str());
    update_bool(&mut hasher, options.overlay);
    update_opt_str(&mut hasher, options.overlay_image.as_deref());

    format!("{:x}", hasher.finalize())
}

/// Cache key for a transform request:
/// `{namespace}:{id}:{origin}:{fingerprint}`.
pub fn cache_key(id: &str, origin: SourceOrigin, options: &TransformOptions) -> String {
    format!(
        "{}:{}:{}:{}",
        CACHE_NAMESPACE,
        id,
        origin.as_str(),
        fingerprint(options)
    )
}

fn update_bool(hasher: &mut Sha256, value: bool) {
    hasher.update(if value { b"\x01" } else { b"\x00" });
}

fn update_opt_u32(hasher: &mut Sha256, value: Option<u32>) {
    match value {
        Some(v) => {
            hasher.update(b"\x01");
            hasher.update(v.to_le_bytes());
        }
        None => hasher.update(b"\x00"),
    }
}

fn update_opt_u8(hasher: &mut Sha256, value: Option<u8>) {
    match value {
        Some(v) => {
            hasher.update(b"\x01");
            hasher.update([v]);
        }
        None => hasher.update(b"\x00"),
    }
}

fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn update_opt_str(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update(b"\x01");
            update_str(hasher, v);
        }
        None => hasher.update(b"\x00"),
    }
}
