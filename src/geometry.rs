//! Pure calculation functions for transform geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! The orchestrator uses [`crop_dimensions`] to bound crop targets; the
//! engine uses the rest to turn a requested geometry into concrete pixel
//! dimensions and offsets.

use crate::options::Gravity;

/// Calculate the working crop target from a maximum bound and requested
/// dimensions.
///
/// If `height` is omitted the target is square (`height = width`). When both
/// edges already fit inside `max_size` the request passes through unchanged —
/// the bound never upscales. Otherwise the long edge is clamped to `max_size`
/// and the short edge scaled to preserve aspect ratio.
///
/// Both the fixed-crop and smartcrop paths go through this, so saliency
/// analysis is never asked to scan more than `max_size` pixels on an edge.
///
/// # Examples
/// ```
/// # use darkroom::geometry::crop_dimensions;
/// assert_eq!(crop_dimensions(2000, 500, Some(500)), (500, 500));
/// assert_eq!(crop_dimensions(2000, 4000, Some(2000)), (2000, 1000));
/// ```
pub fn crop_dimensions(max_size: u32, width: u32, height: Option<u32>) -> (u32, u32) {
    let height = height.unwrap_or(width);

    if width <= max_size && height <= max_size {
        return (width, height);
    }

    let aspect = width as f64 / height as f64;
    if width > height {
        (max_size, (max_size as f64 / aspect).round() as u32)
    } else {
        ((max_size as f64 * aspect).round() as u32, max_size)
    }
}

/// Calculate a fit-inside resize target: preserve aspect ratio, stay within
/// the requested bounds, never enlarge beyond the source.
///
/// Omitted bounds are unconstrained. With no bounds at all the source
/// dimensions come back unchanged.
pub fn fit_within(source: (u32, u32), width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    let (src_w, src_h) = source;

    let w_scale = width.map_or(1.0, |w| w as f64 / src_w as f64);
    let h_scale = height.map_or(1.0, |h| h as f64 / src_h as f64);
    let scale = w_scale.min(h_scale).min(1.0);

    (
        ((src_w as f64 * scale).round() as u32).max(1),
        ((src_h as f64 * scale).round() as u32).max(1),
    )
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while keeping
/// the source aspect ratio. One dimension matches the target exactly, the
/// other may exceed it; the overhang is what an anchored crop removes.
pub fn cover_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = (h as f64 * src_aspect).round() as u32;
        (w.max(tgt_w), h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = (w as f64 / src_aspect).round() as u32;
        (w, h.max(tgt_h))
    }
}

/// Calculate dimensions that fit a canvas while keeping aspect ratio,
/// scaling up if the source is smaller.
///
/// Used for overlay badges, where the canvas size is fixed and the overlay
/// is scaled to touch it on the long edge (the short edge gets padding).
pub fn contain_dimensions(source: (u32, u32), canvas: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (can_w, can_h) = canvas;

    let scale = (can_w as f64 / src_w as f64).min(can_h as f64 / src_h as f64);

    (
        (((src_w as f64 * scale).round() as u32).max(1)).min(can_w),
        (((src_h as f64 * scale).round() as u32).max(1)).min(can_h),
    )
}

/// Calculate where a window sits inside a larger canvas for a given anchor.
///
/// Returns the `(x, y)` of the window's top-left corner. The window is
/// assumed to fit inside the canvas; offsets saturate at zero if it does not.
pub fn anchor_offset(gravity: Gravity, canvas: (u32, u32), window: (u32, u32)) -> (u32, u32) {
    let (can_w, can_h) = canvas;
    let (win_w, win_h) = window;

    let left = 0;
    let center = can_w.saturating_sub(win_w) / 2;
    let right = can_w.saturating_sub(win_w);
    let top = 0;
    let middle = can_h.saturating_sub(win_h) / 2;
    let bottom = can_h.saturating_sub(win_h);

    match gravity {
        Gravity::Center => (center, middle),
        Gravity::North => (center, top),
        Gravity::Northeast => (right, top),
        Gravity::East => (right, middle),
        Gravity::Southeast => (right, bottom),
        Gravity::South => (center, bottom),
        Gravity::Southwest => (left, bottom),
        Gravity::West => (left, middle),
        Gravity::Northwest => (left, top),
    }
}
