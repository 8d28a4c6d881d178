//! # Darkroom
//!
//! An on-demand image transformation cache. Given a source image id and a
//! set of transform options — resize, crop, smartcrop, blur, overlay,
//! format and quality — it produces an encoded image buffer, memoizing
//! results under a deterministic cache key so that repeated requests with
//! identical parameters skip recomputation entirely.
//!
//! # Architecture: A Decision Layer Over Seams
//!
//! Darkroom is deliberately *not* an image-processing library. It decides
//! **what** operations to run, **in what order**, and **whether** a cached
//! result can be reused; the expensive work lives behind traits:
//!
//! ```text
//! transform(id, options, origin)
//!   → cache key          (fingerprint of the request)
//!   → ResultCache.get    (hit: return immediately)
//!   → SourceFetcher      (miss for the primary source → null-image result)
//!   → op chain           normalize → [blur] → smartcrop|crop|fit → [overlay]
//!   → ImageEngine.apply  (decode, run ops, encode)
//!   → ResultCache.set    → return
//! ```
//!
//! Each call is one sequential async task: no retries, no backtracking, no
//! internal fan-out. Concurrent misses on the same key recompute redundantly
//! and both write — an accepted race, since identical keys store identical
//! values.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`transform`] | The orchestrator — cache-key check, op-chain assembly, overlay preparation |
//! | [`fingerprint`] | Deterministic SHA-256 fingerprint of a request and cache-key derivation |
//! | [`geometry`] | Pure dimension math: crop bounds, fit/cover/contain targets, anchor offsets |
//! | [`options`] | The immutable request record and the cached result type |
//! | [`cache`] | `ResultCache` seam plus a bounded in-memory LRU implementation |
//! | [`fetch`] | `SourceFetcher` seam, origin tags, and a filesystem fetcher |
//! | [`engine`] | `ImageEngine` seam — op descriptions and the pure-Rust pixel engine |
//! | [`smartcrop`] | `SmartcropEngine` seam plus a center-weighted fallback analyzer |
//!
//! # Design Decisions
//!
//! ## Keys From the Request, Not the Resolution
//!
//! The cache key is a digest of the options exactly as the caller sent them.
//! When `format` is unset it is resolved from the source's native format
//! *after* the key exists, and only the stored result carries the resolved
//! value. A format-less request and an explicit request for the native
//! format therefore occupy two cache entries. Collapsing them would require
//! fetching the source before addressing the cache, which defeats the point
//! of a cache hit.
//!
//! ## Immutable Options
//!
//! [`options::TransformOptions`] is never written back into during a call.
//! Values derived mid-pipeline (the resolved format) travel as locals, so
//! the record used for cache addressing is always the request itself.
//!
//! ## Explicit Origin Tags
//!
//! Which backing store an id refers to is an enum
//! ([`fetch::SourceOrigin`]) passed alongside the fetch capability, and its
//! tag participates in the cache key. The same logical id fetched through
//! different stores can never collide.
//!
//! ## Pure-Rust Pixel Engine
//!
//! The bundled [`engine::rust_engine::RustEngine`] is built on the `image`
//! crate with EXIF orientation handling — no ImageMagick, no libvips, no
//! system dependencies. Deployments with heavier needs implement
//! [`engine::ImageEngine`] over their tool of choice; the decision layer
//! does not change.
//!
//! ## Constructor Injection
//!
//! [`transform::Transformer`] holds its collaborators as `Arc<dyn …>`
//! handles passed in once at construction. There is no registry and no
//! global state; tests assemble a `Transformer` from mocks the same way
//! production assembles one from real backends.

pub mod cache;
pub mod engine;
pub mod fetch;
pub mod fingerprint;
pub mod geometry;
pub mod options;
pub mod smartcrop;
pub mod transform;
