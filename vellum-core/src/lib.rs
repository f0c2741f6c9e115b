//! Arena-backed text shaping and glyph-atlas caching core.
//!
//! This crate decodes UTF-8 text, identifies glyphs by a 128-bit
//! fingerprint, caches rasterized glyph tiles in a fixed-capacity
//! SIMD-probed table with LRU eviction, and packs newly-rasterized tiles
//! into a 2D atlas with a skyline allocator. Rasterization itself is
//! delegated to a [`FontBackend`] implementation — [`vellum-rasterizer`]
//! provides one backed by `fontdb` and `swash`.
//!
//! Every per-call allocation is served from a caller-provided arena; there
//! is no background thread, no async, and no process-wide state beyond that
//! buffer.

pub mod arena;
pub mod backend;
pub mod cache;
pub mod error;
pub mod fingerprint;
pub mod generator;
pub mod packer;
pub mod shape;

pub use backend::{AtlasSink, FontBackend, FontBinding, GlyphInfo, RasterBuffer};
pub use cache::{Layout, Rect};
pub use error::Error;
pub use generator::{Generator, GeneratorParams, StorageMode};
pub use shape::{advance_word, AnalyzeFlags, AnalyzedText, RasterizedTile, ShapedGlyph, ShapedRun};

/// Loads a system font by family name at `em_size` through `backend`,
/// returning a binding usable with [`Generator::analyze_text`]'s sibling
/// shaping calls. `style_flags` is passed through to the backend
/// uninterpreted.
pub fn load_system_font<B: FontBackend>(
    backend: &mut B,
    family: &str,
    em_size: f32,
    style_flags: u32,
) -> FontBinding {
    backend.load_system_font(family, em_size, style_flags)
}
