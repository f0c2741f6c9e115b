//! The `FontBackend` boundary.
//!
//! A backend is the platform capability that turns codepoints into glyph
//! metrics and glyph metrics into rasterized alpha tiles. The source
//! implementation this design is based on used Windows DirectWrite; this
//! workspace's optional native backend (`vellum-rasterizer`) uses `fontdb`
//! for font discovery and `swash` for metrics and rasterization. The
//! contract here is infallible by construction: failures surface as
//! zero-valued outputs, which the orchestrator treats as `BackendFailure`.

use crate::{arena::Arena, shape::RasterizedTile};

/// Em-scaled glyph metrics returned by [`FontBackend::find_glyph`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphInfo {
    pub glyph_index: u16,
    pub advance: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub size_x: f32,
    pub size_y: f32,
}

impl GlyphInfo {
    /// A backend returns this when the codepoint has no glyph in the font.
    pub fn not_found() -> Self {
        GlyphInfo::default()
    }

    pub fn is_found(&self) -> bool {
        self.size_x > 0.0 && self.size_y > 0.0
    }
}

/// A rasterized alpha (or RGBA) tile, arena-allocated by the backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterBuffer<'a> {
    pub data: &'a [u8],
    pub stride: usize,
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u8,
}

impl<'a> RasterBuffer<'a> {
    /// A backend returns this when rasterization fails.
    pub fn empty() -> Self {
        RasterBuffer { data: &[], stride: 0, width: 0, height: 0, bytes_per_pixel: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A handle identifying a loaded (font, size) binding.
///
/// Stands in for the fingerprint's `owner_key`: a small integer rather than
/// a raw font-handle pointer, since safe Rust exposes no stable address for
/// backend-internal font state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontBinding(pub u32);

/// The capability the orchestrator depends on to resolve glyph identity and
/// pixels. Implementers own font discovery, caching of font handles, and
/// all platform-specific rasterization.
pub trait FontBackend {
    /// Resolves `codepoint` at `em_size` under `font` to glyph metrics.
    /// Returns [`GlyphInfo::not_found`] if the font has no glyph for it.
    fn find_glyph(&mut self, font: FontBinding, codepoint: u32, em_size: f32) -> GlyphInfo;

    /// Rasterizes `glyph_index` into a tile allocated from `arena`. Returns
    /// [`RasterBuffer::empty`] on failure.
    fn rasterize<'a>(
        &mut self,
        font: FontBinding,
        glyph_index: u16,
        advance: f32,
        em_size: f32,
        arena: &mut Arena<'a>,
    ) -> RasterBuffer<'a>;

    /// Loads a system font by family name at `em_size`, returning a binding
    /// usable with [`FontBackend::find_glyph`] and
    /// [`FontBackend::rasterize`]. Backend-specific style bits (e.g. bold,
    /// italic) are passed through `style_flags` uninterpreted by the core.
    fn load_system_font(&mut self, family: &str, em_size: f32, style_flags: u32) -> FontBinding;
}

/// The capability a renderer implements to receive newly-rasterized tiles.
///
/// The orchestrator never touches GPU state itself; [`Generator::shape_and_fill`](crate::generator::Generator::shape_and_fill)
/// hands its `update_list` to the caller, who drives one [`AtlasSink::upload_tile`]
/// call per tile before presenting the frame.
pub trait AtlasSink {
    /// Uploads `tile.buffer` into the atlas texture at `tile.source`'s
    /// top-left corner. Each byte of `tile.buffer.data` is glyph coverage;
    /// implementers may expand it to RGBA white-with-alpha before upload.
    fn upload_tile(&mut self, tile: RasterizedTile<'_>);
}
