//! `FontBackend` implementation using `fontdb` for system font discovery
//! and `swash` for metrics and rasterization.

use fontdb::{Database, Family, Query, Source};
use swash::{
    scale::{Render, ScaleContext, Source as ScaleSource},
    zeno::Format,
    FontRef,
};
use vellum_core::{arena::Arena, FontBackend, FontBinding, GlyphInfo, RasterBuffer};

use crate::error::Error;

/// Bold style bit understood by [`FontBackend::load_system_font`]'s
/// `style_flags`; matches the source implementation's DirectWrite-style
/// weight/slant flags, collapsed to the two bits this backend supports.
pub const STYLE_BOLD: u32 = 0b01;
/// Italic style bit, see [`STYLE_BOLD`].
pub const STYLE_ITALIC: u32 = 0b10;

struct LoadedFont {
    data: std::sync::Arc<Vec<u8>>,
    face_index: u32,
    em_size: f32,
    family: String,
}

/// Native font backend. Owns a `fontdb` database (populated from system
/// font directories) and a `swash` scale context reused across calls.
pub struct NativeRasterizer {
    db: Database,
    scale_ctx: ScaleContext,
    fonts: Vec<LoadedFont>,
}

impl NativeRasterizer {
    /// Builds a backend with the system's fonts loaded via `fontdb`'s
    /// platform font-directory discovery.
    pub fn new() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        NativeRasterizer { db, scale_ctx: ScaleContext::new(), fonts: Vec::new() }
    }

    fn font(&self, binding: FontBinding) -> Option<&LoadedFont> {
        self.fonts.get(binding.0 as usize)
    }

    fn font_ref<'f>(loaded: &'f LoadedFont) -> Option<FontRef<'f>> {
        FontRef::from_index(&loaded.data, loaded.face_index as usize)
    }
}

impl Default for NativeRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBackend for NativeRasterizer {
    fn load_system_font(&mut self, family: &str, em_size: f32, style_flags: u32) -> FontBinding {
        let query = Query {
            families: &[Family::Name(family)],
            weight: if style_flags & STYLE_BOLD != 0 {
                fontdb::Weight::BOLD
            } else {
                fontdb::Weight::NORMAL
            },
            style: if style_flags & STYLE_ITALIC != 0 {
                fontdb::Style::Italic
            } else {
                fontdb::Style::Normal
            },
            ..Query::default()
        };

        let Some(id) = self.db.query(&query) else {
            let err = Error::FontNotFound { family: family.to_string() };
            tracing::warn!(family, %err, "no system font matched query");
            return FontBinding(u32::MAX);
        };

        let Some(face) = self.db.face(id) else {
            return FontBinding(u32::MAX);
        };

        let data = match &face.source {
            Source::Binary(b) => b.as_ref().as_ref().to_vec(),
            Source::File(path) => match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!(family, %err, "failed reading font file");
                    return FontBinding(u32::MAX);
                },
            },
            Source::SharedFile(_, b) => b.as_ref().as_ref().to_vec(),
        };
        let face_index = face.index;

        let binding = FontBinding(self.fonts.len() as u32);
        self.fonts.push(LoadedFont {
            data: std::sync::Arc::new(data),
            face_index,
            em_size,
            family: family.to_string(),
        });
        binding
    }

    fn find_glyph(&mut self, font: FontBinding, codepoint: u32, em_size: f32) -> GlyphInfo {
        let Some(loaded) = self.font(font) else {
            return GlyphInfo::not_found();
        };
        let Some(ch) = char::from_u32(codepoint) else {
            return GlyphInfo::not_found();
        };
        let Some(font_ref) = Self::font_ref(loaded) else {
            return GlyphInfo::not_found();
        };

        let glyph_id = font_ref.charmap().map(ch);
        if glyph_id == 0 {
            let err = Error::GlyphNotFound { family: loaded.family.clone(), codepoint };
            tracing::warn!(family = %loaded.family, codepoint, %err, "no glyph for codepoint");
            return GlyphInfo::not_found();
        }

        let metrics = font_ref.glyph_metrics(&[]).scale(em_size);
        let advance = metrics.advance_width(glyph_id);
        let bounds = metrics.bounds(glyph_id);

        GlyphInfo {
            glyph_index: glyph_id,
            advance,
            offset_x: bounds.x,
            offset_y: bounds.y,
            size_x: bounds.w.max(1.0),
            size_y: bounds.h.max(1.0),
        }
    }

    fn rasterize<'a>(
        &mut self,
        font: FontBinding,
        glyph_index: u16,
        _advance: f32,
        em_size: f32,
        arena: &mut Arena<'a>,
    ) -> RasterBuffer<'a> {
        let Some(loaded) = self.font(font) else {
            tracing::warn!(?font, "rasterize called with an unknown font binding");
            return RasterBuffer::empty();
        };
        let Some(font_ref) = Self::font_ref(loaded) else {
            tracing::warn!(family = %loaded.family, "failed parsing loaded font data");
            return RasterBuffer::empty();
        };

        let mut scaler = self
            .scale_ctx
            .builder(font_ref)
            .size(em_size.max(loaded.em_size))
            .hint(false)
            .build();

        let Some(image) = Render::new(&[ScaleSource::Outline])
            .format(Format::Alpha)
            .render(&mut scaler, glyph_index)
        else {
            let err = Error::RasterizationFailed { family: loaded.family.clone(), glyph_index };
            tracing::warn!(family = %loaded.family, glyph_index, %err, "swash failed to rasterize glyph");
            return RasterBuffer::empty();
        };

        let width = image.placement.width;
        let height = image.placement.height;
        if width == 0 || height == 0 {
            tracing::warn!(
                family = %loaded.family,
                glyph_index,
                "rasterized glyph has zero width or height"
            );
            return RasterBuffer::empty();
        }

        let Some(data) = arena.push_slice::<u8>((width * height) as usize) else {
            return RasterBuffer::empty();
        };
        data.copy_from_slice(&image.data);

        RasterBuffer { data, stride: width as usize, width, height, bytes_per_pixel: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_family_returns_sentinel_binding() {
        let mut backend = NativeRasterizer::new();
        let binding = backend.load_system_font("ThisFontDoesNotExist123", 16.0, 0);
        assert_eq!(binding, FontBinding(u32::MAX));
    }

    #[test]
    fn find_glyph_on_sentinel_binding_is_not_found() {
        let mut backend = NativeRasterizer::new();
        let info = backend.find_glyph(FontBinding(u32::MAX), 'A' as u32, 16.0);
        assert!(!info.is_found());
    }
}
