//! Text analysis and the shape-and-fill orchestrator.

use bitflags::bitflags;
use vellum_unicode::WordSlice;

use crate::{
    backend::{FontBackend, FontBinding, RasterBuffer},
    cache::{Layout, Rect},
    fingerprint::fingerprint,
    generator::Generator,
};

bitflags! {
    /// Options controlling [`Generator::analyze_text`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AnalyzeFlags: u32 {
        /// Populate [`AnalyzedText::word_slices`].
        const GENERATE_WORD_SLICES = 0b01;
        /// Skip the complex-text scan and assume simple (ASCII) shaping.
        const SKIP_COMPLEX_CHECK = 0b10;
    }
}

/// Result of [`Generator::analyze_text`]: decoded codepoints plus triage.
pub struct AnalyzedText<'a> {
    pub codepoints: &'a [u32],
    pub is_complex: bool,
    pub word_slices: &'a [WordSlice],
}

/// One glyph in a shaped run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapedGlyph {
    pub glyph_index: u16,
    pub source: Rect,
    pub layout: Layout,
    pub cluster_start: usize,
    pub cluster_count: usize,
}

/// A newly-rasterized tile the caller must upload to its atlas texture.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterizedTile<'a> {
    pub source: Rect,
    pub buffer: RasterBuffer<'a>,
}

/// Output of [`Generator::shape_and_fill`]. Both slices are arena-allocated,
/// valid until the next [`Generator::clear_arena`].
pub struct ShapedRun<'a> {
    pub shaped_glyphs: &'a [ShapedGlyph],
    pub update_list: &'a [RasterizedTile<'a>],
}

impl<'a> ShapedRun<'a> {
    fn empty() -> Self {
        ShapedRun { shaped_glyphs: &[], update_list: &[] }
    }
}

impl<'g> Generator<'g> {
    /// Decodes `bytes`, triaging for complex text and (optionally) word
    /// boundaries. Arena-allocated; valid until the next [`Generator::clear_arena`].
    ///
    /// Returns `AnalyzedText<'g>` — tied to the generator's arena lifetime,
    /// not to this call's `&mut self` borrow — so a caller can still use
    /// `self.table`/`self.packer` afterward without the borrow checker
    /// treating the whole generator as borrowed for as long as the result
    /// is alive.
    pub fn analyze_text(&mut self, bytes: &[u8], flags: AnalyzeFlags) -> AnalyzedText<'g> {
        let codepoints: &mut [u32] =
            self.arena.push_slice(bytes.len()).unwrap_or(&mut []);
        let count = vellum_unicode::decode_all(bytes, codepoints);
        let codepoints = &codepoints[..count];

        let is_complex = if flags.contains(AnalyzeFlags::SKIP_COMPLEX_CHECK) {
            false
        } else {
            vellum_unicode::has_non_ascii(bytes)
        };

        let word_slices: &[WordSlice] = if flags.contains(AnalyzeFlags::GENERATE_WORD_SLICES) {
            let buf: &mut [WordSlice] =
                self.arena.push_slice(codepoints.len()).unwrap_or(&mut []);
            let n = vellum_unicode::word_slices(codepoints, buf);
            &buf[..n]
        } else {
            &[]
        };

        AnalyzedText { codepoints, is_complex, word_slices }
    }

    /// Runs the full shape-and-fill pipeline: decode, triage, cache-probe,
    /// rasterize-on-miss, pack, and emit. See the per-call error taxonomy
    /// for how each failure mode degrades the returned run instead of
    /// aborting.
    pub fn shape_and_fill<B: FontBackend>(
        &mut self,
        bytes: &[u8],
        flags: AnalyzeFlags,
        font: FontBinding,
        em_size: f32,
        backend: &mut B,
    ) -> ShapedRun<'g> {
        let analyzed = self.analyze_text(bytes, flags);

        if analyzed.is_complex {
            return ShapedRun::empty();
        }

        let codepoints = analyzed.codepoints;
        let owner_key = font.0;

        let shaped_glyphs: &mut [ShapedGlyph] =
            self.arena.push_slice(codepoints.len()).unwrap_or(&mut []);
        let update_list: &mut [RasterizedTile<'g>] =
            self.arena.push_slice(codepoints.len()).unwrap_or(&mut []);
        let mut tile_count = 0;

        for (i, &cp) in codepoints.iter().enumerate() {
            let fp = fingerprint(std::slice::from_ref(&cp), owner_key, em_size);
            let state = self.table.find_or_allocate(fp);

            let (glyph_index, source, layout) = if state.is_rasterized {
                (state.glyph_index, state.source, state.layout)
            } else {
                let info = backend.find_glyph(font, cp, em_size);
                let layout = Layout {
                    advance: info.advance,
                    offset_x: info.offset_x,
                    offset_y: info.offset_y,
                };

                if !info.is_found() {
                    (state.glyph_index, Rect::default(), layout)
                } else {
                    let pr = self.packer.pack(info.size_x.ceil() as u32, info.size_y.ceil() as u32);
                    if !pr.was_packed {
                        (state.glyph_index, Rect::default(), layout)
                    } else {
                        let buffer = backend.rasterize(
                            font,
                            info.glyph_index,
                            info.advance,
                            em_size,
                            &mut self.arena,
                        );

                        if buffer.is_empty() {
                            (state.glyph_index, Rect::default(), layout)
                        } else {
                            let source = Rect {
                                left: pr.x,
                                top: pr.y,
                                right: pr.x + pr.width,
                                bottom: pr.y + pr.height,
                            };
                            self.table.update(state.id, info.glyph_index, layout, source, true);
                            update_list[tile_count] = RasterizedTile { source, buffer };
                            tile_count += 1;
                            (info.glyph_index, source, layout)
                        }
                    }
                }
            };

            shaped_glyphs[i] = ShapedGlyph {
                glyph_index,
                source,
                layout,
                cluster_start: i,
                cluster_count: 1,
            };
        }

        ShapedRun { shaped_glyphs, update_list: &update_list[..tile_count] }
    }
}

/// Sums the pixel advance of the glyphs in `shaped_glyphs` whose cluster
/// range overlaps `word`.
pub fn advance_word(shaped_glyphs: &[ShapedGlyph], word: WordSlice) -> f32 {
    let word_end = word.start + word.length;
    shaped_glyphs
        .iter()
        .filter(|g| g.cluster_start < word_end && g.cluster_start + g.cluster_count > word.start)
        .map(|g| g.layout.advance)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generator::GeneratorParams, StorageMode};

    struct StubBackend;

    impl FontBackend for StubBackend {
        fn find_glyph(&mut self, _font: FontBinding, codepoint: u32, _em_size: f32) -> crate::backend::GlyphInfo {
            crate::backend::GlyphInfo {
                glyph_index: codepoint as u16,
                advance: 8.0,
                offset_x: 0.0,
                offset_y: 0.0,
                size_x: 8.0,
                size_y: 16.0,
            }
        }

        fn rasterize<'a>(
            &mut self,
            _font: FontBinding,
            _glyph_index: u16,
            _advance: f32,
            _em_size: f32,
            arena: &mut crate::arena::Arena<'a>,
        ) -> RasterBuffer<'a> {
            let data = arena.push_slice::<u8>(8 * 16).unwrap_or(&mut []);
            RasterBuffer { data, stride: 8, width: 8, height: 16, bytes_per_pixel: 1 }
        }

        fn load_system_font(&mut self, _family: &str, _em_size: f32, _style_flags: u32) -> FontBinding {
            FontBinding(0)
        }
    }

    fn generator(memory: &mut [u8]) -> Generator<'_> {
        let params = GeneratorParams {
            frame_memory: memory,
            cache_size_x: 64,
            cache_size_y: 64,
            group_count: 4,
            storage_mode: StorageMode::LazyAtlas,
        };
        Generator::new(params).unwrap()
    }

    #[test]
    fn empty_input_yields_empty_run() {
        let mut memory = vec![0u8; 4096];
        let mut gen = generator(&mut memory);
        let mut backend = StubBackend;
        let run = gen.shape_and_fill(b"", AnalyzeFlags::empty(), FontBinding(0), 16.0, &mut backend);
        assert!(run.shaped_glyphs.is_empty());
        assert!(run.update_list.is_empty());
    }

    #[test]
    fn single_ascii_glyph_produces_one_tile() {
        let mut memory = vec![0u8; 4096];
        let mut gen = generator(&mut memory);
        let mut backend = StubBackend;
        let run = gen.shape_and_fill(b"A", AnalyzeFlags::empty(), FontBinding(0), 16.0, &mut backend);
        assert_eq!(run.shaped_glyphs.len(), 1);
        assert_eq!(run.update_list.len(), 1);
    }

    #[test]
    fn second_call_for_same_glyph_has_no_tiles() {
        let mut memory = vec![0u8; 4096];
        let mut gen = generator(&mut memory);
        let mut backend = StubBackend;
        gen.shape_and_fill(b"A", AnalyzeFlags::empty(), FontBinding(0), 16.0, &mut backend);
        gen.clear_arena();
        let run = gen.shape_and_fill(b"A", AnalyzeFlags::empty(), FontBinding(0), 16.0, &mut backend);
        assert_eq!(run.shaped_glyphs.len(), 1);
        assert!(run.update_list.is_empty());
    }

    #[test]
    fn repeated_glyph_in_one_call_shares_one_tile() {
        let mut memory = vec![0u8; 4096];
        let mut gen = generator(&mut memory);
        let mut backend = StubBackend;
        let run = gen.shape_and_fill(b"aaaa", AnalyzeFlags::empty(), FontBinding(0), 16.0, &mut backend);
        assert_eq!(run.shaped_glyphs.len(), 4);
        assert_eq!(run.update_list.len(), 1);
        let first = run.shaped_glyphs[0];
        assert!(run.shaped_glyphs.iter().all(|g| g.glyph_index == first.glyph_index));
    }

    #[test]
    fn complex_text_short_circuits() {
        let mut memory = vec![0u8; 4096];
        let mut gen = generator(&mut memory);
        let mut backend = StubBackend;
        let run = gen.shape_and_fill("héllo".as_bytes(), AnalyzeFlags::empty(), FontBinding(0), 16.0, &mut backend);
        assert!(run.shaped_glyphs.is_empty());
    }

    #[test]
    fn advance_word_sums_matching_glyphs() {
        let glyphs = vec![
            ShapedGlyph { cluster_start: 0, cluster_count: 1, layout: Layout { advance: 8.0, ..Default::default() }, ..Default::default() },
            ShapedGlyph { cluster_start: 1, cluster_count: 1, layout: Layout { advance: 8.0, ..Default::default() }, ..Default::default() },
            ShapedGlyph { cluster_start: 2, cluster_count: 1, layout: Layout { advance: 8.0, ..Default::default() }, ..Default::default() },
        ];
        let total = advance_word(&glyphs, WordSlice { start: 0, length: 2 });
        assert_eq!(total, 16.0);
    }
}
