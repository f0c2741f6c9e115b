//! Generator lifecycle: construction, validation, and arena reset.

use crate::{
    arena::Arena,
    cache::GlyphTable,
    error::Error,
    packer::Packer,
};

/// How the generator resolves cache misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Invalid/unconfigured. [`Generator::new`] rejects this.
    #[default]
    None,
    /// Cache misses pack a slot and rasterize into it on demand.
    LazyAtlas,
}

/// Construction parameters for [`Generator::new`].
pub struct GeneratorParams<'a> {
    /// Caller-owned scratch memory backing every per-call allocation.
    pub frame_memory: &'a mut [u8],
    /// Atlas width in pixels.
    pub cache_size_x: u32,
    /// Atlas height in pixels.
    pub cache_size_y: u32,
    /// Glyph-table group count (slots = `group_count * 16`); must be a
    /// power of two.
    pub group_count: usize,
    pub storage_mode: StorageMode,
}

/// Owns the arena, glyph cache, and atlas packer for one shaping session.
///
/// Not `Sync`; its methods take `&mut self`, so the borrow checker already
/// forbids concurrent calls on one generator the way the single-threaded
/// design requires.
pub struct Generator<'a> {
    pub(crate) arena: Arena<'a>,
    pub(crate) table: GlyphTable,
    pub(crate) packer: Packer,
    storage_mode: StorageMode,
}

impl<'a> Generator<'a> {
    /// Validates `params` and constructs a generator, or an error describing
    /// the first invalid field.
    pub fn new(params: GeneratorParams<'a>) -> Result<Self, Error> {
        if params.frame_memory.is_empty() {
            return Err(Error::null_frame_memory());
        }
        if params.storage_mode == StorageMode::None {
            return Err(Error::no_storage_mode());
        }
        if params.cache_size_x == 0 || params.cache_size_y == 0 {
            return Err(Error::zero_cache_dimensions());
        }

        let needed = GlyphTable::footprint_bytes(params.group_count);
        if params.frame_memory.len() < needed {
            return Err(Error::arena_too_small(needed, params.frame_memory.len()));
        }

        let max_segments = 2 * (params.cache_size_x as usize).max(1);

        Ok(Generator {
            arena: Arena::new(params.frame_memory),
            table: GlyphTable::new(params.group_count),
            packer: Packer::new(params.cache_size_x, params.cache_size_y, max_segments),
            storage_mode: params.storage_mode,
        })
    }

    /// Always `true` for a [`Generator`] returned by [`Generator::new`];
    /// mirrors the source API's `is_valid` check for callers that keep a
    /// sentinel/optional generator around.
    pub fn is_valid(&self) -> bool {
        self.storage_mode != StorageMode::None
    }

    /// Resets the per-frame arena. Any `AnalyzedText`/`ShapedRun` borrowed
    /// from a prior call is invalidated; callers must upload the update
    /// list before calling this.
    pub fn clear_arena(&mut self) {
        self.arena.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_frame_memory() {
        let mut empty: [u8; 0] = [];
        let params = GeneratorParams {
            frame_memory: &mut empty,
            cache_size_x: 64,
            cache_size_y: 64,
            group_count: 4,
            storage_mode: StorageMode::LazyAtlas,
        };
        assert!(Generator::new(params).is_err());
    }

    #[test]
    fn rejects_storage_mode_none() {
        let mut memory = vec![0u8; 4096];
        let params = GeneratorParams {
            frame_memory: &mut memory,
            cache_size_x: 64,
            cache_size_y: 64,
            group_count: 4,
            storage_mode: StorageMode::None,
        };
        assert!(Generator::new(params).is_err());
    }

    #[test]
    fn rejects_zero_cache_dimensions() {
        let mut memory = vec![0u8; 4096];
        let params = GeneratorParams {
            frame_memory: &mut memory,
            cache_size_x: 0,
            cache_size_y: 64,
            group_count: 4,
            storage_mode: StorageMode::LazyAtlas,
        };
        assert!(Generator::new(params).is_err());
    }

    #[test]
    fn rejects_undersized_frame_memory() {
        let mut memory = vec![0u8; 8];
        let params = GeneratorParams {
            frame_memory: &mut memory,
            cache_size_x: 64,
            cache_size_y: 64,
            group_count: 4,
            storage_mode: StorageMode::LazyAtlas,
        };
        assert!(Generator::new(params).is_err());
    }

    #[test]
    fn accepts_valid_params() {
        let mut memory = vec![0u8; 4096];
        let params = GeneratorParams {
            frame_memory: &mut memory,
            cache_size_x: 64,
            cache_size_y: 64,
            group_count: 4,
            storage_mode: StorageMode::LazyAtlas,
        };
        let gen = Generator::new(params).unwrap();
        assert!(gen.is_valid());
    }
}
