//! Construction-time error type.
//!
//! Per-call failures (arena exhaustion, backend failure, atlas-full,
//! unsupported complex text, malformed UTF-8) are not represented here: they
//! are data-level outcomes carried on [`crate::shape::ShapedRun`] and
//! [`crate::shape::AnalyzedText`], never panics or propagated `Result`s.

use thiserror::Error;

/// Failure constructing a [`crate::generator::Generator`].
#[derive(Error, Debug)]
pub enum Error {
    /// One of [`GeneratorParams`](crate::generator::GeneratorParams)'s fields
    /// failed construction-time validation.
    #[error("invalid generator params: {0}")]
    InvalidGeneratorParams(String),
}

impl Error {
    pub(crate) fn null_frame_memory() -> Self {
        Error::InvalidGeneratorParams("frame_memory must not be null".into())
    }

    pub(crate) fn no_storage_mode() -> Self {
        Error::InvalidGeneratorParams("storage mode must not be StorageMode::None".into())
    }

    pub(crate) fn zero_cache_dimensions() -> Self {
        Error::InvalidGeneratorParams("cache_size_x and cache_size_y must be nonzero".into())
    }

    pub(crate) fn arena_too_small(needed: usize, available: usize) -> Self {
        Error::InvalidGeneratorParams(format!(
            "frame_memory_budget ({available}) is too small to hold the glyph cache and \
             packer (needs at least {needed})"
        ))
    }
}
