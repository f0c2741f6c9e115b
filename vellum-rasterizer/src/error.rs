//! Rasterizer-local error type.
//!
//! These never cross the `FontBackend` boundary as `Result::Err` — per the
//! orchestrator's infallible-backend contract, failures here are logged via
//! `tracing` and turned into zero-valued [`vellum_core::GlyphInfo`]/
//! [`vellum_core::RasterBuffer`] returns instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no font matching family {family:?} could be found on this system")]
    FontNotFound { family: String },

    #[error("font {family:?} has no glyph for codepoint U+{codepoint:04X}")]
    GlyphNotFound { family: String, codepoint: u32 },

    #[error("swash failed to rasterize glyph {glyph_index} in {family:?}")]
    RasterizationFailed { family: String, glyph_index: u16 },
}
