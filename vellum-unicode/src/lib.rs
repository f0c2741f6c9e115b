//! UTF-8 decoding and text-complexity classification.
//!
//! This crate has no knowledge of glyphs, caches, or atlases; it only turns
//! raw bytes into codepoints and classifies them for the shaping pipeline in
//! `vellum-core`.

mod classify;
mod decode;

pub use classify::{has_non_ascii, word_slices, WordSlice};
pub use decode::{decode, decode_all, DecodeStep, REPLACEMENT};
