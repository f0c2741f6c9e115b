//! Native `FontBackend` implementation for `vellum-core`.
//!
//! Font discovery goes through `fontdb`'s system font directories; glyph
//! metrics and rasterization go through `swash`. Unlike the hard core, this
//! crate instruments failures with `tracing` — missing fonts and failed
//! rasterization are common in the field and worth a log line, whereas the
//! core's per-call outcomes are data, not diagnostics.

mod backend;
mod error;

pub use backend::{NativeRasterizer, STYLE_BOLD, STYLE_ITALIC};
pub use error::Error;
