//! PPTX (Office Open XML) reader backend for slide style prediction.
//!
//! Parses .pptx files (ZIP archives of XML documents) into `slides_core`
//! domain values: slides, shapes with geometry in points, per-run text
//! styles, and the first slide master's placeholders.

pub mod parser;

pub use parser::{looks_like_pptx, PptxParser};
