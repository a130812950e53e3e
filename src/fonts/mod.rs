//! Font lookup and embedding.
//!
//! This module provides the font-mapping service used to find substitute
//! programs for fonts a form names but does not carry, and the embedder that
//! wraps such a program as a PDF font resource.

pub mod embedding;
pub mod font_mapper;
#[cfg(feature = "system-fonts")]
pub mod system_fonts;
pub mod truetype_parser;

pub use embedding::{FontEmbedder, Type0FontEmbedder};
pub use font_mapper::{FontMapper, FontProgram, FontStyleHint, InMemoryFontMapper, NoFontMapper};
#[cfg(feature = "system-fonts")]
pub use system_fonts::SystemFontMapper;
pub use truetype_parser::{TrueTypeError, TrueTypeFont};
