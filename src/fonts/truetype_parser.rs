//! TrueType/OpenType font parser for PDF embedding.
//!
//! This module wraps the `ttf-parser` crate to extract the metrics needed
//! to describe a substitute font program in a PDF FontDescriptor.
//!
//! # Font Embedding in PDF
//!
//! Per PDF spec Section 9.6-9.8, embedded fonts require:
//! - FontDescriptor with metrics (ascender, descender, cap height, etc.)
//! - Font program data (FontFile2 for TrueType)
//! - CIDFont for Unicode (Type 0 composite fonts with Identity-H encoding)

use std::collections::BTreeMap;
use ttf_parser::{Face, GlyphId};

/// Error types for TrueType font parsing.
#[derive(Debug, thiserror::Error)]
pub enum TrueTypeError {
    /// Failed to parse font file
    #[error("Failed to parse font file: {0}")]
    ParseError(String),

    /// Font file is empty or invalid
    #[error("Font file is empty or invalid")]
    EmptyFont,
}

/// Result type for TrueType operations.
pub type TrueTypeResult<T> = Result<T, TrueTypeError>;

/// Parsed TrueType font data for PDF embedding.
#[derive(Debug)]
pub struct TrueTypeFont<'a> {
    /// The parsed font face
    face: Face<'a>,
}

impl<'a> TrueTypeFont<'a> {
    /// Parse a TrueType/OpenType font from raw data.
    ///
    /// # Arguments
    /// * `data` - Raw font file bytes (TTF or OTF)
    /// * `index` - Face index inside a collection (0 for plain files)
    pub fn parse(data: &'a [u8], index: u32) -> TrueTypeResult<Self> {
        if data.is_empty() {
            return Err(TrueTypeError::EmptyFont);
        }

        let face =
            Face::parse(data, index).map_err(|e| TrueTypeError::ParseError(e.to_string()))?;

        Ok(Self { face })
    }

    /// Get the font's PostScript name.
    pub fn postscript_name(&self) -> Option<String> {
        self.face
            .names()
            .into_iter()
            .find(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|name| name.to_string())
    }

    /// Get the font family name.
    pub fn family_name(&self) -> Option<String> {
        self.face
            .names()
            .into_iter()
            .find(|name| name.name_id == ttf_parser::name_id::FAMILY)
            .and_then(|name| name.to_string())
    }

    /// Get units per em for this font.
    pub fn units_per_em(&self) -> u16 {
        self.face.units_per_em()
    }

    /// Get the ascender in font units.
    pub fn ascender(&self) -> i16 {
        self.face.ascender()
    }

    /// Get the descender in font units (negative value).
    pub fn descender(&self) -> i16 {
        self.face.descender()
    }

    /// Get the cap height in font units.
    pub fn cap_height(&self) -> Option<i16> {
        self.face.capital_height()
    }

    /// Check if the font is bold.
    pub fn is_bold(&self) -> bool {
        self.face.is_bold()
    }

    /// Check if the font is italic.
    pub fn is_italic(&self) -> bool {
        self.face.is_italic()
    }

    /// Get the font bounding box.
    pub fn bbox(&self) -> (i16, i16, i16, i16) {
        let bbox = self.face.global_bounding_box();
        (bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max)
    }

    /// Get the number of glyphs in the font.
    pub fn num_glyphs(&self) -> u16 {
        self.face.number_of_glyphs()
    }

    /// Glyph advance in 1/1000 em units.
    pub fn glyph_width(&self, glyph_id: u16) -> u32 {
        let advance = self.face.glyph_hor_advance(GlyphId(glyph_id)).unwrap_or(0);
        scale_advance(advance, self.units_per_em())
    }

    /// First Unicode code point mapped to each glyph by the font's Unicode
    /// cmap subtables. Glyph 0 (`.notdef`) is never included.
    pub fn glyph_to_unicode(&self) -> BTreeMap<u16, u32> {
        let mut map = BTreeMap::new();
        let Some(cmap) = self.face.tables().cmap else {
            return map;
        };
        for subtable in cmap.subtables {
            if !subtable.is_unicode() {
                continue;
            }
            subtable.codepoints(|codepoint| {
                if let Some(gid) = subtable.glyph_index(codepoint) {
                    if gid.0 != 0 {
                        map.entry(gid.0).or_insert(codepoint);
                    }
                }
            });
        }
        map
    }

    /// Scale a value in font units to 1/1000 em.
    pub fn to_pdf_units(&self, value: i16) -> i64 {
        value as i64 * 1000 / self.units_per_em().max(1) as i64
    }

    /// Calculate StemV (vertical stem width) - estimated from font weight.
    ///
    /// This is a heuristic since TrueType doesn't store StemV directly.
    pub fn stem_v(&self) -> i16 {
        if self.is_bold() {
            140
        } else {
            80
        }
    }

    /// Get font flags for PDF FontDescriptor.
    ///
    /// Returns flags per PDF spec Table 123:
    /// - Bit 1: FixedPitch
    /// - Bit 6: Nonsymbolic (standard Latin text font)
    /// - Bit 7: Italic
    pub fn font_flags(&self) -> u32 {
        let mut flags = 0u32;

        if self.face.is_monospaced() {
            flags |= 1 << 0;
        }

        // Most TrueType fonts are nonsymbolic
        flags |= 1 << 5;

        if self.is_italic() {
            flags |= 1 << 6;
        }

        flags
    }

    /// Glyph widths as `(first_gid, last_gid, width)` runs of equal advance.
    ///
    /// For Identity-H encoding with an Identity CIDToGIDMap, CID = GID, so
    /// these runs translate directly into the CIDFont `/W` array.
    pub fn width_runs(&self) -> Vec<(u16, u16, u32)> {
        let mut runs: Vec<(u16, u16, u32)> = Vec::new();
        for gid in 0..self.num_glyphs() {
            let width = self.glyph_width(gid);
            match runs.last_mut() {
                Some((_, last, w)) if *w == width && *last + 1 == gid => *last = gid,
                _ => runs.push((gid, gid, width)),
            }
        }
        runs
    }
}

/// Scale an advance in font units to 1/1000 em.
///
/// Fonts with fewer than 1000 units per em can exceed `u16::MAX`.
fn scale_advance(advance: u16, units_per_em: u16) -> u32 {
    advance as u32 * 1000 / units_per_em.max(1) as u32
}
