//! Wrapping substitute font programs as PDF font resources.
//!
//! A [`FontEmbedder`] turns a [`FontProgram`] into objects in the document
//! and returns the object to store in a resource dictionary. The default
//! [`Type0FontEmbedder`] writes a composite font per PDF spec Section 9.7:
//!
//! ```text
//! Type0 (Identity-H)
//!   └─ CIDFontType2 (CIDToGIDMap /Identity, /W widths)
//!        └─ FontDescriptor
//!             └─ FontFile2 stream (full program, not subset)
//! ```
//!
//! The Type0 font also carries a `/ToUnicode` CMap built from the program's
//! Unicode cmap so text typed into the field stays extractable.

use super::font_mapper::FontProgram;
use super::truetype_parser::TrueTypeFont;
use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::object::{Dictionary, Object};
use std::collections::BTreeMap;

/// Turns a font program into a resource usable from `/DR /Font`.
pub trait FontEmbedder {
    /// Write the font objects into `doc` and return the resource entry.
    fn embed(&self, doc: &mut PdfDocument, program: &FontProgram) -> Result<Object>;
}

/// Embeds TrueType programs as Type0 fonts with Identity-H encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Type0FontEmbedder;

impl Type0FontEmbedder {
    fn base_font_name(font: &TrueTypeFont<'_>, program: &FontProgram) -> String {
        let raw = font
            .postscript_name()
            .or_else(|| font.family_name())
            .unwrap_or_else(|| program.name.clone());
        // PDF names cannot carry whitespace or delimiters unescaped
        raw.chars()
            .filter(|c| !c.is_whitespace() && !"()<>[]{}/%".contains(*c))
            .collect()
    }

    fn widths_array(font: &TrueTypeFont<'_>) -> Vec<Object> {
        let mut w = Vec::new();
        for (first, last, width) in font.width_runs() {
            w.push(Object::Integer(first as i64));
            w.push(Object::Integer(last as i64));
            w.push(Object::Integer(width as i64));
        }
        w
    }
}

/// ToUnicode CMap mapping CIDs (equal to glyph ids under Identity-H) to Unicode.
fn to_unicode_cmap(glyph_to_unicode: &BTreeMap<u16, u32>) -> String {
    let mut cmap = String::new();
    cmap.push_str("/CIDInit /ProcSet findresource begin\n");
    cmap.push_str("12 dict begin\n");
    cmap.push_str("begincmap\n");
    cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
    cmap.push_str("/CMapType 2 def\n");
    cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    let mappings: Vec<(u16, u32)> = glyph_to_unicode.iter().map(|(&gid, &cp)| (gid, cp)).collect();
    // At most 100 entries per bfchar block
    for chunk in mappings.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for &(gid, unicode) in chunk {
            if unicode <= 0xFFFF {
                cmap.push_str(&format!("<{:04X}> <{:04X}>\n", gid, unicode));
            } else {
                let high = ((unicode - 0x10000) >> 10) + 0xD800;
                let low = ((unicode - 0x10000) & 0x3FF) + 0xDC00;
                cmap.push_str(&format!("<{:04X}> <{:04X}{:04X}>\n", gid, high, low));
            }
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\n");
    cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
    cmap.push_str("end\nend\n");
    cmap
}

impl FontEmbedder for Type0FontEmbedder {
    fn embed(&self, doc: &mut PdfDocument, program: &FontProgram) -> Result<Object> {
        let font = TrueTypeFont::parse(&program.data, program.face_index)
            .map_err(|e| Error::Font(format!("{}: {}", program.name, e)))?;
        let base_font = Self::base_font_name(&font, program);

        let mut file_dict = Dictionary::new();
        file_dict.insert("Length".to_string(), Object::Integer(program.data.len() as i64));
        file_dict.insert("Length1".to_string(), Object::Integer(program.data.len() as i64));
        let font_file_ref = doc.add_object(Object::Stream {
            dict: file_dict,
            data: program.data.clone(),
        });

        let (x_min, y_min, x_max, y_max) = font.bbox();
        let mut descriptor = Dictionary::new();
        descriptor.insert("Type".to_string(), Object::name("FontDescriptor"));
        descriptor.insert("FontName".to_string(), Object::name(base_font.clone()));
        descriptor.insert("Flags".to_string(), Object::Integer(font.font_flags() as i64));
        descriptor.insert(
            "FontBBox".to_string(),
            Object::Array(vec![
                Object::Integer(font.to_pdf_units(x_min)),
                Object::Integer(font.to_pdf_units(y_min)),
                Object::Integer(font.to_pdf_units(x_max)),
                Object::Integer(font.to_pdf_units(y_max)),
            ]),
        );
        descriptor.insert(
            "ItalicAngle".to_string(),
            Object::Integer(if font.is_italic() { -12 } else { 0 }),
        );
        descriptor.insert("Ascent".to_string(), Object::Integer(font.to_pdf_units(font.ascender())));
        descriptor.insert(
            "Descent".to_string(),
            Object::Integer(font.to_pdf_units(font.descender())),
        );
        descriptor.insert(
            "CapHeight".to_string(),
            Object::Integer(font.to_pdf_units(font.cap_height().unwrap_or(font.ascender()))),
        );
        descriptor.insert("StemV".to_string(), Object::Integer(font.stem_v() as i64));
        descriptor.insert("FontFile2".to_string(), Object::Reference(font_file_ref));
        let descriptor_ref = doc.add_object(Object::Dictionary(descriptor));

        let mut system_info = Dictionary::new();
        system_info.insert("Registry".to_string(), Object::text("Adobe"));
        system_info.insert("Ordering".to_string(), Object::text("Identity"));
        system_info.insert("Supplement".to_string(), Object::Integer(0));

        let mut cid_font = Dictionary::new();
        cid_font.insert("Type".to_string(), Object::name("Font"));
        cid_font.insert("Subtype".to_string(), Object::name("CIDFontType2"));
        cid_font.insert("BaseFont".to_string(), Object::name(base_font.clone()));
        cid_font.insert("CIDSystemInfo".to_string(), Object::Dictionary(system_info));
        cid_font.insert("FontDescriptor".to_string(), Object::Reference(descriptor_ref));
        cid_font.insert("CIDToGIDMap".to_string(), Object::name("Identity"));
        cid_font.insert("DW".to_string(), Object::Integer(1000));
        cid_font.insert("W".to_string(), Object::Array(Self::widths_array(&font)));
        let cid_font_ref = doc.add_object(Object::Dictionary(cid_font));

        let cmap = to_unicode_cmap(&font.glyph_to_unicode());
        let mut cmap_dict = Dictionary::new();
        cmap_dict.insert("Length".to_string(), Object::Integer(cmap.len() as i64));
        let to_unicode_ref = doc.add_object(Object::Stream {
            dict: cmap_dict,
            data: bytes::Bytes::from(cmap.into_bytes()),
        });

        let mut type0 = Dictionary::new();
        type0.insert("Type".to_string(), Object::name("Font"));
        type0.insert("Subtype".to_string(), Object::name("Type0"));
        type0.insert("BaseFont".to_string(), Object::name(base_font));
        type0.insert("Encoding".to_string(), Object::name("Identity-H"));
        type0.insert(
            "DescendantFonts".to_string(),
            Object::Array(vec![Object::Reference(cid_font_ref)]),
        );
        type0.insert("ToUnicode".to_string(), Object::Reference(to_unicode_ref));
        let type0_ref = doc.add_object(Object::Dictionary(type0));

        log::debug!(
            "embedded {} ({} bytes, {} glyphs) as Type0 font {}",
            program.name,
            program.data.len(),
            font.num_glyphs(),
            type0_ref
        );

        Ok(Object::Reference(type0_ref))
    }
}
