//! Font mapping service.
//!
//! When a form field's default appearance names a font that the form's
//! resources don't provide, a [`FontMapper`] is asked for a substitute font
//! program. Mappers are injected so that tests can use deterministic fakes
//! and applications can plug in their own font stores.
//!
//! Form producers commonly use short resource names (`/Helv`, `/TiRo`,
//! `/Cour`, `/ZaDb`) or the standard 14 PostScript names. Both mappers in
//! this crate first try the name as given and then walk the list returned by
//! [`substitute_names`].

use crate::error::Result;
use phf::phf_map;
use std::collections::HashMap;
use std::path::Path;

/// A font program returned by a [`FontMapper`].
#[derive(Debug, Clone, PartialEq)]
pub struct FontProgram {
    /// Name the program was found under (PostScript or family name)
    pub name: String,
    /// Raw TrueType/OpenType data
    pub data: bytes::Bytes,
    /// Face index inside a font collection
    pub face_index: u32,
}

impl FontProgram {
    /// Wrap raw font data.
    pub fn new(name: impl Into<String>, data: impl Into<bytes::Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            face_index: 0,
        }
    }

    /// Read a font file from disk.
    pub fn from_file(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::new(name, data))
    }
}

/// Style requested alongside a font name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontStyleHint {
    /// Bold weight wanted
    pub bold: bool,
    /// Italic or oblique wanted
    pub italic: bool,
}

impl FontStyleHint {
    /// Derive a style hint from style words in a font name.
    ///
    /// Returns `None` for names that carry no style information, e.g.
    /// `Helv` or `Times-Roman`.
    pub fn from_font_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let hint = Self {
            bold: lower.contains("bold") || lower.contains("black") || lower.contains("heavy"),
            italic: lower.contains("italic") || lower.contains("oblique"),
        };
        if hint.bold || hint.italic {
            Some(hint)
        } else {
            None
        }
    }
}

/// Lookup service for substitute font programs.
pub trait FontMapper {
    /// Find a font program for `name`, optionally honoring a style hint.
    fn lookup(&self, name: &str, style: Option<FontStyleHint>) -> Option<FontProgram>;
}

impl<M: FontMapper + ?Sized> FontMapper for &M {
    fn lookup(&self, name: &str, style: Option<FontStyleHint>) -> Option<FontProgram> {
        (**self).lookup(name, style)
    }
}

/// A mapper that never finds anything.
///
/// Useful when a repair should import widget fonts but never embed
/// substitutes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFontMapper;

impl FontMapper for NoFontMapper {
    fn lookup(&self, _name: &str, _style: Option<FontStyleHint>) -> Option<FontProgram> {
        None
    }
}

/// Short and alias names mapped to their standard 14 PostScript name.
static STANDARD_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "Helv" => "Helvetica",
    "HeBo" => "Helvetica-Bold",
    "Arial" => "Helvetica",
    "ArialMT" => "Helvetica",
    "Arial,Bold" => "Helvetica-Bold",
    "Arial-BoldMT" => "Helvetica-Bold",
    "Arial,Italic" => "Helvetica-Oblique",
    "Arial-ItalicMT" => "Helvetica-Oblique",
    "TiRo" => "Times-Roman",
    "TiBo" => "Times-Bold",
    "TiIt" => "Times-Italic",
    "TimesNewRoman" => "Times-Roman",
    "TimesNewRomanPSMT" => "Times-Roman",
    "TimesNewRoman,Bold" => "Times-Bold",
    "TimesNewRoman,Italic" => "Times-Italic",
    "Cour" => "Courier",
    "CoBo" => "Courier-Bold",
    "CourierNew" => "Courier",
    "CourierNewPSMT" => "Courier",
    "Symb" => "Symbol",
    "ZaDb" => "ZapfDingbats",
};

/// Canonical standard 14 name for a font name or short alias.
pub fn canonical_name(name: &str) -> &str {
    STANDARD_ALIASES.get(name).copied().unwrap_or(name)
}

/// Names worth trying for `name`, most specific first (excluding `name` itself).
///
/// Covers the standard 14 fonts with the metric-compatible faces shipped by
/// Windows, macOS and most Linux distributions.
pub fn substitute_names(name: &str) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();
    let canonical: &str = match STANDARD_ALIASES.get(name) {
        Some(canonical) => {
            names.push(*canonical);
            *canonical
        },
        None => name,
    };

    let family: &[&'static str] = match canonical {
        "Helvetica" => &["ArialMT", "Arial", "LiberationSans", "NimbusSans-Regular"],
        "Helvetica-Bold" => &["Arial-BoldMT", "LiberationSans-Bold", "NimbusSans-Bold"],
        "Helvetica-Oblique" => &["Arial-ItalicMT", "LiberationSans-Italic", "NimbusSans-Italic"],
        "Helvetica-BoldOblique" => &[
            "Arial-BoldItalicMT",
            "LiberationSans-BoldItalic",
            "NimbusSans-BoldItalic",
        ],
        "Times-Roman" => &["TimesNewRomanPSMT", "LiberationSerif", "NimbusRoman-Regular"],
        "Times-Bold" => &["TimesNewRomanPS-BoldMT", "LiberationSerif-Bold", "NimbusRoman-Bold"],
        "Times-Italic" => &[
            "TimesNewRomanPS-ItalicMT",
            "LiberationSerif-Italic",
            "NimbusRoman-Italic",
        ],
        "Times-BoldItalic" => &[
            "TimesNewRomanPS-BoldItalicMT",
            "LiberationSerif-BoldItalic",
            "NimbusRoman-BoldItalic",
        ],
        "Courier" => &["CourierNewPSMT", "LiberationMono", "NimbusMonoPS-Regular"],
        "Courier-Bold" => &["CourierNewPS-BoldMT", "LiberationMono-Bold", "NimbusMonoPS-Bold"],
        "Courier-Oblique" => &[
            "CourierNewPS-ItalicMT",
            "LiberationMono-Italic",
            "NimbusMonoPS-Italic",
        ],
        "Courier-BoldOblique" => &[
            "CourierNewPS-BoldItalicMT",
            "LiberationMono-BoldItalic",
            "NimbusMonoPS-BoldItalic",
        ],
        "Symbol" => &["SymbolMT", "StandardSymbolsPS"],
        "ZapfDingbats" => &["ZapfDingbatsITC", "D050000L"],
        _ => &[],
    };

    for candidate in family {
        if *candidate != name && !names.contains(candidate) {
            names.push(candidate);
        }
    }
    names
}

/// Font mapper backed by programs registered in memory.
///
/// # Example
///
/// ```
/// use pdf_formfix::fonts::{FontMapper, FontProgram, InMemoryFontMapper};
///
/// let mut mapper = InMemoryFontMapper::new();
/// mapper.register("Helvetica", FontProgram::new("Helvetica", vec![0u8; 4]));
///
/// // "Helv" is the usual AcroForm short name for Helvetica.
/// assert!(mapper.lookup("Helv", None).is_some());
/// assert!(mapper.lookup("Unknown", None).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryFontMapper {
    programs: HashMap<String, FontProgram>,
}

impl InMemoryFontMapper {
    /// Create an empty mapper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a program under a name.
    pub fn register(&mut self, name: impl Into<String>, program: FontProgram) {
        self.programs.insert(name.into(), program);
    }

    /// Register a font file from disk.
    pub fn register_file(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> Result<()> {
        let name = name.into();
        let program = FontProgram::from_file(name.clone(), path)?;
        self.register(name, program);
        Ok(())
    }

    /// Number of registered programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Check whether no programs are registered.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl FontMapper for InMemoryFontMapper {
    fn lookup(&self, name: &str, _style: Option<FontStyleHint>) -> Option<FontProgram> {
        if let Some(program) = self.programs.get(name) {
            return Some(program.clone());
        }
        substitute_names(name)
            .into_iter()
            .find_map(|candidate| self.programs.get(candidate).cloned())
    }
}
