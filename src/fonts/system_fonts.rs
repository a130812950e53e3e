//! Font mapper backed by the fonts installed on the host.
//!
//! Enabled with the `system-fonts` feature.

use super::font_mapper::{substitute_names, FontMapper, FontProgram, FontStyleHint};
use fontdb::{Database, Family, Query, Style, Weight};

/// Looks up substitute fonts among installed system fonts.
pub struct SystemFontMapper {
    db: Database,
}

impl std::fmt::Debug for SystemFontMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemFontMapper")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl Default for SystemFontMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemFontMapper {
    /// Scan the system font directories.
    pub fn new() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!("loaded {} system font faces", db.len());
        Self { db }
    }

    /// Use a prepared font database.
    pub fn with_database(db: Database) -> Self {
        Self { db }
    }

    fn load(&self, id: fontdb::ID, name: &str) -> Option<FontProgram> {
        self.db.with_face_data(id, |data, index| FontProgram {
            name: name.to_string(),
            data: bytes::Bytes::copy_from_slice(data),
            face_index: index,
        })
    }

    fn by_postscript_name(&self, name: &str) -> Option<FontProgram> {
        let face = self.db.faces().find(|face| face.post_script_name == name)?;
        self.load(face.id, name)
    }

    fn by_family(&self, family: &str, style: Option<FontStyleHint>) -> Option<FontProgram> {
        let style = style.unwrap_or_default();
        let families = [Family::Name(family)];
        let query = Query {
            families: &families,
            weight: if style.bold { Weight::BOLD } else { Weight::NORMAL },
            style: if style.italic { Style::Italic } else { Style::Normal },
            ..Query::default()
        };
        let id = self.db.query(&query)?;
        self.load(id, family)
    }
}

impl FontMapper for SystemFontMapper {
    fn lookup(&self, name: &str, style: Option<FontStyleHint>) -> Option<FontProgram> {
        let style = style.or_else(|| FontStyleHint::from_font_name(name));
        std::iter::once(name)
            .chain(substitute_names(name))
            .find_map(|candidate| {
                self.by_postscript_name(candidate)
                    .or_else(|| self.by_family(candidate, style))
            })
    }
}
