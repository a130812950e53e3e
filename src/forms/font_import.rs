//! Promoting widget appearance fonts into the form's default resources.
//!
//! Appearance streams written by the producing application usually carry the
//! real font the field was designed with. Copying those into `/AcroForm /DR`
//! keeps later fallback resolution from substituting a different face.
//! Subset fonts only contain the glyphs of the text that was drawn and are
//! never promoted.

use super::resources::ResourcePool;
use crate::annotations::Widget;
use crate::document::PdfDocument;
use crate::object::Object;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `+Name` or a six-letter subset tag such as `ABCDEF+Name`
    static ref SUBSET_MARKER: Regex = Regex::new(r"^(?:\+|[A-Z]{6}\+)").expect("valid regex");
}

/// Whether a font resource name marks a subset font.
pub fn is_subset_font_name(name: &str) -> bool {
    SUBSET_MARKER.is_match(name)
}

/// Appearance streams of the widget's normal appearance.
///
/// `/AP /N` is a single stream, or for buttons a dictionary of state streams.
fn normal_appearance_streams(doc: &PdfDocument, widget: &Widget) -> Vec<Object> {
    match widget.normal_appearance(doc) {
        Some(stream @ Object::Stream { .. }) => vec![stream],
        Some(Object::Dictionary(states)) => states
            .values()
            .filter_map(|state| doc.resolve(state).ok())
            .filter(|state| matches!(state, Object::Stream { .. }))
            .collect(),
        _ => Vec::new(),
    }
}

/// Copy the widget's appearance fonts into `pool`.
///
/// When `/AP /N` is a state dictionary, fonts from every state stream are
/// imported, not only the stream selected by `/AS`.
///
/// Existing pool entries are never replaced. Each copied entry must
/// dereference to a font dictionary; entries that don't are skipped. Returns
/// the names that were added.
pub fn import_widget_fonts(doc: &PdfDocument, widget: &Widget, pool: &mut ResourcePool) -> Vec<String> {
    let mut imported = Vec::new();

    for stream in normal_appearance_streams(doc, widget) {
        let Some(resources) = stream.as_dict().and_then(|d| d.get("Resources")) else {
            continue;
        };
        let local = match ResourcePool::from_resources(doc, resources) {
            Ok(local) => local,
            Err(e) => {
                log::debug!("unreadable appearance resources on page {}: {}", widget.page_index, e);
                continue;
            },
        };

        for name in local.font_names() {
            if is_subset_font_name(name) {
                log::debug!("font resource for widget is a subset font - ignored: {}", name);
                continue;
            }
            if pool.contains(name) {
                continue;
            }
            if let Err(e) = local.fetch_font(doc, name) {
                log::debug!("unable to add font {} to AcroForm: {}", name, e);
                continue;
            }
            if let Some(entry) = local.get(name) {
                if pool.insert_if_absent(name, entry.clone()) {
                    log::debug!("added font resource {} to AcroForm from widget", name);
                    imported.push(name.to_string());
                }
            }
        }
    }

    imported
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Dictionary, ObjectRef};

    fn font(base: &str) -> Object {
        let mut dict = Dictionary::new();
        dict.insert("Type".to_string(), Object::name("Font"));
        dict.insert("BaseFont".to_string(), Object::name(base));
        Object::Dictionary(dict)
    }

    fn appearance(fonts: Dictionary) -> Object {
        let mut resources = Dictionary::new();
        resources.insert("Font".to_string(), Object::Dictionary(fonts));
        let mut dict = Dictionary::new();
        dict.insert("Resources".to_string(), Object::Dictionary(resources));
        Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"/Tx BMC EMC"),
        }
    }

    fn widget_with_ap(normal: Object) -> Widget {
        let mut ap = Dictionary::new();
        ap.insert("N".to_string(), normal);
        let mut dict = Dictionary::new();
        dict.insert("Subtype".to_string(), Object::name("Widget"));
        dict.insert("AP".to_string(), Object::Dictionary(ap));
        Widget {
            object_ref: None,
            dict,
            page_index: 0,
        }
    }

    #[test]
    fn test_subset_marker() {
        assert!(is_subset_font_name("+Helv"));
        assert!(is_subset_font_name("ABCDEF+Arial"));
        assert!(!is_subset_font_name("Helv"));
        assert!(!is_subset_font_name("ABCDE+Arial"));
        assert!(!is_subset_font_name("abcdef+Arial"));
        assert!(!is_subset_font_name("F1+"));
    }

    #[test]
    fn test_imports_indirect_font_by_reference() {
        let mut doc = PdfDocument::new();
        let font_ref = doc.add_object(font("Helvetica"));
        let mut fonts = Dictionary::new();
        fonts.insert("Helv".to_string(), Object::Reference(font_ref));
        let widget = widget_with_ap(appearance(fonts));

        let mut pool = ResourcePool::new();
        let imported = import_widget_fonts(&doc, &widget, &mut pool);
        assert_eq!(imported, vec!["Helv".to_string()]);
        assert_eq!(pool.get("Helv"), Some(&Object::Reference(font_ref)));
    }

    #[test]
    fn test_subset_fonts_are_not_imported() {
        let doc = PdfDocument::new();
        let mut fonts = Dictionary::new();
        fonts.insert("+F1".to_string(), font("ABCDEF+Arial"));
        fonts.insert("QWERTY+F2".to_string(), font("QWERTY+Times"));
        fonts.insert("F3".to_string(), font("Courier"));
        let widget = widget_with_ap(appearance(fonts));

        let mut pool = ResourcePool::new();
        import_widget_fonts(&doc, &widget, &mut pool);
        assert_eq!(pool.font_names().collect::<Vec<_>>(), vec!["F3"]);
    }

    #[test]
    fn test_existing_entries_are_kept() {
        let doc = PdfDocument::new();
        let mut fonts = Dictionary::new();
        fonts.insert("Helv".to_string(), font("Arial"));
        let widget = widget_with_ap(appearance(fonts));

        let mut pool = ResourcePool::new();
        pool.insert_if_absent("Helv", font("Helvetica"));
        assert!(import_widget_fonts(&doc, &widget, &mut pool).is_empty());
        assert_eq!(pool.get("Helv"), Some(&font("Helvetica")));
    }

    #[test]
    fn test_dangling_font_is_skipped() {
        let doc = PdfDocument::new();
        let mut fonts = Dictionary::new();
        fonts.insert("Gone".to_string(), Object::Reference(ObjectRef::new(80, 0)));
        fonts.insert("Cour".to_string(), font("Courier"));
        let widget = widget_with_ap(appearance(fonts));

        let mut pool = ResourcePool::new();
        let imported = import_widget_fonts(&doc, &widget, &mut pool);
        assert_eq!(imported, vec!["Cour".to_string()]);
    }

    #[test]
    fn test_button_state_appearances() {
        let mut doc = PdfDocument::new();
        let mut on_fonts = Dictionary::new();
        on_fonts.insert("ZaDb".to_string(), font("ZapfDingbats"));
        let on_ref = doc.add_object(appearance(on_fonts));
        let mut states = Dictionary::new();
        states.insert("Yes".to_string(), Object::Reference(on_ref));
        states.insert("Off".to_string(), appearance(Dictionary::new()));
        let widget = widget_with_ap(Object::Dictionary(states));

        let mut pool = ResourcePool::new();
        assert_eq!(import_widget_fonts(&doc, &widget, &mut pool), vec!["ZaDb".to_string()]);
    }

    #[test]
    fn test_widget_without_appearance() {
        let doc = PdfDocument::new();
        let widget = Widget {
            object_ref: None,
            dict: Dictionary::new(),
            page_index: 2,
        };
        let mut pool = ResourcePool::new();
        assert!(import_widget_fonts(&doc, &widget, &mut pool).is_empty());
        assert!(!pool.is_modified());
    }
}
