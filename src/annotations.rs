//! Page annotations and widget classification.
//!
//! Reads a page's `/Annots` array per PDF spec ISO 32000-1:2008, Section 12.5
//! and narrows it down to widget annotations (Section 12.5.6.19), the
//! page-level placements of form fields.

use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::object::{Dictionary, Object, ObjectRef};

/// Annotation subtype per PDF spec Table 169.
///
/// Only the distinctions the form repair cares about are kept; every other
/// subtype is carried by name in [`AnnotationSubtype::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnnotationSubtype {
    /// Widget annotation (form field) - Section 12.5.6.19
    Widget,
    /// Link annotation - Section 12.5.6.5
    Link,
    /// Popup annotation - Section 12.5.6.14
    Popup,
    /// Text markup and note annotations (Text, FreeText, Highlight, ...)
    Markup(String),
    /// Any other subtype
    Other(String),
    /// No /Subtype entry
    Missing,
}

impl AnnotationSubtype {
    /// Parse from PDF name.
    pub fn from_pdf_name(name: &str) -> Self {
        match name {
            "Widget" => Self::Widget,
            "Link" => Self::Link,
            "Popup" => Self::Popup,
            "Text" | "FreeText" | "Line" | "Square" | "Circle" | "Polygon" | "PolyLine"
            | "Highlight" | "Underline" | "Squiggly" | "StrikeOut" | "Stamp" | "Caret"
            | "Ink" | "FileAttachment" | "Sound" | "Redact" => Self::Markup(name.to_string()),
            other => Self::Other(other.to_string()),
        }
    }

    /// Get the PDF name for this annotation subtype.
    pub fn pdf_name(&self) -> &str {
        match self {
            Self::Widget => "Widget",
            Self::Link => "Link",
            Self::Popup => "Popup",
            Self::Markup(name) | Self::Other(name) => name,
            Self::Missing => "",
        }
    }

    /// Is this a form widget?
    pub fn is_widget(&self) -> bool {
        matches!(self, Self::Widget)
    }
}

/// A page annotation as found in `/Annots`.
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Indirect reference, when the annotation is not stored inline
    pub object_ref: Option<ObjectRef>,
    /// Parsed subtype
    pub subtype: AnnotationSubtype,
    /// Annotation dictionary
    pub dict: Dictionary,
}

impl Annotation {
    fn from_dict(object_ref: Option<ObjectRef>, dict: Dictionary) -> Self {
        let subtype = dict
            .get("Subtype")
            .and_then(|s| s.as_name())
            .map(AnnotationSubtype::from_pdf_name)
            .unwrap_or(AnnotationSubtype::Missing);

        Self {
            object_ref,
            subtype,
            dict,
        }
    }
}

/// A widget annotation handed to the field-tree builder.
#[derive(Debug, Clone)]
pub struct Widget {
    /// Indirect reference, when the widget is not stored inline
    pub object_ref: Option<ObjectRef>,
    /// Widget dictionary (merged field/widget entries included)
    pub dict: Dictionary,
    /// Zero-based index of the page the widget was found on
    pub page_index: usize,
}

impl Widget {
    /// The `/Parent` entry, if declared.
    pub fn parent(&self) -> Option<&Object> {
        self.dict.get("Parent").filter(|p| !p.is_null())
    }

    /// Widget rectangle `[x1, y1, x2, y2]`.
    pub fn rect(&self) -> Option<[f64; 4]> {
        let arr = self.dict.get("Rect")?.as_array()?;
        if arr.len() != 4 {
            return None;
        }
        let mut rect = [0.0; 4];
        for (slot, obj) in rect.iter_mut().zip(arr) {
            *slot = obj.as_number()?;
        }
        Some(rect)
    }

    /// The normal appearance (`/AP /N`): a stream, or a state dictionary of streams.
    pub fn normal_appearance(&self, doc: &PdfDocument) -> Option<Object> {
        let ap = doc.resolve(self.dict.get("AP")?).ok()?;
        let normal = ap.as_dict()?.get("N")?;
        doc.resolve(normal).ok()
    }

    /// The object a field built from this widget should be referenced by.
    pub fn as_field_object(&self) -> Object {
        match self.object_ref {
            Some(r) => Object::Reference(r),
            None => Object::Dictionary(self.dict.clone()),
        }
    }
}

/// Read the annotations of one page, in `/Annots` order.
///
/// Entries that cannot be loaded or are not dictionaries are skipped.
pub fn page_annotations(doc: &PdfDocument, page_index: usize) -> Result<Vec<Annotation>> {
    let page_ref = doc.get_page_ref(page_index)?;
    let page = doc.load_object(page_ref)?;
    let page_dict = page.as_dict().ok_or_else(|| Error::InvalidObjectType {
        expected: "Dictionary".to_string(),
        found: page.type_name().to_string(),
    })?;

    let annots = match page_dict.get("Annots") {
        Some(obj) => doc.resolve(obj)?,
        None => return Ok(Vec::new()),
    };
    let entries = match annots {
        Object::Array(arr) => arr,
        Object::Null => return Ok(Vec::new()),
        other => {
            return Err(Error::InvalidObjectType {
                expected: "Array".to_string(),
                found: other.type_name().to_string(),
            })
        },
    };

    let mut result = Vec::with_capacity(entries.len());
    for entry in &entries {
        match doc.resolve(entry) {
            Ok(obj) => match obj.into_dict() {
                Ok(dict) => result.push(Annotation::from_dict(entry.as_reference(), dict)),
                Err(e) => log::debug!("skipping annotation on page {}: {}", page_index, e),
            },
            Err(e) => log::debug!("skipping annotation on page {}: {}", page_index, e),
        }
    }

    Ok(result)
}

/// Keep only widget annotations, preserving encounter order.
pub fn classify_widgets(annotations: Vec<Annotation>, page_index: usize) -> Vec<Widget> {
    annotations
        .into_iter()
        .filter(|annot| annot.subtype.is_widget())
        .map(|annot| Widget {
            object_ref: annot.object_ref,
            dict: annot.dict,
            page_index,
        })
        .collect()
}
