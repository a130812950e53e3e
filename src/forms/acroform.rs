//! Interactive form dictionary access.
//!
//! The catalog's `/AcroForm` (PDF spec Section 12.7.2) may be stored inline
//! or as an indirect object, and so may its `/DR` resources and their
//! `/Font` subdictionary. [`AcroForm`] hides those layouts: it is loaded
//! once, edited in memory and written back to wherever it came from.

use super::resources::ResourcePool;
use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::object::{Dictionary, Object, ObjectRef};

/// Where the form dictionary lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    /// Stored directly in the catalog
    Inline,
    /// Indirect object referenced from the catalog
    Indirect(ObjectRef),
}

/// The document's interactive form dictionary.
#[derive(Debug, Clone)]
pub struct AcroForm {
    location: Location,
    dict: Dictionary,
}

impl AcroForm {
    /// Load the form dictionary, if the catalog has one.
    pub fn load(doc: &PdfDocument) -> Result<Option<Self>> {
        let catalog = doc.catalog()?;
        let (location, dict) = match catalog.get("AcroForm") {
            None | Some(Object::Null) => return Ok(None),
            Some(Object::Reference(r)) => (Location::Indirect(*r), doc.load_object(*r)?.into_dict()?),
            Some(other) => (Location::Inline, other.clone().into_dict()?),
        };
        Ok(Some(Self { location, dict }))
    }

    /// Create an empty form dictionary and attach it to the catalog.
    pub fn create(doc: &mut PdfDocument) -> Result<Self> {
        let mut dict = Dictionary::new();
        dict.insert("Fields".to_string(), Object::Array(Vec::new()));
        let form_ref = doc.add_object(Object::Dictionary(dict.clone()));

        let mut catalog = doc.catalog()?;
        catalog.insert("AcroForm".to_string(), Object::Reference(form_ref));
        doc.set_catalog(catalog);

        Ok(Self {
            location: Location::Indirect(form_ref),
            dict,
        })
    }

    /// The form dictionary as currently edited.
    pub fn dict(&self) -> &Dictionary {
        &self.dict
    }

    /// Reference of the form dictionary when it is an indirect object.
    pub fn object_ref(&self) -> Option<ObjectRef> {
        match self.location {
            Location::Indirect(r) => Some(r),
            Location::Inline => None,
        }
    }

    /// Entries of the `/Fields` array.
    ///
    /// A missing `/Fields` is an empty list; anything but an array is an error.
    pub fn fields(&self, doc: &PdfDocument) -> Result<Vec<Object>> {
        let fields = match self.dict.get("Fields") {
            Some(obj) => doc.resolve(obj)?,
            None => return Ok(Vec::new()),
        };
        match fields {
            Object::Array(arr) => Ok(arr),
            Object::Null => Ok(Vec::new()),
            other => Err(Error::InvalidObjectType {
                expected: "Array".to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Whether the form's field registry is absent or empty.
    ///
    /// An unreadable `/Fields` counts as empty.
    pub fn fields_are_empty(&self, doc: &PdfDocument) -> bool {
        match self.fields(doc) {
            Ok(fields) => fields.is_empty(),
            Err(e) => {
                log::debug!("treating unreadable /Fields as empty: {}", e);
                true
            },
        }
    }

    /// Replace `/Fields` entirely.
    pub fn set_fields(&mut self, fields: Vec<Object>) {
        self.dict.insert("Fields".to_string(), Object::Array(fields));
    }

    /// The form-wide default appearance (`/DA`).
    pub fn default_appearance(&self, doc: &PdfDocument) -> Option<String> {
        let da = doc.resolve(self.dict.get("DA")?).ok()?;
        da.as_text_string()
    }

    /// The form-wide default resource fonts (`/DR /Font`).
    ///
    /// A form without `/DR` has an empty pool.
    pub fn default_fonts(&self, doc: &PdfDocument) -> Result<ResourcePool> {
        match self.dict.get("DR") {
            Some(dr) if !dr.is_null() => ResourcePool::from_resources(doc, dr),
            _ => Ok(ResourcePool::new()),
        }
    }

    /// Write a font pool back to `/DR /Font`, creating `/DR` if needed.
    ///
    /// Indirect `/DR` and `/Font` objects are updated in place so other
    /// references to them see the new fonts.
    pub fn set_default_fonts(&mut self, doc: &mut PdfDocument, pool: &ResourcePool) -> Result<()> {
        let fonts = Object::Dictionary(pool.to_font_dict());
        match self.dict.get("DR").cloned() {
            Some(Object::Reference(dr_ref)) => {
                let mut dr = doc.load_object(dr_ref)?.into_dict()?;
                Self::put_fonts(doc, &mut dr, fonts);
                doc.set_object(dr_ref, Object::Dictionary(dr));
            },
            Some(Object::Dictionary(mut dr)) => {
                Self::put_fonts(doc, &mut dr, fonts);
                self.dict.insert("DR".to_string(), Object::Dictionary(dr));
            },
            _ => {
                let mut dr = Dictionary::new();
                dr.insert("Font".to_string(), fonts);
                self.dict.insert("DR".to_string(), Object::Dictionary(dr));
            },
        }
        Ok(())
    }

    fn put_fonts(doc: &mut PdfDocument, dr: &mut Dictionary, fonts: Object) {
        match dr.get("Font") {
            Some(Object::Reference(font_ref)) => doc.set_object(*font_ref, fonts),
            _ => {
                dr.insert("Font".to_string(), fonts);
            },
        }
    }

    /// Store the edited dictionary back into the document.
    pub fn store(&self, doc: &mut PdfDocument) -> Result<()> {
        match self.location {
            Location::Indirect(r) => doc.set_object(r, Object::Dictionary(self.dict.clone())),
            Location::Inline => {
                let mut catalog = doc.catalog()?;
                catalog.insert("AcroForm".to_string(), Object::Dictionary(self.dict.clone()));
                doc.set_catalog(catalog);
            },
        }
        Ok(())
    }
}
