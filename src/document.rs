//! In-memory PDF document model.
//!
//! `PdfDocument` is an indirect-object store with a catalog and an ordered
//! page list. It is the page/annotation provider the form repair reads from
//! and the object sink fallback fonts are written into.
//!
//! Documents can be loaded from and saved to a JSON model (see
//! [`DocumentModel`]), which is what the `rebuild_form_fields` binary uses.

use crate::error::{Error, Result};
use crate::object::{Dictionary, Object, ObjectRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// PDF document.
///
/// # Example
///
/// ```
/// use pdf_formfix::document::PdfDocument;
/// use pdf_formfix::object::{Dictionary, Object};
///
/// let mut doc = PdfDocument::new();
/// let page = doc.add_page(Dictionary::new());
/// assert_eq!(doc.page_count(), 1);
/// assert_eq!(doc.get_page_ref(0)?, page);
/// # Ok::<(), pdf_formfix::error::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct PdfDocument {
    /// Indirect objects keyed by reference (ordered for deterministic output)
    objects: BTreeMap<ObjectRef, Object>,
    /// Document catalog reference
    catalog: ObjectRef,
    /// Page dictionaries in document order
    pages: Vec<ObjectRef>,
    /// Next free object number
    next_id: u32,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// Create an empty document with a bare catalog.
    pub fn new() -> Self {
        let catalog = ObjectRef::new(1, 0);
        let mut catalog_dict = Dictionary::new();
        catalog_dict.insert("Type".to_string(), Object::name("Catalog"));

        let mut objects = BTreeMap::new();
        objects.insert(catalog, Object::Dictionary(catalog_dict));

        Self {
            objects,
            catalog,
            pages: Vec::new(),
            next_id: 2,
        }
    }

    /// Add an indirect object and return its reference.
    ///
    /// Numbers are handed out above the highest one in use; once that reaches
    /// `u32::MAX` the lowest free number is reused instead.
    pub fn add_object(&mut self, object: Object) -> ObjectRef {
        let mut obj_ref = ObjectRef::new(self.next_id, 0);
        if self.objects.contains_key(&obj_ref) {
            let free = (1..u32::MAX)
                .find(|&id| !self.objects.contains_key(&ObjectRef::new(id, 0)))
                .unwrap_or(u32::MAX);
            obj_ref = ObjectRef::new(free, 0);
        }
        self.next_id = self.next_id.max(obj_ref.id.saturating_add(1));
        self.objects.insert(obj_ref, object);
        obj_ref
    }

    /// Replace (or create) the object stored under `obj_ref`.
    pub fn set_object(&mut self, obj_ref: ObjectRef, object: Object) {
        self.next_id = self.next_id.max(obj_ref.id.saturating_add(1));
        self.objects.insert(obj_ref, object);
    }

    /// Borrow an object without cloning.
    pub fn get_object(&self, obj_ref: ObjectRef) -> Option<&Object> {
        self.objects.get(&obj_ref)
    }

    /// Load an indirect object.
    pub fn load_object(&self, obj_ref: ObjectRef) -> Result<Object> {
        self.objects
            .get(&obj_ref)
            .cloned()
            .ok_or(Error::ObjectNotFound(obj_ref.id, obj_ref.gen))
    }

    /// Resolve an object, following a single level of indirection.
    ///
    /// If the object is an indirect reference, loads it. Otherwise returns clone.
    pub fn resolve(&self, obj: &Object) -> Result<Object> {
        match obj {
            Object::Reference(r) => self.load_object(*r),
            other => Ok(other.clone()),
        }
    }

    /// Resolve an object and require a dictionary (or stream dictionary).
    pub fn resolve_dict(&self, obj: &Object) -> Result<Dictionary> {
        self.resolve(obj)?.into_dict()
    }

    /// Number of stored indirect objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Load the catalog dictionary.
    pub fn catalog(&self) -> Result<Dictionary> {
        self.load_object(self.catalog)?.into_dict()
    }

    /// Replace the catalog dictionary.
    pub fn set_catalog(&mut self, catalog: Dictionary) {
        self.objects.insert(self.catalog, Object::Dictionary(catalog));
    }

    /// Append a page dictionary and return its reference.
    pub fn add_page(&mut self, mut page: Dictionary) -> ObjectRef {
        page.entry("Type".to_string())
            .or_insert_with(|| Object::name("Page"));
        let page_ref = self.add_object(Object::Dictionary(page));
        self.pages.push(page_ref);
        page_ref
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page references in document order.
    pub fn pages(&self) -> &[ObjectRef] {
        &self.pages
    }

    /// Get the reference of the page at `page_index`.
    pub fn get_page_ref(&self, page_index: usize) -> Result<ObjectRef> {
        self.pages.get(page_index).copied().ok_or_else(|| {
            Error::InvalidPdf(format!(
                "Page index {} out of range (document has {} pages)",
                page_index,
                self.pages.len()
            ))
        })
    }

    /// Append an annotation object to a page's `/Annots` array.
    ///
    /// Handles both direct arrays and arrays stored as indirect objects.
    pub fn add_annotation(&mut self, page_index: usize, annotation: Object) -> Result<()> {
        let page_ref = self.get_page_ref(page_index)?;
        let mut page = self.load_object(page_ref)?.into_dict()?;

        match page.get("Annots") {
            Some(Object::Reference(annots_ref)) => {
                let annots_ref = *annots_ref;
                let mut annots = match self.load_object(annots_ref)? {
                    Object::Array(arr) => arr,
                    other => {
                        return Err(Error::InvalidObjectType {
                            expected: "Array".to_string(),
                            found: other.type_name().to_string(),
                        })
                    },
                };
                annots.push(annotation);
                self.set_object(annots_ref, Object::Array(annots));
            },
            Some(Object::Array(_)) => {
                if let Some(Object::Array(arr)) = page.get_mut("Annots") {
                    arr.push(annotation);
                }
                self.set_object(page_ref, Object::Dictionary(page));
            },
            _ => {
                page.insert("Annots".to_string(), Object::Array(vec![annotation]));
                self.set_object(page_ref, Object::Dictionary(page));
            },
        }
        Ok(())
    }

    /// Load a document from its JSON model.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: DocumentModel = serde_json::from_str(json)?;
        Self::from_model(model)
    }

    /// Serialize the document to its JSON model.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_model())?)
    }

    /// Open a JSON document model from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the JSON document model to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Build a document from a deserialized model.
    ///
    /// Object number `u32::MAX` is rejected since no fresh number would
    /// remain above it.
    pub fn from_model(model: DocumentModel) -> Result<Self> {
        let mut objects = BTreeMap::new();
        let mut next_id = 1;
        for entry in model.objects {
            let after = entry.reference.id.checked_add(1).ok_or_else(|| {
                Error::InvalidPdf(format!("object number {} out of range", entry.reference.id))
            })?;
            next_id = next_id.max(after);
            objects.insert(entry.reference, entry.object);
        }

        if !objects.contains_key(&model.catalog) {
            return Err(Error::ObjectNotFound(model.catalog.id, model.catalog.gen));
        }

        Ok(Self {
            objects,
            catalog: model.catalog,
            pages: model.pages,
            next_id,
        })
    }

    /// Snapshot the document as a serializable model.
    pub fn to_model(&self) -> DocumentModel {
        DocumentModel {
            catalog: self.catalog,
            pages: self.pages.clone(),
            objects: self
                .objects
                .iter()
                .map(|(reference, object)| IndirectObject {
                    reference: *reference,
                    object: object.clone(),
                })
                .collect(),
        }
    }
}

/// Serializable document model.
///
/// JSON object keys must be strings, so indirect objects are stored as a
/// list of `{reference, object}` entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Catalog reference
    pub catalog: ObjectRef,
    /// Page references in document order
    pub pages: Vec<ObjectRef>,
    /// All indirect objects
    pub objects: Vec<IndirectObject>,
}

/// One indirect object in a [`DocumentModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndirectObject {
    /// Object reference
    pub reference: ObjectRef,
    /// Object value
    pub object: Object,
}
