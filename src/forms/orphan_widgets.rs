//! Rebuilding `/AcroForm /Fields` from page widgets.
//!
//! Some producers write widget annotations onto pages but leave the form's
//! field registry empty, so viewers show the form while form processing sees
//! no fields. The widgets still link to their fields through `/Parent`, and
//! root fields merged with their single widget are the widget itself, so the
//! registry can be recovered page by page.
//!
//! # Example
//!
//! ```
//! use pdf_formfix::document::PdfDocument;
//! use pdf_formfix::fonts::NoFontMapper;
//! use pdf_formfix::forms::{AcroForm, AcroFormOrphanWidgetsFixup};
//! use pdf_formfix::object::{Dictionary, Object};
//!
//! let mut doc = PdfDocument::new();
//! doc.add_page(Dictionary::new());
//! AcroForm::create(&mut doc)?;
//!
//! let mut widget = Dictionary::new();
//! widget.insert("Subtype".to_string(), Object::name("Widget"));
//! widget.insert("FT".to_string(), Object::name("Tx"));
//! widget.insert("T".to_string(), Object::text("email"));
//! let widget_ref = doc.add_object(Object::Dictionary(widget));
//! doc.add_annotation(0, Object::Reference(widget_ref))?;
//!
//! let report = AcroFormOrphanWidgetsFixup::new(NoFontMapper).process(&mut doc);
//! assert_eq!(report.root_names(), vec!["email"]);
//! # Ok::<(), pdf_formfix::error::Error>(())
//! ```

use super::acroform::AcroForm;
use super::field::{partial_name, walk_pre_order, Field, FieldFactory, FieldKind};
use super::field_cache::NonTerminalFieldCache;
use super::font_fallback::{FallbackOutcome, FontFallbackResolver};
use super::font_import::import_widget_fonts;
use super::parent_chain::{resolve_root, ChainResolution};
use super::resources::ResourcePool;
use crate::annotations::{classify_widgets, page_annotations, Widget};
use crate::config::FixupOptions;
use crate::document::PdfDocument;
use crate::fonts::{FontEmbedder, FontMapper, Type0FontEmbedder};
use crate::object::ObjectRef;
use serde::Serialize;

/// Serializable outline of a rebuilt field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    /// Fully qualified name
    pub qualified_name: String,
    /// Kind of a terminal field
    pub kind: Option<FieldKind>,
    /// Field dictionary reference, when indirect
    pub object_ref: Option<ObjectRef>,
    /// Number of widget annotations (terminal fields)
    pub widget_count: usize,
    /// Child fields (non-terminal fields)
    pub children: Vec<FieldSummary>,
}

impl From<&Field> for FieldSummary {
    fn from(field: &Field) -> Self {
        Self {
            qualified_name: field.qualified_name.clone(),
            kind: field.kind(),
            object_ref: field.object_ref,
            widget_count: field.widgets().len(),
            children: field.children().iter().map(FieldSummary::from).collect(),
        }
    }
}

/// Result of a rebuild pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FixupReport {
    /// The pass did not run (no form, or the form already has fields)
    pub skipped: bool,
    /// Root fields written to `/Fields`, in encounter order
    pub fields: Vec<FieldSummary>,
    /// Widget annotations visited
    pub widgets_seen: usize,
    /// Widgets whose parent chain could not be resolved
    pub widgets_dropped: usize,
    /// Fonts copied from widget appearances into `/DR`
    pub imported_fonts: Vec<String>,
    /// Fonts embedded as substitutes for missing `/DA` fonts
    pub fallback_fonts: Vec<String>,
    /// `/DA` fonts no substitute could be found or embedded for
    pub unresolved_fonts: Vec<String>,
    /// The rebuilt forest
    #[serde(skip)]
    pub forest: Vec<Field>,
}

impl FixupReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    /// Qualified names of the root fields, in `/Fields` order.
    pub fn root_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.qualified_name.as_str()).collect()
    }

    /// Qualified names of every rebuilt field in pre-order.
    pub fn qualified_names(&self) -> Vec<&str> {
        walk_pre_order(&self.forest)
            .into_iter()
            .map(|f| f.qualified_name.as_str())
            .collect()
    }
}

/// Rebuilds a form's field registry from the widgets found on its pages.
///
/// The mapper is consulted for text and choice fields whose default
/// appearance names a font the form's `/DR` lacks; the embedder turns what
/// it returns into a font resource.
#[derive(Debug, Clone)]
pub struct AcroFormOrphanWidgetsFixup<M, E = Type0FontEmbedder> {
    mapper: M,
    embedder: E,
    options: FixupOptions,
}

impl<M: FontMapper> AcroFormOrphanWidgetsFixup<M, Type0FontEmbedder> {
    /// Create a fixup with default options and the Type0 embedder.
    pub fn new(mapper: M) -> Self {
        Self {
            mapper,
            embedder: Type0FontEmbedder,
            options: FixupOptions::default(),
        }
    }
}

impl<M: FontMapper, E: FontEmbedder> AcroFormOrphanWidgetsFixup<M, E> {
    /// Replace the font embedder.
    pub fn with_embedder<E2: FontEmbedder>(self, embedder: E2) -> AcroFormOrphanWidgetsFixup<M, E2> {
        AcroFormOrphanWidgetsFixup {
            mapper: self.mapper,
            embedder,
            options: self.options,
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: FixupOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub fn options(&self) -> &FixupOptions {
        &self.options
    }

    /// Rebuild the field registry if the document has a form with no fields.
    ///
    /// Documents without `/AcroForm`, or whose `/Fields` already lists
    /// fields, are left untouched and a `skipped` report is returned.
    pub fn process(&self, doc: &mut PdfDocument) -> FixupReport {
        let mut acroform = match AcroForm::load(doc) {
            Ok(Some(acroform)) => acroform,
            Ok(None) => return FixupReport::skipped(),
            Err(e) => {
                log::warn!("unreadable AcroForm, not rebuilding fields: {}", e);
                return FixupReport::skipped();
            },
        };
        if !acroform.fields_are_empty(doc) {
            return FixupReport::skipped();
        }
        self.rebuild_fields(doc, &mut acroform)
    }

    /// Replace `/Fields` with fields rebuilt from page widgets and store the form.
    ///
    /// Never fails: unreadable pages, broken parent chains and font problems
    /// are logged and skipped.
    pub fn rebuild_fields(&self, doc: &mut PdfDocument, acroform: &mut AcroForm) -> FixupReport {
        log::debug!("rebuilding fields from widgets");
        let mut report = FixupReport::default();

        let mut pool = match acroform.default_fonts(doc) {
            Ok(pool) => pool,
            Err(e) => {
                log::warn!("unreadable AcroForm /DR fonts, starting from an empty pool: {}", e);
                ResourcePool::new()
            },
        };

        let mut cache = NonTerminalFieldCache::new();
        let forest = self.build_forest(doc, acroform, &mut pool, &mut cache, &mut report);
        acroform.set_fields(forest.iter().map(Field::as_object).collect());

        if self.options.resolve_missing_fonts {
            let mut resolver = FontFallbackResolver::new(&self.mapper, &self.embedder);
            for field in walk_pre_order(&forest) {
                if !field.is_variable_text() {
                    continue;
                }
                match resolver.ensure_font(doc, &mut pool, field) {
                    FallbackOutcome::Embedded(name) => report.fallback_fonts.push(name),
                    FallbackOutcome::Unresolved(name) | FallbackOutcome::EmbedFailed(name) => {
                        report.unresolved_fonts.push(name)
                    },
                    FallbackOutcome::NoFontReference
                    | FallbackOutcome::Present(_)
                    | FallbackOutcome::AlreadyTried(_) => {},
                }
            }
        }

        if pool.is_modified() {
            if let Err(e) = acroform.set_default_fonts(doc, &pool) {
                log::warn!("unable to update AcroForm /DR fonts: {}", e);
            }
        }
        if let Err(e) = acroform.store(doc) {
            log::warn!("unable to store rebuilt AcroForm: {}", e);
        }

        report.fields = forest.iter().map(FieldSummary::from).collect();
        report.forest = forest;
        report
    }

    /// Walk all pages in order and collect root fields in encounter order.
    fn build_forest(
        &self,
        doc: &PdfDocument,
        acroform: &AcroForm,
        pool: &mut ResourcePool,
        cache: &mut NonTerminalFieldCache,
        report: &mut FixupReport,
    ) -> Vec<Field> {
        let factory = FieldFactory::new(doc, acroform.default_appearance(doc), self.options.max_field_depth);
        let mut forest = Vec::new();

        for page_index in 0..doc.page_count() {
            let annotations = match page_annotations(doc, page_index) {
                Ok(annotations) => annotations,
                Err(e) => {
                    log::warn!("couldn't read annotations for page {}: {}", page_index, e);
                    continue;
                },
            };
            for widget in classify_widgets(annotations, page_index) {
                report.widgets_seen += 1;
                if self.options.import_widget_fonts {
                    report
                        .imported_fonts
                        .extend(import_widget_fonts(doc, &widget, pool));
                }
                self.handle_widget(doc, &factory, &widget, cache, &mut forest, report);
            }
        }

        forest
    }

    fn handle_widget(
        &self,
        doc: &PdfDocument,
        factory: &FieldFactory<'_>,
        widget: &Widget,
        cache: &mut NonTerminalFieldCache,
        forest: &mut Vec<Field>,
        report: &mut FixupReport,
    ) {
        if widget.parent().is_none() {
            match factory.build(&widget.as_field_object()) {
                Ok(Some(field)) => forest.push(field),
                Ok(None) => {},
                Err(e) => log::debug!("unable to build field for widget on page {}: {}", widget.page_index, e),
            }
            return;
        }

        let root = match resolve_root(doc, widget, self.options.max_parent_depth) {
            ChainResolution::Resolved(root) => root,
            ChainResolution::Broken(reason) => {
                log::debug!("dropping widget on page {}: {}", widget.page_index, reason);
                report.widgets_dropped += 1;
                return;
            },
        };

        let name = partial_name(doc, &root.dict);
        if cache.contains(&name) {
            return;
        }
        match factory.build(&root.object) {
            Ok(Some(field)) => {
                cache.register(field.qualified_name.clone(), forest.len());
                forest.push(field);
            },
            Ok(None) => {},
            Err(e) => log::debug!("unable to build root field '{}': {}", name, e),
        }
    }
}
