//! Integration tests for rebuilding AcroForm fields from orphaned widgets.
//!
//! Covers:
//! - Root and non-root widgets across pages
//! - Shared ancestors, broken and cyclic parent chains
//! - Widget font import and fallback font resolution
//! - `/Fields` replacement and the entry-point guard

use pdf_formfix::config::FixupOptions;
use pdf_formfix::document::PdfDocument;
use pdf_formfix::error::Result;
use pdf_formfix::fonts::{FontEmbedder, FontMapper, FontProgram, FontStyleHint, InMemoryFontMapper, NoFontMapper};
use pdf_formfix::forms::{AcroForm, AcroFormOrphanWidgetsFixup, FieldKind};
use pdf_formfix::object::{Dictionary, Object, ObjectRef};
use std::cell::RefCell;

/// Embeds a program as a bare font dictionary naming it.
struct StubEmbedder;

impl FontEmbedder for StubEmbedder {
    fn embed(&self, doc: &mut PdfDocument, program: &FontProgram) -> Result<Object> {
        let mut dict = Dictionary::new();
        dict.insert("Type".to_string(), Object::name("Font"));
        dict.insert("Subtype".to_string(), Object::name("Type0"));
        dict.insert("BaseFont".to_string(), Object::name(program.name.clone()));
        Ok(Object::Reference(doc.add_object(Object::Dictionary(dict))))
    }
}

/// Records every lookup and answers with a fixed program for any name.
struct RecordingMapper {
    lookups: RefCell<Vec<String>>,
}

impl RecordingMapper {
    fn new() -> Self {
        Self {
            lookups: RefCell::new(Vec::new()),
        }
    }
}

impl FontMapper for RecordingMapper {
    fn lookup(&self, name: &str, _style: Option<FontStyleHint>) -> Option<FontProgram> {
        self.lookups.borrow_mut().push(name.to_string());
        Some(FontProgram::new("Substitute", vec![0u8; 4]))
    }
}

fn font(base: &str) -> Object {
    let mut dict = Dictionary::new();
    dict.insert("Type".to_string(), Object::name("Font"));
    dict.insert("Subtype".to_string(), Object::name("Type1"));
    dict.insert("BaseFont".to_string(), Object::name(base));
    Object::Dictionary(dict)
}

fn widget() -> Dictionary {
    let mut dict = Dictionary::new();
    dict.insert("Type".to_string(), Object::name("Annot"));
    dict.insert("Subtype".to_string(), Object::name("Widget"));
    dict.insert(
        "Rect".to_string(),
        Object::Array(vec![
            Object::Integer(72),
            Object::Integer(700),
            Object::Integer(272),
            Object::Integer(720),
        ]),
    );
    dict
}

fn widget_with_parent(parent: ObjectRef) -> Dictionary {
    let mut dict = widget();
    dict.insert("Parent".to_string(), Object::Reference(parent));
    dict
}

fn field(name: &str, ft: Option<&str>) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.insert("T".to_string(), Object::text(name));
    if let Some(ft) = ft {
        dict.insert("FT".to_string(), Object::name(ft));
    }
    dict
}

fn text_widget(name: &str, da: &str) -> Dictionary {
    let mut dict = widget();
    dict.extend(field(name, Some("Tx")));
    dict.insert("DA".to_string(), Object::text(da));
    dict
}

/// Appearance stream with the given `/Font` resources.
fn appearance_with_fonts(fonts: Dictionary) -> Dictionary {
    let mut resources = Dictionary::new();
    resources.insert("Font".to_string(), Object::Dictionary(fonts));
    let mut stream = Dictionary::new();
    stream.insert("Resources".to_string(), Object::Dictionary(resources));
    let mut ap = Dictionary::new();
    ap.insert(
        "N".to_string(),
        Object::Stream {
            dict: stream,
            data: bytes::Bytes::from_static(b"/Tx BMC EMC"),
        },
    );
    ap
}

/// Document with `pages` empty pages and an AcroForm with no fields.
fn form_document(pages: usize) -> PdfDocument {
    let mut doc = PdfDocument::new();
    for _ in 0..pages {
        doc.add_page(Dictionary::new());
    }
    AcroForm::create(&mut doc).unwrap();
    doc
}

fn add_widget(doc: &mut PdfDocument, page: usize, dict: Dictionary) -> ObjectRef {
    let r = doc.add_object(Object::Dictionary(dict));
    doc.add_annotation(page, Object::Reference(r)).unwrap();
    r
}

fn set_kids(doc: &mut PdfDocument, parent: ObjectRef, kids: &[ObjectRef]) {
    let mut dict = doc.load_object(parent).unwrap().into_dict().unwrap();
    dict.insert(
        "Kids".to_string(),
        Object::Array(kids.iter().map(|k| Object::Reference(*k)).collect()),
    );
    doc.set_object(parent, Object::Dictionary(dict));
}

fn dr_fonts(doc: &PdfDocument) -> Vec<String> {
    AcroForm::load(doc)
        .unwrap()
        .unwrap()
        .default_fonts(doc)
        .unwrap()
        .font_names()
        .map(String::from)
        .collect()
}

fn fixup() -> AcroFormOrphanWidgetsFixup<NoFontMapper, StubEmbedder> {
    AcroFormOrphanWidgetsFixup::new(NoFontMapper).with_embedder(StubEmbedder)
}

#[test]
fn test_shared_parent_across_pages_yields_single_field() {
    let mut doc = form_document(2);
    let mut group = field("Group1", Some("Btn"));
    group.insert("Ff".to_string(), Object::Integer(1 << 15));
    let group_ref = doc.add_object(Object::Dictionary(group));
    let w1 = add_widget(&mut doc, 0, widget_with_parent(group_ref));
    let w2 = add_widget(&mut doc, 1, widget_with_parent(group_ref));
    set_kids(&mut doc, group_ref, &[w1, w2]);

    let report = fixup().process(&mut doc);

    assert!(!report.skipped);
    assert_eq!(report.root_names(), vec!["Group1"]);
    assert_eq!(report.qualified_names(), vec!["Group1"]);
    assert_eq!(report.widgets_seen, 2);

    let fields = AcroForm::load(&doc).unwrap().unwrap().fields(&doc).unwrap();
    assert_eq!(fields, vec![Object::Reference(group_ref)]);
}

#[test]
fn test_many_siblings_share_one_ancestor() {
    let mut doc = form_document(1);
    let parent_ref = doc.add_object(Object::Dictionary(field("options", Some("Btn"))));
    let kids: Vec<ObjectRef> = (0..5)
        .map(|_| add_widget(&mut doc, 0, widget_with_parent(parent_ref)))
        .collect();
    set_kids(&mut doc, parent_ref, &kids);

    let report = fixup().process(&mut doc);
    assert_eq!(report.fields.len(), 1);
    assert_eq!(report.fields[0].widget_count, 5);
}

#[test]
fn test_nested_fields_contribute_their_root() {
    let mut doc = form_document(1);
    let root_ref = doc.add_object(Object::Dictionary(field("a", None)));
    let mut mid = field("b", None);
    mid.insert("Parent".to_string(), Object::Reference(root_ref));
    let mid_ref = doc.add_object(Object::Dictionary(mid));
    let mut leaf = field("c", Some("Tx"));
    leaf.insert("Parent".to_string(), Object::Reference(mid_ref));
    let leaf_ref = doc.add_object(Object::Dictionary(leaf));
    let w = add_widget(&mut doc, 0, widget_with_parent(leaf_ref));
    set_kids(&mut doc, leaf_ref, &[w]);
    set_kids(&mut doc, mid_ref, &[leaf_ref]);
    set_kids(&mut doc, root_ref, &[mid_ref]);

    let report = fixup().process(&mut doc);
    assert_eq!(report.root_names(), vec!["a"]);
    assert_eq!(report.qualified_names(), vec!["a", "a.b", "a.b.c"]);
    assert_eq!(report.fields[0].children[0].children[0].kind, Some(FieldKind::Text));
}

#[test]
fn test_root_widgets_keep_page_order() {
    let mut doc = form_document(2);
    let mut first = widget();
    first.extend(field("first", Some("Tx")));
    let mut second = widget();
    second.extend(field("second", Some("Btn")));
    let mut third = widget();
    third.extend(field("third", Some("Ch")));
    add_widget(&mut doc, 1, third);
    add_widget(&mut doc, 0, first);
    add_widget(&mut doc, 0, second);

    let report = fixup().process(&mut doc);
    assert_eq!(report.root_names(), vec!["first", "second", "third"]);
}

#[test]
fn test_inline_widget_becomes_inline_field() {
    let mut doc = form_document(1);
    let mut inline = widget();
    inline.extend(field("inline", Some("Tx")));
    doc.add_annotation(0, Object::Dictionary(inline.clone())).unwrap();

    fixup().process(&mut doc);

    let fields = AcroForm::load(&doc).unwrap().unwrap().fields(&doc).unwrap();
    assert_eq!(fields, vec![Object::Dictionary(inline)]);
}

#[test]
fn test_non_widget_annotations_are_ignored() {
    let mut doc = form_document(1);
    let mut link = Dictionary::new();
    link.insert("Subtype".to_string(), Object::name("Link"));
    link.extend(field("not_a_field", Some("Tx")));
    let link_ref = doc.add_object(Object::Dictionary(link));
    doc.add_annotation(0, Object::Reference(link_ref)).unwrap();

    let report = fixup().process(&mut doc);
    assert_eq!(report.widgets_seen, 0);
    assert!(report.fields.is_empty());
}

#[test]
fn test_dangling_parent_is_dropped_without_error() {
    let mut doc = form_document(1);
    add_widget(&mut doc, 0, widget_with_parent(ObjectRef::new(500, 0)));
    let mut ok = widget();
    ok.extend(field("ok", Some("Tx")));
    add_widget(&mut doc, 0, ok);

    let report = fixup().process(&mut doc);
    assert_eq!(report.root_names(), vec!["ok"]);
    assert_eq!(report.widgets_seen, 2);
    assert_eq!(report.widgets_dropped, 1);
}

#[test]
fn test_cyclic_parent_chain_is_dropped() {
    let mut doc = form_document(1);
    let a = ObjectRef::new(300, 0);
    let b = ObjectRef::new(301, 0);
    let mut a_dict = field("a", Some("Tx"));
    a_dict.insert("Parent".to_string(), Object::Reference(b));
    let mut b_dict = field("b", None);
    b_dict.insert("Parent".to_string(), Object::Reference(a));
    doc.set_object(a, Object::Dictionary(a_dict));
    doc.set_object(b, Object::Dictionary(b_dict));
    add_widget(&mut doc, 0, widget_with_parent(a));

    let report = fixup().process(&mut doc);
    assert!(report.fields.is_empty());
    assert_eq!(report.widgets_dropped, 1);
}

#[test]
fn test_over_deep_chain_respects_options() {
    let mut doc = form_document(1);
    let root = doc.add_object(Object::Dictionary(field("root", Some("Tx"))));
    let mut mid = field("mid", None);
    mid.insert("Parent".to_string(), Object::Reference(root));
    let mid_ref = doc.add_object(Object::Dictionary(mid));
    add_widget(&mut doc, 0, widget_with_parent(mid_ref));

    let shallow = fixup().with_options(FixupOptions::default().with_max_parent_depth(1));
    let report = shallow.process(&mut doc);
    assert!(report.fields.is_empty());
    assert_eq!(report.widgets_dropped, 1);
}

#[test]
fn test_signature_root_is_not_emitted() {
    let mut doc = form_document(1);
    let mut sig = widget();
    sig.extend(field("signature", Some("Sig")));
    add_widget(&mut doc, 0, sig);

    let report = fixup().process(&mut doc);
    assert!(report.fields.is_empty());
    assert_eq!(report.widgets_dropped, 0);
}

#[test]
fn test_existing_fields_are_replaced_when_forced() {
    let mut doc = form_document(1);
    let mut acroform = AcroForm::load(&doc).unwrap().unwrap();
    acroform.set_fields(vec![Object::Reference(ObjectRef::new(999, 0))]);
    acroform.store(&mut doc).unwrap();

    let mut w = widget();
    w.extend(field("fresh", Some("Tx")));
    let w_ref = add_widget(&mut doc, 0, w);

    assert!(fixup().process(&mut doc).skipped);

    let mut acroform = AcroForm::load(&doc).unwrap().unwrap();
    let report = fixup().rebuild_fields(&mut doc, &mut acroform);
    assert_eq!(report.root_names(), vec!["fresh"]);
    let fields = AcroForm::load(&doc).unwrap().unwrap().fields(&doc).unwrap();
    assert_eq!(fields, vec![Object::Reference(w_ref)]);
}

#[test]
fn test_widget_fonts_are_imported_except_subsets() {
    let mut doc = form_document(1);
    let helv_ref = doc.add_object(font("Helvetica"));
    let mut fonts = Dictionary::new();
    fonts.insert("Helv".to_string(), Object::Reference(helv_ref));
    fonts.insert("ABCDEF+Arial".to_string(), font("ABCDEF+Arial"));
    fonts.insert("+F9".to_string(), font("Embedded"));
    let mut w = text_widget("name", "/Helv 10 Tf");
    w.insert("AP".to_string(), Object::Dictionary(appearance_with_fonts(fonts)));
    add_widget(&mut doc, 0, w);

    let mapper = RecordingMapper::new();
    let report = AcroFormOrphanWidgetsFixup::new(&mapper)
        .with_embedder(StubEmbedder)
        .process(&mut doc);

    assert_eq!(report.imported_fonts, vec!["Helv".to_string()]);
    assert_eq!(dr_fonts(&doc), vec!["Helv".to_string()]);
    // the imported font satisfies the default appearance
    assert!(mapper.lookups.borrow().is_empty());
    assert!(report.fallback_fonts.is_empty());
}

#[test]
fn test_fallback_font_added_under_original_name() {
    let mut doc = form_document(1);
    add_widget(&mut doc, 0, text_widget("name", "/Helv 12 Tf"));

    let mut mapper = InMemoryFontMapper::new();
    mapper.register("Helv", FontProgram::new("LiberationSans", vec![0u8; 4]));
    let report = AcroFormOrphanWidgetsFixup::new(mapper)
        .with_embedder(StubEmbedder)
        .process(&mut doc);

    assert_eq!(dr_fonts(&doc), vec!["Helv".to_string()]);
    assert_eq!(report.fallback_fonts, vec!["Helv".to_string()]);

    let acroform = AcroForm::load(&doc).unwrap().unwrap();
    let pool = acroform.default_fonts(&doc).unwrap();
    let helv = pool.fetch_font(&doc, "Helv").unwrap();
    assert_eq!(helv.get("BaseFont").and_then(|b| b.as_name()), Some("LiberationSans"));
}

#[test]
fn test_garbage_appearance_leaves_pool_untouched() {
    let mut doc = form_document(1);
    add_widget(&mut doc, 0, text_widget("name", "garbage"));

    let mapper = RecordingMapper::new();
    let report = AcroFormOrphanWidgetsFixup::new(&mapper)
        .with_embedder(StubEmbedder)
        .process(&mut doc);

    assert_eq!(report.root_names(), vec!["name"]);
    assert!(dr_fonts(&doc).is_empty());
    assert!(mapper.lookups.borrow().is_empty());
    assert!(AcroForm::load(&doc).unwrap().unwrap().dict().get("DR").is_none());
}

#[test]
fn test_existing_default_resource_is_never_overwritten() {
    let mut doc = form_document(1);
    let original = doc.add_object(font("Helvetica"));
    let mut acroform = AcroForm::load(&doc).unwrap().unwrap();
    let mut fonts = Dictionary::new();
    fonts.insert("Helv".to_string(), Object::Reference(original));
    let mut dr = Dictionary::new();
    dr.insert("Font".to_string(), Object::Dictionary(fonts));
    let mut form = acroform.dict().clone();
    form.insert("DR".to_string(), Object::Dictionary(dr));
    doc.set_object(acroform.object_ref().unwrap(), Object::Dictionary(form));
    acroform = AcroForm::load(&doc).unwrap().unwrap();

    let mut fonts = Dictionary::new();
    fonts.insert("Helv".to_string(), font("Arial"));
    let mut w = text_widget("name", "/Helv 12 Tf");
    w.insert("AP".to_string(), Object::Dictionary(appearance_with_fonts(fonts)));
    add_widget(&mut doc, 0, w);

    let mapper = RecordingMapper::new();
    let report = AcroFormOrphanWidgetsFixup::new(&mapper)
        .with_embedder(StubEmbedder)
        .rebuild_fields(&mut doc, &mut acroform);

    assert!(report.imported_fonts.is_empty());
    assert!(report.fallback_fonts.is_empty());
    assert!(mapper.lookups.borrow().is_empty());
    let pool = AcroForm::load(&doc).unwrap().unwrap().default_fonts(&doc).unwrap();
    assert_eq!(pool.get("Helv"), Some(&Object::Reference(original)));
}

#[test]
fn test_fallback_uses_inherited_and_form_default_appearance() {
    let mut doc = form_document(1);
    let mut acroform = AcroForm::load(&doc).unwrap().unwrap();
    let mut form = acroform.dict().clone();
    form.insert("DA".to_string(), Object::text("/TiRo 0 Tf 0 g"));
    doc.set_object(acroform.object_ref().unwrap(), Object::Dictionary(form));
    acroform = AcroForm::load(&doc).unwrap().unwrap();

    // group with its own /DA, text kid inherits it
    let mut group = field("address", None);
    group.insert("DA".to_string(), Object::text("/Cour 9 Tf"));
    let group_ref = doc.add_object(Object::Dictionary(group));
    let mut street = field("street", Some("Tx"));
    street.insert("Parent".to_string(), Object::Reference(group_ref));
    let street_ref = doc.add_object(Object::Dictionary(street));
    let w = add_widget(&mut doc, 0, widget_with_parent(street_ref));
    set_kids(&mut doc, street_ref, &[w]);
    set_kids(&mut doc, group_ref, &[street_ref]);

    // root text field with no /DA falls back to the form's
    let mut plain = widget();
    plain.extend(field("plain", Some("Tx")));
    add_widget(&mut doc, 0, plain);

    // checkboxes take no part in fallback resolution
    let mut check = widget();
    check.extend(field("check", Some("Btn")));
    check.insert("DA".to_string(), Object::text("/ZaDb 0 Tf"));
    add_widget(&mut doc, 0, check);

    let mapper = RecordingMapper::new();
    let report = AcroFormOrphanWidgetsFixup::new(&mapper)
        .with_embedder(StubEmbedder)
        .rebuild_fields(&mut doc, &mut acroform);

    assert_eq!(report.root_names(), vec!["address", "plain", "check"]);
    assert_eq!(*mapper.lookups.borrow(), vec!["Cour".to_string(), "TiRo".to_string()]);
    assert_eq!(dr_fonts(&doc), vec!["Cour".to_string(), "TiRo".to_string()]);
}

#[test]
fn test_same_missing_font_is_looked_up_once() {
    let mut doc = form_document(1);
    add_widget(&mut doc, 0, text_widget("one", "/Corporate 10 Tf"));
    add_widget(&mut doc, 0, text_widget("two", "/Corporate 10 Tf"));

    let report = fixup().process(&mut doc);
    assert_eq!(report.unresolved_fonts, vec!["Corporate".to_string()]);
    assert!(dr_fonts(&doc).is_empty());
}

#[test]
fn test_fallback_disabled_by_options() {
    let mut doc = form_document(1);
    add_widget(&mut doc, 0, text_widget("name", "/Helv 12 Tf"));

    let mapper = RecordingMapper::new();
    let report = AcroFormOrphanWidgetsFixup::new(&mapper)
        .with_embedder(StubEmbedder)
        .with_options(FixupOptions::default().with_font_fallback(false))
        .process(&mut doc);

    assert_eq!(report.root_names(), vec!["name"]);
    assert!(mapper.lookups.borrow().is_empty());
    assert!(dr_fonts(&doc).is_empty());
}

#[test]
fn test_unreadable_page_is_skipped() {
    let mut doc = PdfDocument::new();
    let mut broken = Dictionary::new();
    broken.insert("Annots".to_string(), Object::Integer(7));
    doc.add_page(broken);
    doc.add_page(Dictionary::new());
    AcroForm::create(&mut doc).unwrap();
    let mut w = widget();
    w.extend(field("survivor", Some("Tx")));
    add_widget(&mut doc, 1, w);

    let report = fixup().process(&mut doc);
    assert_eq!(report.root_names(), vec!["survivor"]);
}
