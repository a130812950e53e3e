// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::enum_variant_names)]
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]
#![cfg_attr(test, allow(unused_variables))]

//! # PDF FormFix
//!
//! Repair of PDF interactive forms whose field registry went missing.
//!
//! ## Core Features
//!
//! - **Field Reconstruction**: Rebuilds `/AcroForm /Fields` from the widget
//!   annotations on each page (ISO 32000-1:2008 §12.7, §12.5.6.19)
//! - **Hierarchy Recovery**: Follows `/Parent` chains to root fields, emits
//!   each shared ancestor once, and drops widgets whose chain is broken,
//!   cyclic or too deep
//! - **Font Import**: Copies fonts from widget appearance streams into the
//!   form's default resources, skipping subset fonts
//! - **Font Fallback**: Embeds a substitute (Type0/CIDFontType2) for fonts
//!   named by a text field's default appearance but missing from `/DR`
//!
//! ## Architecture
//! - **Injected Services**: Font lookup ([`fonts::FontMapper`]) and
//!   embedding ([`fonts::FontEmbedder`]) are traits, so tests and
//!   applications choose their own font sources
//! - **Recoverable by Design**: A rebuild pass never fails; damage is logged
//!   through the `log` facade and counted in the [`forms::FixupReport`]
//! - **JSON Document Model**: The `rebuild_form_fields` binary reads and
//!   writes documents as JSON object stores
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_formfix::document::PdfDocument;
//! use pdf_formfix::fonts::InMemoryFontMapper;
//! use pdf_formfix::forms::AcroFormOrphanWidgetsFixup;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = PdfDocument::open("form.json")?;
//!
//! let mut fonts = InMemoryFontMapper::new();
//! fonts.register_file("Helvetica", "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf")?;
//!
//! let report = AcroFormOrphanWidgetsFixup::new(fonts).process(&mut doc);
//! println!("rebuilt {} root fields", report.fields.len());
//!
//! doc.save("form.fixed.json")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// Document model
pub mod document;
pub mod object;

// Page annotations
pub mod annotations;

// Fonts
pub mod fonts;

// Interactive forms
pub mod forms;

// Configuration
pub mod config;

// Re-exports
pub use annotations::{Annotation, AnnotationSubtype, Widget};
pub use config::FixupOptions;
pub use document::PdfDocument;
pub use error::{Error, Result};
pub use forms::{AcroForm, AcroFormOrphanWidgetsFixup, FixupReport};
