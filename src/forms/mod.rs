//! Interactive form repair.
//!
//! Rebuilds a form's field registry from the widget annotations on its pages
//! and makes sure the fonts named by text fields are available in the form's
//! default resources. See ISO 32000-1:2008, Section 12.7 - Interactive Forms.

pub mod acroform;
pub mod default_appearance;
pub mod field;
pub mod field_cache;
pub mod font_fallback;
pub mod font_import;
pub mod orphan_widgets;
pub mod parent_chain;
pub mod resources;

pub use acroform::AcroForm;
pub use default_appearance::{parse_default_appearance, DaFont};
pub use field::{ButtonKind, ChoiceKind, Field, FieldFactory, FieldFlags, FieldKind, FieldNode, FieldValue};
pub use field_cache::NonTerminalFieldCache;
pub use font_fallback::{FallbackOutcome, FontFallbackResolver};
pub use font_import::{import_widget_fonts, is_subset_font_name};
pub use orphan_widgets::{AcroFormOrphanWidgetsFixup, FieldSummary, FixupReport};
pub use parent_chain::{resolve_root, BrokenChain, ChainResolution, RootField};
pub use resources::ResourcePool;
