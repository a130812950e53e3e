//! Form field model and construction.
//!
//! Fields are built from their dictionaries per ISO 32000-1:2008, Section
//! 12.7.3. A field dictionary is non-terminal when its `/Kids` contain at
//! least one field (a kid with `/T`); otherwise it is terminal and its kids,
//! if any, are its widget annotations.
//!
//! `/FT`, `/Ff`, `/V`, `/DV` and `/DA` are inheritable (Table 220): a field
//! without its own entry takes the nearest ancestor's value. A variable-text
//! field with no `/DA` anywhere in its chain uses the form's `/DA`.

use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::object::{Dictionary, Object, ObjectRef};
use bitflags::bitflags;
use serde::Serialize;
use std::collections::HashSet;

bitflags! {
    /// Field flags (`/Ff`).
    ///
    /// Per PDF spec Tables 221, 226, 228 and 230. Bit positions are shared
    /// across field types; which ones apply depends on `/FT`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldFlags: u32 {
        /// Bit 1: Field is read-only
        const READ_ONLY = 1 << 0;
        /// Bit 2: Field is required
        const REQUIRED = 1 << 1;
        /// Bit 3: Field should not be exported
        const NO_EXPORT = 1 << 2;

        /// Bit 13: Text may include multiple lines
        const MULTILINE = 1 << 12;
        /// Bit 14: Text should be displayed as asterisks
        const PASSWORD = 1 << 13;
        /// Bit 15: (checkbox/radio) At least one button must be on
        const NO_TOGGLE_TO_OFF = 1 << 14;
        /// Bit 16: Radio button
        const RADIO = 1 << 15;
        /// Bit 17: Push button
        const PUSHBUTTON = 1 << 16;
        /// Bit 18: Combo box; list box if clear
        const COMBO = 1 << 17;
        /// Bit 19: (combo) User may enter custom text
        const EDIT = 1 << 18;
        /// Bit 20: Options should be sorted
        const SORT = 1 << 19;
        /// Bit 21: Text is a file path
        const FILE_SELECT = 1 << 20;
        /// Bit 22: (list) Multiple selection
        const MULTI_SELECT = 1 << 21;
        /// Bit 23: No spell check
        const DO_NOT_SPELL_CHECK = 1 << 22;
        /// Bit 24: Text does not scroll
        const DO_NOT_SCROLL = 1 << 23;
        /// Bit 25: Comb field
        const COMB = 1 << 24;
        /// Bit 26: Rich text (Tx) or radios in unison (Btn)
        const RICH_TEXT = 1 << 25;
        /// Bit 27: Commit choice on selection change
        const COMMIT_ON_SEL_CHANGE = 1 << 26;
    }
}

impl FieldFlags {
    /// Flags from an `/Ff` integer; unknown bits are kept.
    pub fn from_pdf(value: i64) -> Self {
        Self::from_bits_retain(value as u32)
    }
}

/// Button refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ButtonKind {
    /// Push button (bit 17)
    PushButton,
    /// Checkbox
    Checkbox,
    /// Radio button group (bit 16)
    Radio,
}

/// Choice refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChoiceKind {
    /// Combo box (bit 18)
    Combo,
    /// List box
    List,
}

/// Terminal field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldKind {
    /// `/Btn`
    Button(ButtonKind),
    /// `/Tx`
    Text,
    /// `/Ch`
    Choice(ChoiceKind),
}

impl FieldKind {
    /// Kind for a field type name and its flags.
    ///
    /// Returns `None` for `/Sig` and unknown types.
    pub fn from_type(field_type: &str, flags: FieldFlags) -> Option<Self> {
        match field_type {
            "Btn" => Some(FieldKind::Button(if flags.contains(FieldFlags::PUSHBUTTON) {
                ButtonKind::PushButton
            } else if flags.contains(FieldFlags::RADIO) {
                ButtonKind::Radio
            } else {
                ButtonKind::Checkbox
            })),
            "Tx" => Some(FieldKind::Text),
            "Ch" => Some(FieldKind::Choice(if flags.contains(FieldFlags::COMBO) {
                ChoiceKind::Combo
            } else {
                ChoiceKind::List
            })),
            _ => None,
        }
    }

    /// Whether the field renders text with a default appearance.
    pub fn is_variable_text(&self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Choice(_))
    }
}

/// Field value from `/V` or `/DV`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum FieldValue {
    /// Text string value
    Text(String),
    /// Boolean value (checkbox on/off)
    Boolean(bool),
    /// Name value (radio state, choice export value)
    Name(String),
    /// Multiple values (multi-select list boxes)
    Array(Vec<String>),
    /// No value present
    #[default]
    None,
}

impl FieldValue {
    /// Parse a value object for a field of the given kind.
    pub fn from_object(obj: &Object, kind: Option<FieldKind>) -> Self {
        match obj {
            Object::String(_) => obj.as_text_string().map(FieldValue::Text).unwrap_or_default(),
            Object::Name(name) => match (kind, name.as_str()) {
                (Some(FieldKind::Button(ButtonKind::Checkbox)), "Yes" | "On") => FieldValue::Boolean(true),
                (Some(FieldKind::Button(ButtonKind::Checkbox)), "Off") => FieldValue::Boolean(false),
                _ => FieldValue::Name(name.clone()),
            },
            Object::Array(items) => FieldValue::Array(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Object::String(_) => item.as_text_string(),
                        Object::Name(name) => Some(name.clone()),
                        _ => None,
                    })
                    .collect(),
            ),
            Object::Boolean(b) => FieldValue::Boolean(*b),
            _ => FieldValue::None,
        }
    }
}

/// Terminal or non-terminal part of a field.
#[derive(Debug, Clone)]
pub enum FieldNode {
    /// Editable field with its widget annotations
    Terminal {
        /// Field kind
        kind: FieldKind,
        /// Widget annotations, references where indirect
        widgets: Vec<Object>,
    },
    /// Grouping field
    NonTerminal {
        /// Child fields in `/Kids` order
        children: Vec<Field>,
    },
}

/// A form field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Reference of the field dictionary, when indirect
    pub object_ref: Option<ObjectRef>,
    /// Field dictionary
    pub dict: Dictionary,
    /// Partial name (`/T`), empty when absent
    pub partial_name: String,
    /// Fully qualified name
    pub qualified_name: String,
    /// Effective field flags (inherited)
    pub flags: FieldFlags,
    /// Effective value (inherited)
    pub value: FieldValue,
    /// Effective default value (inherited)
    pub default_value: FieldValue,
    /// Export values from `/Opt`
    pub export_values: Vec<String>,
    /// Effective default appearance (inherited, form `/DA` as last resort)
    pub default_appearance: Option<String>,
    /// Terminal or non-terminal part
    pub node: FieldNode,
}

impl Field {
    /// Whether this is an editable (terminal) field.
    pub fn is_terminal(&self) -> bool {
        matches!(self.node, FieldNode::Terminal { .. })
    }

    /// Kind of a terminal field.
    pub fn kind(&self) -> Option<FieldKind> {
        match &self.node {
            FieldNode::Terminal { kind, .. } => Some(*kind),
            FieldNode::NonTerminal { .. } => None,
        }
    }

    /// Whether this is a text or choice field.
    pub fn is_variable_text(&self) -> bool {
        self.kind().is_some_and(|kind| kind.is_variable_text())
    }

    /// Child fields (empty for terminal fields).
    pub fn children(&self) -> &[Field] {
        match &self.node {
            FieldNode::NonTerminal { children } => children,
            FieldNode::Terminal { .. } => &[],
        }
    }

    /// Widget annotations (empty for non-terminal fields).
    pub fn widgets(&self) -> &[Object] {
        match &self.node {
            FieldNode::Terminal { widgets, .. } => widgets,
            FieldNode::NonTerminal { .. } => &[],
        }
    }

    /// The object `/Fields` or `/Kids` should hold for this field.
    pub fn as_object(&self) -> Object {
        match self.object_ref {
            Some(r) => Object::Reference(r),
            None => Object::Dictionary(self.dict.clone()),
        }
    }
}

/// All fields of a forest in pre-order (each field before its children).
pub fn walk_pre_order(fields: &[Field]) -> Vec<&Field> {
    let mut out = Vec::new();
    let mut stack: Vec<&Field> = fields.iter().rev().collect();
    while let Some(field) = stack.pop() {
        out.push(field);
        stack.extend(field.children().iter().rev());
    }
    out
}

/// Join a parent's qualified name and a partial name.
///
/// Empty partial names contribute nothing.
pub fn qualify(parent: &str, partial: &str) -> String {
    match (parent.is_empty(), partial.is_empty()) {
        (true, _) => partial.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{}.{}", parent, partial),
    }
}

/// Partial name (`/T`) of a field dictionary.
pub fn partial_name(doc: &PdfDocument, dict: &Dictionary) -> String {
    dict.get("T")
        .and_then(|t| doc.resolve(t).ok())
        .and_then(|t| t.as_text_string())
        .unwrap_or_default()
}

/// Inheritable entries passed from a field to its kids.
#[derive(Debug, Clone, Default)]
struct Inherited {
    qualified_name: String,
    field_type: Option<String>,
    flags: Option<i64>,
    value: Option<Object>,
    default_value: Option<Object>,
    default_appearance: Option<String>,
}

impl Inherited {
    fn merge(&self, doc: &PdfDocument, dict: &Dictionary, qualified_name: String) -> Self {
        let own = |key: &str| dict.get(key).and_then(|obj| doc.resolve(obj).ok()).filter(|obj| !obj.is_null());
        Self {
            qualified_name,
            field_type: own("FT")
                .and_then(|ft| ft.as_name().map(str::to_string))
                .or_else(|| self.field_type.clone()),
            flags: own("Ff").and_then(|ff| ff.as_integer()).or(self.flags),
            value: own("V").or_else(|| self.value.clone()),
            default_value: own("DV").or_else(|| self.default_value.clone()),
            default_appearance: own("DA")
                .and_then(|da| da.as_text_string())
                .or_else(|| self.default_appearance.clone()),
        }
    }
}

/// Builds [`Field`] trees from field dictionaries.
#[derive(Debug)]
pub struct FieldFactory<'a> {
    doc: &'a PdfDocument,
    form_default_appearance: Option<String>,
    max_depth: usize,
}

impl<'a> FieldFactory<'a> {
    /// Create a factory.
    ///
    /// `form_default_appearance` is the form's `/DA`; `max_depth` bounds
    /// `/Kids` nesting.
    pub fn new(doc: &'a PdfDocument, form_default_appearance: Option<String>, max_depth: usize) -> Self {
        Self {
            doc,
            form_default_appearance,
            max_depth,
        }
    }

    /// Build the field for a root field object (reference or inline dictionary).
    ///
    /// Returns `Ok(None)` for a terminal field whose type is missing or not
    /// one of `/Btn`, `/Tx`, `/Ch`.
    pub fn build(&self, object: &Object) -> Result<Option<Field>> {
        let mut visited = HashSet::new();
        self.build_node(object, &Inherited::default(), 0, &mut visited)
    }

    fn build_node(
        &self,
        object: &Object,
        parent: &Inherited,
        depth: usize,
        visited: &mut HashSet<ObjectRef>,
    ) -> Result<Option<Field>> {
        if depth > self.max_depth {
            return Err(Error::RecursionLimitExceeded(self.max_depth));
        }
        let object_ref = object.as_reference();
        if let Some(r) = object_ref {
            if !visited.insert(r) {
                return Err(Error::CircularReference(r));
            }
        }

        let dict = self.doc.resolve_dict(object)?;
        let partial_name = partial_name(self.doc, &dict);
        let inherited = parent.merge(
            self.doc,
            &dict,
            qualify(&parent.qualified_name, &partial_name),
        );

        let kids: Vec<(Object, Option<Dictionary>)> = match dict.get("Kids") {
            Some(kids) => match self.doc.resolve(kids)? {
                Object::Array(items) => items
                    .into_iter()
                    .map(|kid| {
                        let kid_dict = self.doc.resolve_dict(&kid).ok();
                        (kid, kid_dict)
                    })
                    .collect(),
                _ => Vec::new(),
            },
            None => Vec::new(),
        };
        let non_terminal = kids
            .iter()
            .any(|(_, kid)| kid.as_ref().is_some_and(|k| k.contains_key("T")));

        let flags = FieldFlags::from_pdf(inherited.flags.unwrap_or(0));
        let node = if non_terminal {
            let mut children = Vec::new();
            for (kid, _) in &kids {
                match self.build_node(kid, &inherited, depth + 1, visited) {
                    Ok(Some(child)) => children.push(child),
                    Ok(None) => {},
                    Err(e) => log::warn!("skipping kid of field '{}': {}", inherited.qualified_name, e),
                }
            }
            FieldNode::NonTerminal { children }
        } else {
            let kind = match inherited.field_type.as_deref().map(|ft| (ft, FieldKind::from_type(ft, flags))) {
                Some((_, Some(kind))) => kind,
                Some((ft, None)) => {
                    log::debug!("field '{}' has unsupported type /{}", inherited.qualified_name, ft);
                    return Ok(None);
                },
                None => {
                    log::debug!("field '{}' has no field type", inherited.qualified_name);
                    return Ok(None);
                },
            };
            let widgets = if kids.is_empty() {
                vec![object.clone()]
            } else {
                kids.into_iter().map(|(kid, _)| kid).collect()
            };
            FieldNode::Terminal { kind, widgets }
        };

        let kind = match &node {
            FieldNode::Terminal { kind, .. } => Some(*kind),
            FieldNode::NonTerminal { .. } => None,
        };
        let default_appearance = inherited.default_appearance.clone().or_else(|| {
            kind.filter(FieldKind::is_variable_text)
                .and(self.form_default_appearance.clone())
        });

        Ok(Some(Field {
            object_ref,
            export_values: self.export_values(&dict),
            value: inherited
                .value
                .as_ref()
                .map(|v| FieldValue::from_object(v, kind))
                .unwrap_or_default(),
            default_value: inherited
                .default_value
                .as_ref()
                .map(|v| FieldValue::from_object(v, kind))
                .unwrap_or_default(),
            dict,
            partial_name,
            qualified_name: inherited.qualified_name,
            flags,
            default_appearance,
            node,
        }))
    }

    /// `/Opt` entries: plain strings, or `[export display]` pairs.
    fn export_values(&self, dict: &Dictionary) -> Vec<String> {
        let Some(opt) = dict.get("Opt").and_then(|o| self.doc.resolve(o).ok()) else {
            return Vec::new();
        };
        opt.as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Object::Array(pair) => pair.first().and_then(|e| e.as_text_string()),
                        other => other.as_text_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
