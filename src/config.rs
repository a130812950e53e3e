//! Configuration for the AcroForm repair pass.

/// Options controlling how orphaned widgets are turned back into fields.
///
/// # Example
///
/// ```
/// use pdf_formfix::config::FixupOptions;
///
/// // Defaults: import widget fonts, resolve missing fonts, depth limit 100
/// let defaults = FixupOptions::default();
/// assert!(defaults.resolve_missing_fonts);
///
/// // Only rebuild the field tree, leave resources alone
/// let fields_only = FixupOptions::default()
///     .with_widget_font_import(false)
///     .with_font_fallback(false);
/// assert!(!fields_only.import_widget_fonts);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixupOptions {
    /// Maximum number of `/Parent` hops from a widget to its root field.
    ///
    /// Chains longer than this are treated as broken. PDF spec
    /// ISO 32000-1:2008, Section H.1 suggests 100 levels of nesting.
    pub max_parent_depth: usize,

    /// Maximum `/Kids` nesting when building a field subtree.
    pub max_field_depth: usize,

    /// Copy fonts from widget appearance resources into `/AcroForm /DR`.
    pub import_widget_fonts: bool,

    /// Look up substitute fonts for default appearances that name a missing font.
    pub resolve_missing_fonts: bool,
}

impl Default for FixupOptions {
    fn default() -> Self {
        Self::lenient()
    }
}

impl FixupOptions {
    /// Lenient mode: generous depth limits, all repairs enabled.
    pub fn lenient() -> Self {
        Self {
            max_parent_depth: 100,
            max_field_depth: 100,
            import_widget_fonts: true,
            resolve_missing_fonts: true,
        }
    }

    /// Strict mode: shallow hierarchies only.
    ///
    /// Real-world forms rarely nest deeper than a handful of levels;
    /// anything beyond 16 is dropped as damaged.
    pub fn strict() -> Self {
        Self {
            max_parent_depth: 16,
            max_field_depth: 16,
            ..Self::lenient()
        }
    }

    /// Set the maximum parent chain length.
    pub fn with_max_parent_depth(mut self, depth: usize) -> Self {
        self.max_parent_depth = depth;
        self
    }

    /// Set the maximum field subtree depth.
    pub fn with_max_field_depth(mut self, depth: usize) -> Self {
        self.max_field_depth = depth;
        self
    }

    /// Enable or disable importing widget appearance fonts.
    pub fn with_widget_font_import(mut self, enable: bool) -> Self {
        self.import_widget_fonts = enable;
        self
    }

    /// Enable or disable fallback font resolution.
    pub fn with_font_fallback(mut self, enable: bool) -> Self {
        self.resolve_missing_fonts = enable;
        self
    }
}
