//! Diagnostics: structural and semantic error reporting.
//!
//! Only the toplevel document keeps diagnostics. Ranges are byte ranges
//! in that document's text; hosts convert them with
//! [`LineIndex`](crate::base::LineIndex).

use std::sync::Arc;

use crate::base::TextRange;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable code from [`codes`].
    pub code: &'static str,
    pub message: Arc<str>,
    pub range: TextRange,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: &'static str, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            range,
        }
    }

    pub fn error(code: &'static str, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, code, range, message)
    }

    pub fn warning(code: &'static str, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, code, range, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes.
///
/// ## Error Code Ranges
///
/// - **E0001-E0099**: Structural errors and invalid values
/// - **W0001-W0099**: Unresolved references and suspicious usage
pub mod codes {
    // ========================================================================
    // ERRORS (E0001-E0099)
    // ========================================================================

    /// Element not allowed at this position.
    pub const UNKNOWN_ELEMENT: &str = "E0001";
    /// Attribute not declared for this element.
    pub const UNKNOWN_ATTRIBUTE: &str = "E0002";
    /// Required attribute missing.
    pub const MISSING_REQUIRED: &str = "E0003";
    /// Element may only appear once.
    pub const DUPLICATE_CHILD: &str = "E0004";
    /// Element is out of order among its siblings.
    pub const INVALID_CHILD_ORDER: &str = "E0005";
    /// Value does not match its declared kind.
    pub const INVALID_VALUE: &str = "E0006";
    /// Expression syntax error.
    pub const EXPRESSION_ERROR: &str = "E0007";
    /// Malformed XML.
    pub const XML_ERROR: &str = "E0008";
    /// Conflicting attributes or children.
    pub const INVALID_COMBINATION: &str = "E0009";

    // ========================================================================
    // WARNINGS (W0001-W0099)
    // ========================================================================

    /// Import could not be resolved.
    pub const UNRESOLVED_IMPORT: &str = "W0001";
    /// SDK could not be resolved.
    pub const UNRESOLVED_SDK: &str = "W0002";
    /// Reference to a symbol no file defines.
    pub const UNKNOWN_SYMBOL: &str = "W0003";
    /// Assignment to a reserved property.
    pub const RESERVED_PROPERTY: &str = "W0004";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during a walk.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn unknown_element(&mut self, range: TextRange, name: &str) {
        self.add(Diagnostic::error(
            codes::UNKNOWN_ELEMENT,
            range,
            format!("Unknown element '{name}'"),
        ));
    }

    pub fn unknown_attribute(&mut self, range: TextRange, name: &str) {
        self.add(Diagnostic::error(
            codes::UNKNOWN_ATTRIBUTE,
            range,
            format!("Unknown attribute '{name}'"),
        ));
    }

    pub fn missing_required(&mut self, range: TextRange, element: &str, attribute: &str) {
        self.add(Diagnostic::error(
            codes::MISSING_REQUIRED,
            range,
            format!("Element '{element}' is missing required attribute '{attribute}'"),
        ));
    }

    pub fn invalid_value(&mut self, range: TextRange, message: impl std::fmt::Display) {
        self.add(Diagnostic::error(codes::INVALID_VALUE, range, message.to_string()));
    }

    pub fn unresolved_import(&mut self, range: TextRange, project: &str) {
        self.add(Diagnostic::warning(
            codes::UNRESOLVED_IMPORT,
            range,
            format!("Could not resolve import '{project}'"),
        ));
    }

    pub fn unresolved_sdk(&mut self, range: TextRange, sdk: &str) {
        self.add(Diagnostic::warning(
            codes::UNRESOLVED_SDK,
            range,
            format!("Could not resolve SDK '{sdk}'"),
        ));
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take the diagnostics ordered by position.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|d| (d.range.start(), d.range.end(), d.severity));
        self.diagnostics
    }
}
