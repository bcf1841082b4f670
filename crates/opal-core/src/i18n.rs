//! Translation Seam
//!
//! Facets that produce user-facing text call out through
//! [`TranslationService`] with an identifier-derived context string. The
//! metamodel never performs translation itself; catalogs live with the
//! hosting application.

use std::fmt;

/// External service resolving user-facing text for a translation context.
pub trait TranslationService: Send + Sync {
    /// Translate `text` within the given context, returning the text
    /// unchanged when no translation exists
    fn translate(&self, context: &str, text: &str) -> String;
}

/// Identity implementation, used when no catalog is wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughTranslator;

impl TranslationService for PassThroughTranslator {
    fn translate(&self, _context: &str, text: &str) -> String {
        text.to_string()
    }
}

/// Translatable text with named `{placeholder}` arguments, substituted
/// after the pattern has been translated.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatableString {
    pattern: String,
    args: Vec<(String, String)>,
}

impl TranslatableString {
    /// Create from a pattern
    pub fn tr(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            args: Vec::new(),
        }
    }

    /// Bind a named placeholder
    pub fn with_arg(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.args.push((name.into(), value.to_string()));
        self
    }

    /// The untranslated pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Translate the pattern via the given service, then substitute
    /// placeholders
    pub fn translate(&self, service: &dyn TranslationService, context: &str) -> String {
        let mut text = service.translate(context, &self.pattern);
        for (name, value) in &self.args {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }
}
