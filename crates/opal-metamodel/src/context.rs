//! Metamodel Context
//!
//! The external collaborators and configuration the metamodel build needs,
//! constructed once at bootstrap and passed by reference.

use std::fmt;
use std::sync::Arc;

use opal_core::i18n::{PassThroughTranslator, TranslationService};

use crate::config::IntrospectionConfig;
use crate::facets::value::ValueSemanticsRegistry;
use crate::object::bookmark::{BookmarkResolver, NoBookmarks};

/// Collaborator bundle for the metamodel build.
#[derive(Clone)]
pub struct MetamodelContext {
    /// Translation seam for user-facing text
    pub translation: Arc<dyn TranslationService>,
    /// Persistence seam for entity bookmarks
    pub bookmark_resolver: Arc<dyn BookmarkResolver>,
    /// Value semantics registered at bootstrap
    pub value_semantics: Arc<ValueSemanticsRegistry>,
    /// Introspection tunables
    pub config: IntrospectionConfig,
}

impl MetamodelContext {
    /// Context with the given collaborators
    pub fn new(
        translation: Arc<dyn TranslationService>,
        bookmark_resolver: Arc<dyn BookmarkResolver>,
    ) -> Self {
        Self {
            translation,
            bookmark_resolver,
            value_semantics: Arc::new(ValueSemanticsRegistry::new()),
            config: IntrospectionConfig::default(),
        }
    }

    /// Replace the introspection configuration
    pub fn with_config(mut self, config: IntrospectionConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for MetamodelContext {
    fn default() -> Self {
        Self::new(Arc::new(PassThroughTranslator), Arc::new(NoBookmarks))
    }
}

impl fmt::Debug for MetamodelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetamodelContext")
            .field("config", &self.config)
            .finish()
    }
}
