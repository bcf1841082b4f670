//! Concrete Facets and Facet Factories
//!
//! Facets either hold data contributed from annotations or wrap a declared
//! support method (imperative facets). Facet factories inspect the class
//! model and attach facets to the specification under construction,
//! consuming the support methods they recognize.

pub mod accessor;
pub mod builtin;
pub mod entity;
pub mod factory;
pub mod icon;
pub mod invocation;
pub mod support;
pub mod title;
pub mod value;
pub mod viewmodel;

use std::fmt;
use std::sync::Arc;

use opal_core::i18n::{TranslatableString, TranslationService};

pub use accessor::{CollectionAccessorFacet, PropertyAccessorFacet};
pub use builtin::{
    AccessorFacetFactory, EntityFacetFactory, FallbackFacetFactory, IconFacetViaMethodFactory,
    MemberSupportFacetFactory, TitleFacetViaMethodFactory, ValueFacetFactory,
    ViewModelFacetFactory,
};
pub use entity::EntityFacet;
pub use factory::{
    FacetFactory, MethodRemover, ProcessClassContext, ProcessMemberContext,
    ProcessParameterContext,
};
pub use icon::IconFacet;
pub use invocation::ActionInvocationFacet;
pub use support::{
    ActionParameterChoicesFacet, ActionParameterDefaultsFacet, ActionParameterValidationFacet,
    ActionValidationFacet, DisabledFacetViaMethod, HiddenFacetViaMethod, PropertyValidationFacet,
};
pub use title::TitleFacet;
pub use value::{ValueFacet, ValueSemantics, ValueSemanticsRegistry};
pub use viewmodel::ViewModelFacet;

/// A translation service paired with the context it translates in; carried
/// by facets that surface user-facing text.
#[derive(Clone)]
pub struct TranslationBinding {
    service: Arc<dyn TranslationService>,
    context: String,
}

impl TranslationBinding {
    /// Bind a service to a translation context
    pub fn new(service: Arc<dyn TranslationService>, context: impl Into<String>) -> Self {
        Self {
            service,
            context: context.into(),
        }
    }

    /// The bound translation context
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Translate within the bound context
    pub fn translate(&self, text: &TranslatableString) -> String {
        text.translate(&*self.service, &self.context)
    }
}

impl fmt::Debug for TranslationBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TranslationBinding({})", self.context)
    }
}
