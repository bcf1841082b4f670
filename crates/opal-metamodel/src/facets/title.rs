//! Title Facet
//!
//! Every specification ends up with a title facet: preferably backed by a
//! declared `title()` support method, next by an overriding `toString`,
//! and as a last resort the type's natural name.

use std::any::Any;

use opal_core::reflect::decl::MethodModel;
use opal_core::reflect::pojo::{Invoked, Pojo};

use crate::facetapi::{Facet, ImperativeAspect, Intent};
use crate::facets::TranslationBinding;

/// Computes the user-visible title of a wrapped domain object.
#[derive(Debug)]
pub struct TitleFacet {
    aspect: Option<ImperativeAspect>,
    translation: Option<TranslationBinding>,
    fallback: String,
}

impl TitleFacet {
    /// Backed by a declared `title()` support method
    pub fn via_method(
        method: MethodModel,
        translation: TranslationBinding,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            aspect: Some(ImperativeAspect::single(method, Intent::UiHint)),
            translation: Some(translation),
            fallback: fallback.into(),
        }
    }

    /// Backed by an overriding `toString`
    pub fn via_to_string(method: MethodModel, fallback: impl Into<String>) -> Self {
        Self {
            aspect: Some(ImperativeAspect::single(method, Intent::UiHint)),
            translation: None,
            fallback: fallback.into(),
        }
    }

    /// Fixed fallback title, typically the type's natural name
    pub fn fallback(fallback: impl Into<String>) -> Self {
        Self {
            aspect: None,
            translation: None,
            fallback: fallback.into(),
        }
    }

    /// Whether this facet is backed by a support method
    pub fn is_imperative(&self) -> bool {
        self.aspect.is_some()
    }

    /// The title for the given instance; the fallback when no instance is
    /// at hand or the support method yields nothing usable
    pub fn title(&self, target: Option<&Pojo>) -> String {
        if let (Some(aspect), Some(pojo)) = (&self.aspect, target) {
            match aspect.method().invoke(pojo, &[]) {
                Some(Invoked::Text(text)) => return text,
                Some(Invoked::Translatable(text)) => {
                    if let Some(translation) = &self.translation {
                        return translation.translate(&text);
                    }
                    return text.pattern().to_string();
                }
                _ => {}
            }
        }
        self.fallback.clone()
    }
}

impl Facet for TitleFacet {
    fn kind_name(&self) -> &'static str {
        "title"
    }

    fn imperative(&self) -> Option<&ImperativeAspect> {
        self.aspect.as_ref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
