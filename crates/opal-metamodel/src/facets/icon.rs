//! Icon Facet

use std::any::Any;

use opal_core::reflect::decl::MethodModel;
use opal_core::reflect::pojo::{Invoked, Pojo};

use crate::facetapi::{Facet, ImperativeAspect, Intent};

/// Supplies the icon name for a wrapped domain object, backed by a
/// declared `iconName()` support method.
#[derive(Debug)]
pub struct IconFacet {
    aspect: ImperativeAspect,
}

impl IconFacet {
    /// Backed by a declared `iconName()` support method
    pub fn via_method(method: MethodModel) -> Self {
        Self {
            aspect: ImperativeAspect::single(method, Intent::UiHint),
        }
    }

    /// The icon name for the given instance, if the support method yields
    /// one
    pub fn icon_name(&self, target: &Pojo) -> Option<String> {
        match self.aspect.method().invoke(target, &[]) {
            Some(Invoked::Text(name)) => Some(name),
            _ => None,
        }
    }
}

impl Facet for IconFacet {
    fn kind_name(&self) -> &'static str {
        "icon"
    }

    fn imperative(&self) -> Option<&ImperativeAspect> {
        Some(&self.aspect)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
