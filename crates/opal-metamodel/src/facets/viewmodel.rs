//! View-Model Facet

use std::any::Any;

use sha2::{Digest, Sha256};

use opal_core::reflect::decl::{MethodModel, TypeKey};
use opal_core::reflect::pojo::{Invoked, Pojo};

use crate::facetapi::{Facet, ImperativeAspect, Intent};
use crate::object::bookmark::Bookmark;

/// Marks a specification as a view-model whose state travels with its
/// bookmark. The bookmark identifier is a digest of the instance's memento,
/// so it changes whenever the state does.
#[derive(Debug)]
pub struct ViewModelFacet {
    memento: Option<ImperativeAspect>,
}

impl ViewModelFacet {
    /// Backed by a declared `memento()` support method
    pub fn via_memento_method(method: MethodModel) -> Self {
        Self {
            memento: Some(ImperativeAspect::single(method, Intent::LifecycleEvent)),
        }
    }

    /// Stateless view-model; the bookmark is constant
    pub fn stateless() -> Self {
        Self { memento: None }
    }

    /// The current memento string for an instance
    pub fn memento(&self, pojo: &Pojo) -> String {
        match &self.memento {
            Some(aspect) => match aspect.method().invoke(pojo, &[]) {
                Some(Invoked::Text(state)) => state,
                _ => String::new(),
            },
            None => String::new(),
        }
    }

    /// The refreshable bookmark for an instance, derived from its current
    /// state
    pub fn bookmark_for(&self, type_key: &TypeKey, pojo: &Pojo) -> Bookmark {
        let state = self.memento(pojo);
        let digest = Sha256::digest(state.as_bytes());
        Bookmark::new(type_key.name(), hex::encode(digest))
    }
}

impl Facet for ViewModelFacet {
    fn kind_name(&self) -> &'static str {
        "view-model"
    }

    fn imperative(&self) -> Option<&ImperativeAspect> {
        self.memento.as_ref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
