//! Action Invocation Facet

use std::any::Any;

use opal_core::reflect::decl::{MethodModel, TypeKey};
use opal_core::reflect::pojo::{Invoked, Pojo};

use crate::facetapi::{Facet, ImperativeAspect, Intent};

/// Executes an action's backing method.
#[derive(Debug)]
pub struct ActionInvocationFacet {
    aspect: ImperativeAspect,
    return_type: Option<TypeKey>,
}

impl ActionInvocationFacet {
    /// Backed by the action method itself
    pub fn via_method(method: MethodModel) -> Self {
        let return_type = method.return_type().cloned();
        Self {
            aspect: ImperativeAspect::single(method, Intent::Execute),
            return_type,
        }
    }

    /// The action's declared return type
    pub fn return_type(&self) -> Option<&TypeKey> {
        self.return_type.as_ref()
    }

    /// Invoke the action on the given instance
    pub fn invoke(&self, target: &Pojo, args: &[Pojo]) -> Option<Invoked> {
        self.aspect.method().invoke(target, args)
    }
}

impl Facet for ActionInvocationFacet {
    fn kind_name(&self) -> &'static str {
        "action-invocation"
    }

    fn imperative(&self) -> Option<&ImperativeAspect> {
        Some(&self.aspect)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
