//! Facet Factory Contract
//!
//! Factories run in the programming model's snapshot order; each receives
//! the class model and the open facet holder for the element being
//! processed. Support methods a factory recognizes are recorded with the
//! [`MethodRemover`] so later discovery skips them.

use opal_core::ident::Identifier;
use opal_core::reflect::cache::{ClassCache, ClassModel};
use opal_core::reflect::decl::{MethodModel, TypeKey};

use crate::facetapi::FacetHolder;
use crate::progmodel::MetaModelRefiner;

/// Records support methods consumed during introspection, so they are
/// excluded from member discovery and can be reported afterwards.
#[derive(Debug, Default)]
pub struct MethodRemover {
    removed: Vec<MethodModel>,
}

impl MethodRemover {
    /// Create an empty remover
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a method as consumed
    pub fn remove(&mut self, method: &MethodModel) {
        if !self.is_removed(method) {
            self.removed.push(method.clone());
        }
    }

    /// Check whether a method has been consumed
    pub fn is_removed(&self, method: &MethodModel) -> bool {
        self.removed.iter().any(|m| m.same_signature(method))
    }

    /// The consumed methods, in consumption order
    pub fn removed(&self) -> &[MethodModel] {
        &self.removed
    }

    /// Consume the remover, yielding the removed methods
    pub fn into_removed(self) -> Vec<MethodModel> {
        self.removed
    }
}

/// Context for class-level facet contribution.
pub struct ProcessClassContext<'a> {
    /// Cache the declarations resolve through
    pub cache: &'a ClassCache,
    /// The inspected type's structural facts
    pub class_model: &'a ClassModel,
    /// The specification's open facet holder
    pub facets: &'a mut FacetHolder,
    /// Consumed-method sink
    pub remover: &'a mut MethodRemover,
}

/// Context for member-level (property, collection, action) contribution.
pub struct ProcessMemberContext<'a> {
    /// Cache the declarations resolve through
    pub cache: &'a ClassCache,
    /// The inspected type's structural facts
    pub class_model: &'a ClassModel,
    /// The member's name
    pub member_name: &'a str,
    /// The member's backing method (accessor or action method)
    pub method: &'a MethodModel,
    /// The member's identifier
    pub identifier: &'a Identifier,
    /// The member's open facet holder
    pub facets: &'a mut FacetHolder,
    /// Consumed-method sink
    pub remover: &'a mut MethodRemover,
}

/// Context for action-parameter contribution.
pub struct ProcessParameterContext<'a> {
    /// Cache the declarations resolve through
    pub cache: &'a ClassCache,
    /// The inspected type's structural facts
    pub class_model: &'a ClassModel,
    /// The owning action's name
    pub action_name: &'a str,
    /// The owning action's identifier
    pub identifier: &'a Identifier,
    /// Zero-based parameter index
    pub param_index: usize,
    /// The parameter's declared type
    pub param_type: &'a TypeKey,
    /// The parameter's open facet holder
    pub facets: &'a mut FacetHolder,
    /// Consumed-method sink
    pub remover: &'a mut MethodRemover,
}

/// A contribution to the metamodel build pipeline.
///
/// Default implementations contribute nothing, so a factory only overrides
/// the callbacks relevant to it.
pub trait FacetFactory: Send + Sync {
    /// Stable factory name, used by init filters and diagnostics
    fn name(&self) -> &'static str;

    /// Contribute class-level facets
    fn process_class(&self, _ctx: &mut ProcessClassContext<'_>) {}

    /// Contribute property facets
    fn process_property(&self, _ctx: &mut ProcessMemberContext<'_>) {}

    /// Contribute collection facets
    fn process_collection(&self, _ctx: &mut ProcessMemberContext<'_>) {}

    /// Contribute action facets
    fn process_action(&self, _ctx: &mut ProcessMemberContext<'_>) {}

    /// Contribute action-parameter facets
    fn process_action_parameter(&self, _ctx: &mut ProcessParameterContext<'_>) {}

    /// When this factory also refines the programming model during init,
    /// expose the refiner side
    fn as_refiner(&self) -> Option<&dyn MetaModelRefiner> {
        None
    }
}
