//! Object Specifications
//!
//! An [`ObjectSpecification`] is the built, cached metamodel description of
//! one domain type: its bean sort, class-level facets, and member specs,
//! each of which owns its own facets. Specs are mutable while the loader
//! builds them and frozen before they are cached.

use std::sync::Arc;

use opal_core::ident::{natural_name, Identifier};
use opal_core::reflect::decl::{MethodModel, TypeKey};
use opal_core::reflect::pojo::Pojo;

use crate::facetapi::{Facet, FacetHolder};
use crate::facets::{IconFacet, TitleFacet};

/// What kind of domain type a specification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeanSort {
    /// Value type with value semantics
    Value,
    /// Injectable domain service
    Service,
    /// View-model
    ViewModel,
    /// Persistence-managed entity
    Entity,
    /// Mixin contributing members to another type
    Mixin,
    /// Collection type (non-scalar)
    Collection,
    /// Abstract type
    Abstract,
    /// Anything else concrete
    Other,
}

impl BeanSort {
    /// Value type
    pub fn is_value(&self) -> bool {
        matches!(self, BeanSort::Value)
    }

    /// Injectable service
    pub fn is_injectable(&self) -> bool {
        matches!(self, BeanSort::Service)
    }

    /// View-model
    pub fn is_view_model(&self) -> bool {
        matches!(self, BeanSort::ViewModel)
    }

    /// Entity
    pub fn is_entity(&self) -> bool {
        matches!(self, BeanSort::Entity)
    }

    /// Mixin
    pub fn is_mixin(&self) -> bool {
        matches!(self, BeanSort::Mixin)
    }

    /// Collection-typed, i.e. non-scalar
    pub fn is_non_scalar(&self) -> bool {
        matches!(self, BeanSort::Collection)
    }

    /// Abstract type
    pub fn is_abstract(&self) -> bool {
        matches!(self, BeanSort::Abstract)
    }

    /// Stable name for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            BeanSort::Value => "value",
            BeanSort::Service => "service",
            BeanSort::ViewModel => "view-model",
            BeanSort::Entity => "entity",
            BeanSort::Mixin => "mixin",
            BeanSort::Collection => "collection",
            BeanSort::Abstract => "abstract",
            BeanSort::Other => "other",
        }
    }
}

/// Distinguishes scalar from collection members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Single-valued association
    Property,
    /// Multi-valued association
    Collection,
}

/// A property or collection member spec.
#[derive(Debug)]
pub struct ObjectMember {
    pub(crate) kind: MemberKind,
    pub(crate) identifier: Identifier,
    pub(crate) name: Arc<str>,
    pub(crate) element_type: TypeKey,
    pub(crate) method: MethodModel,
    pub(crate) facets: FacetHolder,
}

impl ObjectMember {
    /// Property or collection
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// The member's identifier
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Member name, derived from its getter
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member's value type, or element type for collections
    pub fn element_type(&self) -> &TypeKey {
        &self.element_type
    }

    /// The backing getter
    pub fn method(&self) -> &MethodModel {
        &self.method
    }

    /// The member's facets
    pub fn facets(&self) -> &FacetHolder {
        &self.facets
    }

    /// The member's facet of the given kind
    pub fn get_facet<F: Facet>(&self) -> Option<&F> {
        self.facets.get_facet::<F>()
    }
}

/// An action parameter spec.
#[derive(Debug)]
pub struct ActionParameter {
    pub(crate) index: usize,
    pub(crate) param_type: TypeKey,
    pub(crate) facets: FacetHolder,
}

impl ActionParameter {
    /// Zero-based position
    pub fn index(&self) -> usize {
        self.index
    }

    /// Declared parameter type
    pub fn param_type(&self) -> &TypeKey {
        &self.param_type
    }

    /// The parameter's facets
    pub fn facets(&self) -> &FacetHolder {
        &self.facets
    }

    /// The parameter's facet of the given kind
    pub fn get_facet<F: Facet>(&self) -> Option<&F> {
        self.facets.get_facet::<F>()
    }
}

/// An action member spec.
#[derive(Debug)]
pub struct ObjectAction {
    pub(crate) identifier: Identifier,
    pub(crate) name: Arc<str>,
    pub(crate) method: MethodModel,
    pub(crate) parameters: Vec<ActionParameter>,
    pub(crate) return_type: Option<TypeKey>,
    pub(crate) facets: FacetHolder,
}

impl ObjectAction {
    /// The action's identifier
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Action name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backing method
    pub fn method(&self) -> &MethodModel {
        &self.method
    }

    /// Parameter specs, in declaration order
    pub fn parameters(&self) -> &[ActionParameter] {
        &self.parameters
    }

    /// Declared return type
    pub fn return_type(&self) -> Option<&TypeKey> {
        self.return_type.as_ref()
    }

    /// The action's facets
    pub fn facets(&self) -> &FacetHolder {
        &self.facets
    }

    /// The action's facet of the given kind
    pub fn get_facet<F: Facet>(&self) -> Option<&F> {
        self.facets.get_facet::<F>()
    }
}

/// The built, cached metamodel description of one domain type.
#[derive(Debug)]
pub struct ObjectSpecification {
    pub(crate) type_key: TypeKey,
    pub(crate) identifier: Identifier,
    pub(crate) bean_sort: BeanSort,
    pub(crate) is_abstract: bool,
    pub(crate) facets: FacetHolder,
    pub(crate) properties: Vec<ObjectMember>,
    pub(crate) collections: Vec<ObjectMember>,
    pub(crate) actions: Vec<ObjectAction>,
    pub(crate) support_methods: Vec<MethodModel>,
}

impl ObjectSpecification {
    /// The described type
    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    /// The class identifier
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// What kind of domain type this is
    pub fn bean_sort(&self) -> BeanSort {
        self.bean_sort
    }

    /// Whether the described type is abstract
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Value type
    pub fn is_value(&self) -> bool {
        self.bean_sort.is_value()
    }

    /// Injectable service
    pub fn is_injectable(&self) -> bool {
        self.bean_sort.is_injectable()
    }

    /// View-model
    pub fn is_view_model(&self) -> bool {
        self.bean_sort.is_view_model()
    }

    /// Entity
    pub fn is_entity(&self) -> bool {
        self.bean_sort.is_entity()
    }

    /// Mixin
    pub fn is_mixin(&self) -> bool {
        self.bean_sort.is_mixin()
    }

    /// Collection-typed, i.e. describes a non-scalar feature
    pub fn is_non_scalar(&self) -> bool {
        self.bean_sort.is_non_scalar()
    }

    /// Class-level facets
    pub fn facets(&self) -> &FacetHolder {
        &self.facets
    }

    /// The class-level facet of the given kind
    pub fn get_facet<F: Facet>(&self) -> Option<&F> {
        self.facets.get_facet::<F>()
    }

    /// Property member specs
    pub fn properties(&self) -> &[ObjectMember] {
        &self.properties
    }

    /// Collection member specs
    pub fn collections(&self) -> &[ObjectMember] {
        &self.collections
    }

    /// Action member specs
    pub fn actions(&self) -> &[ObjectAction] {
        &self.actions
    }

    /// Property by name
    pub fn property(&self, name: &str) -> Option<&ObjectMember> {
        self.properties.iter().find(|m| m.name() == name)
    }

    /// Collection by name
    pub fn collection(&self, name: &str) -> Option<&ObjectMember> {
        self.collections.iter().find(|m| m.name() == name)
    }

    /// Action by name
    pub fn action(&self, name: &str) -> Option<&ObjectAction> {
        self.actions.iter().find(|a| a.name() == name)
    }

    /// Support methods consumed during metamodel build; these back
    /// imperative facets and must not be shown as ordinary members
    pub fn support_methods(&self) -> &[MethodModel] {
        &self.support_methods
    }

    /// The title of a wrapped instance, via the title facet
    pub fn title_of(&self, target: Option<&Pojo>) -> String {
        match self.get_facet::<TitleFacet>() {
            Some(facet) => facet.title(target),
            None => natural_name(self.type_key.simple_name()),
        }
    }

    /// The icon name of a wrapped instance, via the icon facet
    pub fn icon_name_of(&self, target: &Pojo) -> Option<String> {
        self.get_facet::<IconFacet>()
            .and_then(|facet| facet.icon_name(target))
    }

    /// Close every facet holder in the spec graph for mutation
    pub(crate) fn freeze(&mut self) {
        self.facets.freeze();
        for member in self.properties.iter_mut().chain(self.collections.iter_mut()) {
            member.facets.freeze();
        }
        for action in &mut self.actions {
            action.facets.freeze();
            for parameter in &mut action.parameters {
                parameter.facets.freeze();
            }
        }
    }
}
