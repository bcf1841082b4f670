//! Managed Objects
//!
//! A [`ManagedObject`] pairs a domain instance with its specification and
//! identity state. Behavior (identity equality, bookmark computation, pojo
//! mutability contract) is fully determined by the object's
//! [`Specialization`]; construction always goes through a
//! specialization-selecting factory, never a bare variant.

pub mod bookmark;

use std::sync::Arc;

use tracing::warn;

use opal_core::reflect::decl::{DeclarationRegistry, TypeKey};
use opal_core::reflect::pojo::Pojo;

use crate::facets::entity::EntityFacet;
use crate::facets::value::ValueFacet;
use crate::facets::viewmodel::ViewModelFacet;
use crate::spec::ObjectSpecification;
use crate::specloader::SpecificationLoader;

pub use bookmark::{Bookmark, BookmarkResolver, NoBookmarks};

/// Type requirements a specialization places on its specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePolicy {
    /// No type information
    NoType,
    /// Type information present, abstract types allowed
    AbstractTypeAllowed,
    /// Type information present, exact types required
    ExactTypeRequired,
}

impl TypePolicy {
    /// No type information
    pub fn is_no_type(&self) -> bool {
        matches!(self, TypePolicy::NoType)
    }

    /// Type information present
    pub fn is_type_required_any(&self) -> bool {
        !self.is_no_type()
    }
}

/// Bookmark requirements a specialization places on its instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkPolicy {
    /// No bookmark
    NoBookmark,
    /// An immutable bookmark
    Immutable,
    /// A refreshable bookmark; state changes manifest as identifier changes
    Refreshable,
}

/// Pojo requirements a specialization places on its instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PojoPolicy {
    /// No pojo
    NoPojo,
    /// Immutable pojo with an immutable object reference
    Immutable,
    /// Stateful pojo with an immutable object reference
    Stateful,
    /// Stateful pojo with a refetchable object reference
    Refetchable,
    /// An unmodifiable collection of pojos
    Packed,
}

/// The policy triple fixed by a specialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecializationPolicy {
    /// Type requirements
    pub type_policy: TypePolicy,
    /// Bookmark requirements
    pub bookmark_policy: BookmarkPolicy,
    /// Pojo requirements
    pub pojo_policy: PojoPolicy,
}

const fn policy(
    type_policy: TypePolicy,
    bookmark_policy: BookmarkPolicy,
    pojo_policy: PojoPolicy,
) -> SpecializationPolicy {
    SpecializationPolicy {
        type_policy,
        bookmark_policy,
        pojo_policy,
    }
}

/// The closed set of managed-object specializations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Specialization {
    /// No specification available
    Unspecified,
    /// Specification without an instance
    Empty,
    /// Immutable value
    Value,
    /// Injectable service
    Service,
    /// View-model with a refreshable bookmark
    Viewmodel,
    /// Persistence-managed entity
    Entity,
    /// Mixin instance
    Mixin,
    /// Any other concrete domain object
    Other,
    /// Unmodifiable collection of managed objects
    Packed,
}

impl Specialization {
    /// All specializations
    pub const ALL: [Self; 9] = [
        Self::Unspecified,
        Self::Empty,
        Self::Value,
        Self::Service,
        Self::Viewmodel,
        Self::Entity,
        Self::Mixin,
        Self::Other,
        Self::Packed,
    ];

    /// The policy triple this specialization fixes
    pub fn policy(&self) -> SpecializationPolicy {
        match self {
            Self::Unspecified => policy(
                TypePolicy::NoType,
                BookmarkPolicy::NoBookmark,
                PojoPolicy::NoPojo,
            ),
            Self::Empty => policy(
                TypePolicy::AbstractTypeAllowed,
                BookmarkPolicy::NoBookmark,
                PojoPolicy::NoPojo,
            ),
            Self::Value => policy(
                TypePolicy::ExactTypeRequired,
                BookmarkPolicy::Immutable,
                PojoPolicy::Immutable,
            ),
            Self::Service => policy(
                TypePolicy::ExactTypeRequired,
                BookmarkPolicy::Immutable,
                PojoPolicy::Immutable,
            ),
            Self::Viewmodel => policy(
                TypePolicy::ExactTypeRequired,
                BookmarkPolicy::Refreshable,
                PojoPolicy::Stateful,
            ),
            Self::Entity => policy(
                TypePolicy::ExactTypeRequired,
                BookmarkPolicy::Immutable,
                PojoPolicy::Refetchable,
            ),
            Self::Mixin => policy(
                TypePolicy::ExactTypeRequired,
                BookmarkPolicy::NoBookmark,
                PojoPolicy::Stateful,
            ),
            Self::Other => policy(
                TypePolicy::ExactTypeRequired,
                BookmarkPolicy::NoBookmark,
                PojoPolicy::Stateful,
            ),
            Self::Packed => policy(
                TypePolicy::AbstractTypeAllowed,
                BookmarkPolicy::NoBookmark,
                PojoPolicy::Packed,
            ),
        }
    }

    /// No specification available
    pub fn is_unspecified(&self) -> bool {
        matches!(self, Self::Unspecified)
    }

    /// A specification is available
    pub fn is_specified(&self) -> bool {
        !self.is_unspecified()
    }

    /// Collection of managed objects
    pub fn is_packed(&self) -> bool {
        matches!(self, Self::Packed)
    }

    /// Infer the specialization for a (spec, pojo) pair; total, evaluated
    /// in strict priority order. An abstract, otherwise unmatched spec
    /// degrades to [`Specialization::Unspecified`] with a warning.
    pub fn infer_from(
        spec: Option<&ObjectSpecification>,
        pojo: Option<&Pojo>,
    ) -> Specialization {
        let Some(spec) = spec else {
            return Self::Unspecified;
        };
        if spec.is_non_scalar() {
            return Self::Packed;
        }
        if pojo.is_none() {
            return Self::Empty;
        }
        if spec.is_value() {
            return Self::Value;
        }
        if spec.is_injectable() {
            return Self::Service;
        }
        if spec.is_view_model() {
            return Self::Viewmodel;
        }
        if spec.is_entity() {
            return Self::Entity;
        }
        if spec.is_mixin() {
            return Self::Mixin;
        }
        if !spec.is_abstract() {
            return Self::Other;
        }
        warn!(type_name = %spec.type_key(), "failed specialization attempt");
        Self::Unspecified
    }
}

/// Construction errors surfaced by the legacy factories.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    /// The pojo's declared type is not assignable to the spec's type
    #[error(
        "pojo not compatible with object specification, expected = {expected}, actual = {actual}"
    )]
    IncompatiblePojo {
        /// The spec's type name
        expected: String,
        /// The pojo's declared type name
        actual: String,
    },
}

/// Whether an entity instance currently has a persistent identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityAttachment {
    /// Persistent, with an immutable bookmark
    Attached(Bookmark),
    /// Not persistent yet; no bookmark
    Detached,
}

/// Runtime wrapper pairing a domain instance with its specification and
/// identity state.
#[derive(Debug)]
pub enum ManagedObject {
    /// No specification available
    Unspecified,
    /// Specification without an instance
    Empty {
        /// The described type
        spec: Arc<ObjectSpecification>,
    },
    /// Immutable value
    Value {
        /// The described type
        spec: Arc<ObjectSpecification>,
        /// The wrapped instance
        pojo: Pojo,
    },
    /// Injectable service
    Service {
        /// The described type
        spec: Arc<ObjectSpecification>,
        /// The wrapped instance
        pojo: Pojo,
    },
    /// View-model with a refreshable bookmark
    Viewmodel {
        /// The described type
        spec: Arc<ObjectSpecification>,
        /// The wrapped instance
        pojo: Pojo,
    },
    /// Persistence-managed entity
    Entity {
        /// The described type
        spec: Arc<ObjectSpecification>,
        /// The wrapped instance
        pojo: Pojo,
        /// Persistent-identity state
        attachment: EntityAttachment,
    },
    /// Mixin instance
    Mixin {
        /// The described type
        spec: Arc<ObjectSpecification>,
        /// The wrapped instance
        pojo: Pojo,
    },
    /// Any other concrete domain object
    Other {
        /// The described type
        spec: Arc<ObjectSpecification>,
        /// The wrapped instance
        pojo: Pojo,
    },
    /// Unmodifiable collection of managed objects
    Packed {
        /// The elements' described type
        element_spec: Arc<ObjectSpecification>,
        /// The wrapped elements
        elements: Vec<ManagedObject>,
    },
}

impl ManagedObject {
    // -- FACTORIES

    /// The Unspecified singleton shape
    pub fn unspecified() -> Self {
        Self::Unspecified
    }

    /// Empty: a spec without an instance
    pub fn empty(spec: Arc<ObjectSpecification>) -> Self {
        Self::Empty { spec }
    }

    /// Value; a missing pojo maps to [`Self::empty`]
    pub fn value(spec: Arc<ObjectSpecification>, pojo: Option<Pojo>) -> Self {
        match pojo {
            Some(pojo) => Self::Value { spec, pojo },
            None => Self::empty(spec),
        }
    }

    /// Service; the pojo is required
    pub fn service(spec: Arc<ObjectSpecification>, pojo: Pojo) -> Self {
        Self::Service { spec, pojo }
    }

    /// View-model; a missing pojo maps to [`Self::empty`]
    pub fn viewmodel(spec: Arc<ObjectSpecification>, pojo: Option<Pojo>) -> Self {
        match pojo {
            Some(pojo) => Self::Viewmodel { spec, pojo },
            None => Self::empty(spec),
        }
    }

    /// Entity; a missing pojo maps to [`Self::empty`].
    ///
    /// When no bookmark is supplied, resolution is delegated to the spec's
    /// entity facet (at most one persistence lookup); when resolution
    /// yields none the instance is represented as detached, never as an
    /// inconsistent bookmark/pojo pair.
    pub fn entity(
        spec: Arc<ObjectSpecification>,
        pojo: Option<Pojo>,
        bookmark_if_known: Option<Bookmark>,
    ) -> Self {
        let Some(pojo) = pojo else {
            return Self::empty(spec);
        };
        let resolved = bookmark_if_known.or_else(|| {
            spec.get_facet::<EntityFacet>()
                .and_then(|facet| facet.bookmark_for(spec.type_key(), &pojo))
        });
        match resolved {
            Some(bookmark) => Self::entity_attached(spec, pojo, bookmark),
            None => Self::entity_detached(spec, pojo),
        }
    }

    /// Entity known to be persistent, with its bookmark
    pub fn entity_attached(
        spec: Arc<ObjectSpecification>,
        pojo: Pojo,
        bookmark: Bookmark,
    ) -> Self {
        Self::Entity {
            spec,
            pojo,
            attachment: EntityAttachment::Attached(bookmark),
        }
    }

    /// Entity not persistent yet
    pub fn entity_detached(spec: Arc<ObjectSpecification>, pojo: Pojo) -> Self {
        Self::Entity {
            spec,
            pojo,
            attachment: EntityAttachment::Detached,
        }
    }

    /// Mixin; the pojo is required
    pub fn mixin(spec: Arc<ObjectSpecification>, pojo: Pojo) -> Self {
        Self::Mixin { spec, pojo }
    }

    /// Other; a missing pojo maps to [`Self::empty`]
    pub fn other(spec: Arc<ObjectSpecification>, pojo: Option<Pojo>) -> Self {
        match pojo {
            Some(pojo) => Self::Other { spec, pojo },
            None => Self::empty(spec),
        }
    }

    /// Packed: a collection of managed objects sharing an element spec
    pub fn packed(element_spec: Arc<ObjectSpecification>, elements: Vec<ManagedObject>) -> Self {
        Self::Packed {
            element_spec,
            elements,
        }
    }

    /// Adapt a scalar pojo whose specification must be looked up; degrades
    /// to Unspecified when the type is unknown
    pub fn adapt_scalar(loader: &SpecificationLoader, pojo: Pojo) -> Self {
        let spec = loader.spec_for_type(pojo.type_key());
        Self::adapt_scalar_internal(spec, pojo, None)
    }

    /// Adapt a scalar pojo whose specification and bookmark are already
    /// known
    pub fn identified(spec: Arc<ObjectSpecification>, pojo: Pojo, bookmark: Bookmark) -> Self {
        Self::adapt_scalar_internal(Some(spec), pojo, Some(bookmark))
    }

    /// Legacy factory: adapt with an up-front compatibility check; fails
    /// when the pojo's declared type is not assignable to the spec's type
    pub fn bookmarked(
        registry: &DeclarationRegistry,
        spec: Arc<ObjectSpecification>,
        pojo: Pojo,
        bookmark: Bookmark,
    ) -> Result<Self, ObjectError> {
        if !registry.is_subtype_of(pojo.type_key(), spec.type_key()) {
            return Err(ObjectError::IncompatiblePojo {
                expected: spec.type_key().name().to_string(),
                actual: pojo.type_key().name().to_string(),
            });
        }
        Ok(Self::identified(spec, pojo, bookmark))
    }

    fn adapt_scalar_internal(
        spec: Option<Arc<ObjectSpecification>>,
        pojo: Pojo,
        bookmark: Option<Bookmark>,
    ) -> Self {
        let Some(spec) = spec else {
            return Self::Unspecified;
        };
        match Specialization::infer_from(Some(&spec), Some(&pojo)) {
            Specialization::Unspecified => Self::Unspecified,
            Specialization::Value => Self::value(spec, Some(pojo)),
            Specialization::Service => Self::service(spec, pojo),
            Specialization::Viewmodel => Self::viewmodel(spec, Some(pojo)),
            Specialization::Entity => Self::entity(spec, Some(pojo), bookmark),
            Specialization::Mixin => Self::mixin(spec, pojo),
            Specialization::Other => Self::other(spec, Some(pojo)),
            Specialization::Empty | Specialization::Packed => {
                warn!(
                    type_name = %spec.type_key(),
                    "cannot adapt a non-scalar specification as a scalar object"
                );
                Self::Unspecified
            }
        }
    }

    // -- ACCESSORS

    /// The specialization governing this object's behavior
    pub fn specialization(&self) -> Specialization {
        match self {
            Self::Unspecified => Specialization::Unspecified,
            Self::Empty { .. } => Specialization::Empty,
            Self::Value { .. } => Specialization::Value,
            Self::Service { .. } => Specialization::Service,
            Self::Viewmodel { .. } => Specialization::Viewmodel,
            Self::Entity { .. } => Specialization::Entity,
            Self::Mixin { .. } => Specialization::Mixin,
            Self::Other { .. } => Specialization::Other,
            Self::Packed { .. } => Specialization::Packed,
        }
    }

    /// The bookmark policy fixed by this object's specialization
    pub fn bookmark_policy(&self) -> BookmarkPolicy {
        self.specialization().policy().bookmark_policy
    }

    /// The specification, the element spec for packed objects, `None` when
    /// unspecified
    pub fn spec(&self) -> Option<&Arc<ObjectSpecification>> {
        match self {
            Self::Unspecified => None,
            Self::Empty { spec }
            | Self::Value { spec, .. }
            | Self::Service { spec, .. }
            | Self::Viewmodel { spec, .. }
            | Self::Entity { spec, .. }
            | Self::Mixin { spec, .. }
            | Self::Other { spec, .. } => Some(spec),
            Self::Packed { element_spec, .. } => Some(element_spec),
        }
    }

    /// The wrapped instance, when there is one
    pub fn pojo(&self) -> Option<&Pojo> {
        match self {
            Self::Unspecified | Self::Empty { .. } | Self::Packed { .. } => None,
            Self::Value { pojo, .. }
            | Self::Service { pojo, .. }
            | Self::Viewmodel { pojo, .. }
            | Self::Entity { pojo, .. }
            | Self::Mixin { pojo, .. }
            | Self::Other { pojo, .. } => Some(pojo),
        }
    }

    /// The elements of a packed object; empty otherwise
    pub fn unpack(&self) -> &[ManagedObject] {
        match self {
            Self::Packed { elements, .. } => elements,
            _ => &[],
        }
    }

    /// The current bookmark: the immutable one for attached entities, a
    /// freshly computed one for view-models, `None` otherwise
    pub fn bookmark(&self) -> Option<Bookmark> {
        match self {
            Self::Entity {
                attachment: EntityAttachment::Attached(bookmark),
                ..
            } => Some(bookmark.clone()),
            Self::Viewmodel { spec, pojo } => spec
                .get_facet::<ViewModelFacet>()
                .map(|facet| facet.bookmark_for(spec.type_key(), pojo)),
            _ => None,
        }
    }

    /// Whether this entity-specialized object currently has no persistent
    /// identity
    pub fn is_detached_entity(&self) -> bool {
        matches!(
            self,
            Self::Entity {
                attachment: EntityAttachment::Detached,
                ..
            }
        )
    }

    /// The user-visible title, via the spec's title facet
    pub fn title(&self) -> String {
        match self {
            Self::Unspecified => "unspecified object".to_string(),
            Self::Packed {
                element_spec,
                elements,
            } => format!("{} x {}", elements.len(), element_spec.title_of(None)),
            _ => match self.spec() {
                Some(spec) => spec.title_of(self.pojo()),
                None => "unspecified object".to_string(),
            },
        }
    }

    /// The icon name, via the spec's icon facet
    pub fn icon_name(&self) -> Option<String> {
        let spec = self.spec()?;
        let pojo = self.pojo()?;
        spec.icon_name_of(pojo)
    }

    /// The declared type key, when a spec is present
    pub fn type_key(&self) -> Option<&TypeKey> {
        self.spec().map(|spec| spec.type_key())
    }
}

// Equality is delegated to specialization-specific identity rules: two
// wrappers over bookmark-equal entities, or over the same immutable value,
// compare equal regardless of wrapper instance identity.
impl PartialEq for ManagedObject {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unspecified, Self::Unspecified) => true,
            (Self::Empty { spec: a }, Self::Empty { spec: b }) => a.type_key() == b.type_key(),
            (
                Self::Value { spec, pojo: a },
                Self::Value {
                    spec: other_spec,
                    pojo: b,
                },
            ) => {
                spec.type_key() == other_spec.type_key()
                    && match spec.get_facet::<ValueFacet>() {
                        Some(facet) => facet.equal(a, b),
                        None => a.ptr_eq(b),
                    }
            }
            (Self::Service { pojo: a, .. }, Self::Service { pojo: b, .. }) => a.ptr_eq(b),
            (Self::Viewmodel { pojo: a, .. }, Self::Viewmodel { pojo: b, .. }) => {
                match (self.bookmark(), other.bookmark()) {
                    (Some(x), Some(y)) => x == y,
                    _ => a.ptr_eq(b),
                }
            }
            (
                Self::Entity {
                    pojo: a,
                    attachment: at_a,
                    ..
                },
                Self::Entity {
                    pojo: b,
                    attachment: at_b,
                    ..
                },
            ) => match (at_a, at_b) {
                (EntityAttachment::Attached(x), EntityAttachment::Attached(y)) => x == y,
                _ => a.ptr_eq(b),
            },
            (Self::Mixin { pojo: a, .. }, Self::Mixin { pojo: b, .. }) => a.ptr_eq(b),
            (Self::Other { pojo: a, .. }, Self::Other { pojo: b, .. }) => a.ptr_eq(b),
            (
                Self::Packed {
                    element_spec: ea,
                    elements: xs,
                },
                Self::Packed {
                    element_spec: eb,
                    elements: ys,
                },
            ) => ea.type_key() == eb.type_key() && xs == ys,
            _ => false,
        }
    }
}

impl Eq for ManagedObject {}
