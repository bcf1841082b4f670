//! Opal Metamodel
//!
//! This crate builds and serves the metamodel:
//! - Facet API (attachable units of behavior keyed by facet kind)
//! - Programming model (ordered, pluggable registry of contributions)
//! - Specification loader (introspects declarations into cached specs)
//! - Managed objects (runtime wrappers with specialization-fixed policies)

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod context;
pub mod facetapi;
pub mod facets;
pub mod object;
pub mod progmodel;
pub mod spec;
pub mod specloader;

pub use config::IntrospectionConfig;
pub use context::MetamodelContext;
pub use facetapi::{Facet, FacetHolder, ImperativeAspect, Intent};
pub use object::{
    Bookmark, BookmarkPolicy, BookmarkResolver, ManagedObject, ObjectError, PojoPolicy,
    Specialization, SpecializationPolicy, TypePolicy,
};
pub use progmodel::{
    default_programming_model, AcceptAll, ExcludingMarkers, FacetProcessingOrder, InitFilter,
    Marker, MetaModelRefiner, PostProcessingOrder, ProgrammingModel, ValidationOrder,
};
pub use spec::{ActionParameter, BeanSort, MemberKind, ObjectAction, ObjectMember, ObjectSpecification};
pub use specloader::{SpecificationLoader, ValidationFailure};
