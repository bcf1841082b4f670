//! Metamodel Summary Export
//!
//! A serializable snapshot of the built metamodel, for diagnostics and
//! tooling: specs, members, facet kinds, consumed support methods, and
//! collected validation failures.

use std::sync::Arc;

use serde::Serialize;

use crate::spec::{ObjectAction, ObjectMember, ObjectSpecification};
use crate::specloader::ValidationFailure;

/// Summary of one property or collection member.
#[derive(Debug, Clone, Serialize)]
pub struct MemberSummary {
    /// Member name
    pub name: String,
    /// Value or element type name
    pub element_type: String,
    /// Facet kind names, sorted
    pub facets: Vec<&'static str>,
}

/// Summary of one action member.
#[derive(Debug, Clone, Serialize)]
pub struct ActionSummary {
    /// Action name
    pub name: String,
    /// Parameter type names, in declaration order
    pub parameter_types: Vec<String>,
    /// Facet kind names, sorted
    pub facets: Vec<&'static str>,
}

/// Summary of one object specification.
#[derive(Debug, Clone, Serialize)]
pub struct SpecSummary {
    /// The described type's name
    pub type_name: String,
    /// Bean sort name
    pub bean_sort: &'static str,
    /// Class-level facet kind names, sorted
    pub facets: Vec<&'static str>,
    /// Property summaries
    pub properties: Vec<MemberSummary>,
    /// Collection summaries
    pub collections: Vec<MemberSummary>,
    /// Action summaries
    pub actions: Vec<ActionSummary>,
    /// Names of support methods consumed during build
    pub support_methods: Vec<String>,
}

/// The exported metamodel snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct MetamodelSummary {
    /// One entry per built spec, sorted by type name
    pub specs: Vec<SpecSummary>,
    /// All validation failures collected so far
    pub validation_failures: Vec<ValidationFailure>,
}

fn member_summary(member: &ObjectMember) -> MemberSummary {
    MemberSummary {
        name: member.name().to_string(),
        element_type: member.element_type().name().to_string(),
        facets: member.facets().facet_kind_names(),
    }
}

fn action_summary(action: &ObjectAction) -> ActionSummary {
    ActionSummary {
        name: action.name().to_string(),
        parameter_types: action
            .parameters()
            .iter()
            .map(|p| p.param_type().name().to_string())
            .collect(),
        facets: action.facets().facet_kind_names(),
    }
}

pub(crate) fn summarize(
    specs: &[Arc<ObjectSpecification>],
    failures: &[ValidationFailure],
) -> MetamodelSummary {
    let mut entries: Vec<SpecSummary> = specs
        .iter()
        .map(|spec| SpecSummary {
            type_name: spec.type_key().name().to_string(),
            bean_sort: spec.bean_sort().as_str(),
            facets: spec.facets().facet_kind_names(),
            properties: spec.properties().iter().map(member_summary).collect(),
            collections: spec.collections().iter().map(member_summary).collect(),
            actions: spec.actions().iter().map(action_summary).collect(),
            support_methods: spec
                .support_methods()
                .iter()
                .map(|m| m.name().to_string())
                .collect(),
        })
        .collect();
    entries.sort_by(|a, b| a.type_name.cmp(&b.type_name));

    MetamodelSummary {
        specs: entries,
        validation_failures: failures.to_vec(),
    }
}
