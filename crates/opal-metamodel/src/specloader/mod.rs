//! Specification Loader
//!
//! Drives the introspection of a declared type into an immutable, cached
//! [`ObjectSpecification`]: class model from the cache, member discovery by
//! convention, facet factories in snapshot order, metamodel validators,
//! post-processors, freeze.

pub mod postprocess;
pub mod summary;
pub mod validate;

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use opal_core::annot::AnnotationKind;
use opal_core::ident::Identifier;
use opal_core::reflect::cache::{ClassCache, ClassModel};
use opal_core::reflect::decl::{MethodModel, TypeKey};

use crate::context::MetamodelContext;
use crate::facetapi::FacetHolder;
use crate::facets::factory::{
    MethodRemover, ProcessClassContext, ProcessMemberContext, ProcessParameterContext,
};
use crate::progmodel::ProgrammingModel;
use crate::spec::{
    ActionParameter, BeanSort, MemberKind, ObjectAction, ObjectMember, ObjectSpecification,
};

pub use summary::{ActionSummary, MemberSummary, MetamodelSummary, SpecSummary};

/// A cross-cutting invariant violation found during metamodel build.
///
/// Failures are collected for reporting, not raised as errors; a spec with
/// failures is still served.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationFailure {
    origin: Identifier,
    message: String,
}

impl ValidationFailure {
    /// Create a failure anchored at the given feature
    pub fn new(origin: Identifier, message: impl Into<String>) -> Self {
        Self {
            origin,
            message: message.into(),
        }
    }

    /// The feature the failure is anchored at
    pub fn origin(&self) -> &Identifier {
        &self.origin
    }

    /// Human-readable description
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.origin, self.message)
    }
}

fn member_name_for_getter(method: &MethodModel) -> Option<String> {
    if !method.is_getter() {
        return None;
    }
    let name = method.name();
    let rest = if name.starts_with("is") && name.len() > 2 {
        &name[2..]
    } else if name.starts_with("get") && name.len() > 3 {
        &name[3..]
    } else {
        return None;
    };
    let mut chars = rest.chars();
    chars
        .next()
        .map(|first| first.to_lowercase().chain(chars).collect())
}

fn bean_sort_of(class_model: &ClassModel) -> BeanSort {
    let annotations = class_model.annotations();
    if annotations.is_present(AnnotationKind::Value) {
        BeanSort::Value
    } else if annotations.is_present(AnnotationKind::DomainService) {
        BeanSort::Service
    } else if annotations.is_present(AnnotationKind::ViewModel) {
        BeanSort::ViewModel
    } else if annotations.is_present(AnnotationKind::Entity) {
        BeanSort::Entity
    } else if annotations.is_present(AnnotationKind::Mixin) {
        BeanSort::Mixin
    } else if annotations.is_present(AnnotationKind::Collection) {
        BeanSort::Collection
    } else if class_model.is_abstract() {
        BeanSort::Abstract
    } else {
        BeanSort::Other
    }
}

/// Builds and caches object specifications.
///
/// The programming model must already be initialized; specs are built on
/// first request and shared read-only afterwards.
pub struct SpecificationLoader {
    cache: Arc<ClassCache>,
    model: Arc<ProgrammingModel>,
    ctx: MetamodelContext,
    specs: DashMap<TypeKey, Arc<ObjectSpecification>>,
    failures: Mutex<Vec<ValidationFailure>>,
}

impl SpecificationLoader {
    /// Create over an initialized programming model
    pub fn new(cache: Arc<ClassCache>, model: Arc<ProgrammingModel>, ctx: MetamodelContext) -> Self {
        Self {
            cache,
            model,
            ctx,
            specs: DashMap::new(),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// The class cache specs are built from
    pub fn class_cache(&self) -> &Arc<ClassCache> {
        &self.cache
    }

    /// The specification for a declared type, building and caching it on
    /// first request; `None` for unknown types
    pub fn spec_for_type(&self, type_key: &TypeKey) -> Option<Arc<ObjectSpecification>> {
        if let Some(hit) = self.specs.get(type_key) {
            return Some(hit.clone());
        }
        self.cache.registry().lookup(type_key)?;
        let built = Arc::new(self.introspect(type_key));
        let entry = self.specs.entry(type_key.clone()).or_insert(built);
        Some(entry.value().clone())
    }

    /// All validation failures collected so far
    pub fn validation_failures(&self) -> Vec<ValidationFailure> {
        self.failures.lock().clone()
    }

    /// Serializable summary of every spec built so far
    pub fn summary(&self) -> MetamodelSummary {
        let specs: Vec<Arc<ObjectSpecification>> =
            self.specs.iter().map(|entry| entry.value().clone()).collect();
        summary::summarize(&specs, &self.validation_failures())
    }

    fn introspect(&self, type_key: &TypeKey) -> ObjectSpecification {
        debug!(type_name = %type_key, "introspecting");

        let class_model = self.cache.inspect(type_key);
        let mut spec = ObjectSpecification {
            type_key: type_key.clone(),
            identifier: Identifier::class_identifier(type_key.clone()),
            bean_sort: bean_sort_of(&class_model),
            is_abstract: class_model.is_abstract(),
            facets: FacetHolder::new(),
            properties: Vec::new(),
            collections: Vec::new(),
            actions: Vec::new(),
            support_methods: Vec::new(),
        };
        let mut remover = MethodRemover::new();
        let factories = self.model.factories();

        // class-level facets; class support methods get consumed here
        for factory in factories {
            let mut ctx = ProcessClassContext {
                cache: &self.cache,
                class_model: &class_model,
                facets: &mut spec.facets,
                remover: &mut remover,
            };
            factory.process_class(&mut ctx);
        }

        // associations from getters
        let mut claimed: Vec<MethodModel> = Vec::new();
        for method in class_model.declared_methods() {
            if !method.is_public()
                || remover.is_removed(method)
                || method.annotations().is_present(AnnotationKind::Programmatic)
            {
                continue;
            }
            let Some(member_name) = member_name_for_getter(method) else {
                continue;
            };
            claimed.push(method.clone());
            let kind = if method.collection_of().is_some() {
                MemberKind::Collection
            } else {
                MemberKind::Property
            };
            let element_type = method
                .collection_of()
                .or(method.return_type())
                .cloned()
                .unwrap_or_else(TypeKey::object);
            let member = ObjectMember {
                kind,
                identifier: Identifier::property_or_collection_identifier(
                    type_key.clone(),
                    member_name.clone(),
                ),
                name: member_name.into(),
                element_type,
                method: method.clone(),
                facets: FacetHolder::new(),
            };
            match kind {
                MemberKind::Property => spec.properties.push(member),
                MemberKind::Collection => spec.collections.push(member),
            }
        }

        for member in spec
            .properties
            .iter_mut()
            .chain(spec.collections.iter_mut())
        {
            for factory in factories {
                let mut ctx = ProcessMemberContext {
                    cache: &self.cache,
                    class_model: &class_model,
                    member_name: &member.name,
                    method: &member.method,
                    identifier: &member.identifier,
                    facets: &mut member.facets,
                    remover: &mut remover,
                };
                match member.kind {
                    MemberKind::Property => factory.process_property(&mut ctx),
                    MemberKind::Collection => factory.process_collection(&mut ctx),
                }
            }
        }

        // remaining public methods are action candidates
        for method in class_model.declared_methods() {
            if !method.is_public()
                || remover.is_removed(method)
                || method.annotations().is_present(AnnotationKind::Programmatic)
                || claimed.iter().any(|m| m.same_signature(method))
                || self.ctx.config.is_support_method_name(method.name())
                || self.ctx.config.is_reserved_method_name(method.name())
            {
                continue;
            }
            if self.ctx.config.require_explicit_action_annotation
                && !method.annotations().is_present(AnnotationKind::Action)
            {
                continue;
            }
            let parameters = method
                .param_types()
                .iter()
                .enumerate()
                .map(|(index, param_type)| ActionParameter {
                    index,
                    param_type: param_type.clone(),
                    facets: FacetHolder::new(),
                })
                .collect();
            spec.actions.push(ObjectAction {
                identifier: Identifier::action_identifier(
                    type_key.clone(),
                    method.name(),
                    method.param_types(),
                ),
                name: method.name().into(),
                method: method.clone(),
                parameters,
                return_type: method.return_type().cloned(),
                facets: FacetHolder::new(),
            });
        }

        for action in &mut spec.actions {
            for factory in factories {
                let mut ctx = ProcessMemberContext {
                    cache: &self.cache,
                    class_model: &class_model,
                    member_name: &action.name,
                    method: &action.method,
                    identifier: &action.identifier,
                    facets: &mut action.facets,
                    remover: &mut remover,
                };
                factory.process_action(&mut ctx);
            }
            let action_name = action.name.clone();
            let identifier = action.identifier.clone();
            for parameter in &mut action.parameters {
                for factory in factories {
                    let mut ctx = ProcessParameterContext {
                        cache: &self.cache,
                        class_model: &class_model,
                        action_name: &action_name,
                        identifier: &identifier,
                        param_index: parameter.index,
                        param_type: &parameter.param_type,
                        facets: &mut parameter.facets,
                        remover: &mut remover,
                    };
                    factory.process_action_parameter(&mut ctx);
                }
            }
        }

        spec.support_methods = remover.into_removed();

        let mut failures = Vec::new();
        for validator in self.model.validators() {
            validator.validate(&spec, &self.cache, &mut failures);
        }
        if !failures.is_empty() {
            self.failures.lock().extend(failures);
        }

        for post_processor in self.model.post_processors() {
            post_processor.post_process(&mut spec);
        }

        spec.freeze();
        spec
    }
}

impl fmt::Debug for SpecificationLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecificationLoader")
            .field("cached_specs", &self.specs.len())
            .finish()
    }
}
