//! Stock Metamodel Validators

use opal_core::reflect::cache::ClassCache;

use crate::config::IntrospectionConfig;
use crate::progmodel::MetaModelValidator;
use crate::spec::ObjectSpecification;
use crate::specloader::ValidationFailure;

/// Flags public support-prefixed methods that were not matched to any
/// member; these are usually typos in the member name they target.
pub struct OrphanedSupportMethodValidator {
    config: IntrospectionConfig,
}

impl OrphanedSupportMethodValidator {
    /// Create with the loader's configuration
    pub fn new(config: IntrospectionConfig) -> Self {
        Self { config }
    }
}

impl MetaModelValidator for OrphanedSupportMethodValidator {
    fn name(&self) -> &'static str {
        "orphaned-support"
    }

    fn validate(
        &self,
        spec: &ObjectSpecification,
        cache: &ClassCache,
        failures: &mut Vec<ValidationFailure>,
    ) {
        if !self.config.orphaned_support_is_failure {
            return;
        }
        for method in cache.declared_methods(spec.type_key()) {
            if !method.is_public() || !self.config.is_support_method_name(method.name()) {
                continue;
            }
            let consumed = spec
                .support_methods()
                .iter()
                .any(|m| m.same_signature(&method));
            if !consumed {
                failures.push(ValidationFailure::new(
                    spec.identifier().clone(),
                    format!(
                        "support method '{}' does not correspond to any member",
                        method.name()
                    ),
                ));
            }
        }
    }
}

/// Flags members of one type whose identifiers collide.
///
/// Identifier equality ignores the member kind, so a property and an
/// action sharing a name are reported here rather than silently shadowing
/// one another.
#[derive(Debug, Default)]
pub struct MemberIdClashValidator;

impl MetaModelValidator for MemberIdClashValidator {
    fn name(&self) -> &'static str {
        "member-id-clash"
    }

    fn validate(
        &self,
        spec: &ObjectSpecification,
        _cache: &ClassCache,
        failures: &mut Vec<ValidationFailure>,
    ) {
        let mut identifiers: Vec<&opal_core::ident::Identifier> = Vec::new();
        identifiers.extend(spec.properties().iter().map(|m| m.identifier()));
        identifiers.extend(spec.collections().iter().map(|m| m.identifier()));
        identifiers.extend(spec.actions().iter().map(|a| a.identifier()));

        for (pos, identifier) in identifiers.iter().enumerate() {
            if identifiers[..pos].iter().any(|other| *other == *identifier) {
                failures.push(ValidationFailure::new(
                    (*identifier).clone(),
                    "multiple members resolve to the same identifier".to_string(),
                ));
            }
        }
    }
}
