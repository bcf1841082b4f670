//! Stock Facet Factories
//!
//! The factories wired by the default programming model. Class-level
//! factories run before member discovery, so the support methods they
//! consume (title, icon name, memento) never surface as actions.

use std::sync::Arc;

use opal_core::i18n::TranslationService;
use opal_core::ident::{natural_name, Identifier};
use opal_core::reflect::cache::ClassCache;
use opal_core::reflect::decl::{MethodModel, TypeKey};

use crate::config::IntrospectionConfig;
use crate::facets::accessor::{CollectionAccessorFacet, PropertyAccessorFacet};
use crate::facets::entity::EntityFacet;
use crate::facets::factory::{
    FacetFactory, ProcessClassContext, ProcessMemberContext, ProcessParameterContext,
};
use crate::facets::icon::IconFacet;
use crate::facets::invocation::ActionInvocationFacet;
use crate::facets::support::{
    ActionParameterChoicesFacet, ActionParameterDefaultsFacet, ActionParameterValidationFacet,
    ActionValidationFacet, DisabledFacetViaMethod, HiddenFacetViaMethod, PropertyValidationFacet,
};
use crate::facets::title::TitleFacet;
use crate::facets::value::{ValueFacet, ValueSemantics, ValueSemanticsRegistry};
use crate::facets::viewmodel::ViewModelFacet;
use crate::facets::TranslationBinding;
use crate::object::bookmark::BookmarkResolver;

use opal_core::annot::AnnotationKind;

const SUPPORT_ATTRIBUTE: &str = "member-support";

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn class_fallback_title(type_key: &TypeKey) -> String {
    natural_name(type_key.simple_name())
}

/// Installs defaults later factories may replace.
#[derive(Debug, Default)]
pub struct FallbackFacetFactory;

impl FacetFactory for FallbackFacetFactory {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) {
        let fallback = class_fallback_title(ctx.class_model.type_key());
        ctx.facets.add_facet(TitleFacet::fallback(fallback));
    }
}

/// Attaches [`ValueFacet`] to types marked as values.
#[derive(Debug)]
pub struct ValueFacetFactory {
    semantics: Arc<ValueSemanticsRegistry>,
}

impl ValueFacetFactory {
    /// Create over the bootstrap semantics registry
    pub fn new(semantics: Arc<ValueSemanticsRegistry>) -> Self {
        Self { semantics }
    }
}

impl FacetFactory for ValueFacetFactory {
    fn name(&self) -> &'static str {
        "value"
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) {
        if ctx
            .class_model
            .annotations()
            .is_present(AnnotationKind::Value)
        {
            let semantics = self
                .semantics
                .lookup(ctx.class_model.type_key())
                .unwrap_or_else(ValueSemantics::identity);
            ctx.facets.add_facet(ValueFacet::new(semantics));
        }
    }
}

/// Attaches [`EntityFacet`] to types marked as entities.
pub struct EntityFacetFactory {
    resolver: Arc<dyn BookmarkResolver>,
}

impl EntityFacetFactory {
    /// Create over the persistence seam
    pub fn new(resolver: Arc<dyn BookmarkResolver>) -> Self {
        Self { resolver }
    }
}

impl FacetFactory for EntityFacetFactory {
    fn name(&self) -> &'static str {
        "entity"
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) {
        if ctx
            .class_model
            .annotations()
            .is_present(AnnotationKind::Entity)
        {
            ctx.facets.add_facet(EntityFacet::new(self.resolver.clone()));
        }
    }
}

/// Attaches [`ViewModelFacet`] to types marked as view-models, backed by a
/// declared `memento()` support method when present.
#[derive(Debug, Default)]
pub struct ViewModelFacetFactory;

impl FacetFactory for ViewModelFacetFactory {
    fn name(&self) -> &'static str {
        "view-model"
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) {
        if !ctx
            .class_model
            .annotations()
            .is_present(AnnotationKind::ViewModel)
        {
            return;
        }
        let type_key = ctx.class_model.type_key().clone();
        match ctx
            .cache
            .lookup_public_or_declared_method(&type_key, "memento", &[])
        {
            Some(method) => {
                ctx.remover.remove(&method);
                ctx.facets.add_facet(ViewModelFacet::via_memento_method(method));
            }
            None => {
                ctx.facets.add_facet(ViewModelFacet::stateless());
            }
        }
    }
}

/// Replaces the fallback title with a method-backed one: a declared
/// `title()` support method wins over an overriding `toString`.
pub struct TitleFacetViaMethodFactory {
    translation: Arc<dyn TranslationService>,
}

impl TitleFacetViaMethodFactory {
    /// Create over the translation seam
    pub fn new(translation: Arc<dyn TranslationService>) -> Self {
        Self { translation }
    }
}

impl FacetFactory for TitleFacetViaMethodFactory {
    fn name(&self) -> &'static str {
        "title-via-method"
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) {
        let type_key = ctx.class_model.type_key().clone();
        let fallback = class_fallback_title(&type_key);

        if let Some(method) = ctx
            .cache
            .lookup_public_or_declared_method(&type_key, "title", &[])
        {
            ctx.remover.remove(&method);
            let context = Identifier::class_identifier(type_key)
                .translation_context()
                .to_string();
            ctx.facets.add_facet(TitleFacet::via_method(
                method,
                TranslationBinding::new(self.translation.clone(), context),
                fallback,
            ));
            return;
        }

        if let Some(method) = ctx
            .cache
            .lookup_public_or_declared_method(&type_key, "toString", &[])
        {
            ctx.remover.remove(&method);
            ctx.facets
                .add_facet(TitleFacet::via_to_string(method, fallback));
        }
    }
}

/// Attaches [`IconFacet`] when a declared `iconName()` support method
/// exists.
#[derive(Debug, Default)]
pub struct IconFacetViaMethodFactory;

impl FacetFactory for IconFacetViaMethodFactory {
    fn name(&self) -> &'static str {
        "icon-via-method"
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) {
        let type_key = ctx.class_model.type_key().clone();
        if let Some(method) = ctx
            .cache
            .lookup_public_or_declared_method(&type_key, "iconName", &[])
        {
            ctx.remover.remove(&method);
            ctx.facets.add_facet(IconFacet::via_method(method));
        }
    }
}

/// Attaches accessor and invocation facets to members.
#[derive(Debug, Default)]
pub struct AccessorFacetFactory;

impl FacetFactory for AccessorFacetFactory {
    fn name(&self) -> &'static str {
        "accessor"
    }

    fn process_property(&self, ctx: &mut ProcessMemberContext<'_>) {
        ctx.facets
            .add_facet(PropertyAccessorFacet::via_getter(ctx.method.clone()));
    }

    fn process_collection(&self, ctx: &mut ProcessMemberContext<'_>) {
        let element_type = ctx
            .method
            .collection_of()
            .cloned()
            .unwrap_or_else(TypeKey::object);
        ctx.facets.add_facet(CollectionAccessorFacet::via_getter(
            ctx.method.clone(),
            element_type,
        ));
    }

    fn process_action(&self, ctx: &mut ProcessMemberContext<'_>) {
        ctx.facets
            .add_facet(ActionInvocationFacet::via_method(ctx.method.clone()));
    }
}

/// Matches hide/disable/validate/default/choices support methods to
/// members, attaching the corresponding imperative facets and consuming
/// the methods.
pub struct MemberSupportFacetFactory {
    translation: Arc<dyn TranslationService>,
    config: IntrospectionConfig,
}

impl MemberSupportFacetFactory {
    /// Create over the translation seam and introspection configuration
    pub fn new(translation: Arc<dyn TranslationService>, config: IntrospectionConfig) -> Self {
        Self {
            translation,
            config,
        }
    }

    fn support_lookup(
        &self,
        cache: &ClassCache,
        type_key: &TypeKey,
        name: &str,
        param_count: usize,
    ) -> Option<MethodModel> {
        let config = &self.config;
        let candidates = cache.declared_methods_having(type_key, SUPPORT_ATTRIBUTE, |m| {
            config.is_support_method_name(m.name())
        });
        candidates
            .iter()
            .find(|m| m.name() == name && m.param_count() == param_count)
            .cloned()
    }

    fn binding(&self, identifier: &Identifier) -> TranslationBinding {
        TranslationBinding::new(self.translation.clone(), identifier.translation_context())
    }

    fn attach_hide_and_disable(&self, ctx: &mut ProcessMemberContext<'_>) {
        let type_key = ctx.class_model.type_key().clone();
        let capitalized = capitalize(ctx.member_name);

        if let Some(method) =
            self.support_lookup(ctx.cache, &type_key, &format!("hide{}", capitalized), 0)
        {
            ctx.remover.remove(&method);
            ctx.facets.add_facet(HiddenFacetViaMethod::new(method));
        }
        if let Some(method) =
            self.support_lookup(ctx.cache, &type_key, &format!("disable{}", capitalized), 0)
        {
            ctx.remover.remove(&method);
            ctx.facets.add_facet(DisabledFacetViaMethod::new(
                method,
                self.binding(ctx.identifier),
            ));
        }
    }
}

impl FacetFactory for MemberSupportFacetFactory {
    fn name(&self) -> &'static str {
        "member-support"
    }

    fn process_property(&self, ctx: &mut ProcessMemberContext<'_>) {
        self.attach_hide_and_disable(ctx);

        let type_key = ctx.class_model.type_key().clone();
        let capitalized = capitalize(ctx.member_name);
        if let Some(method) =
            self.support_lookup(ctx.cache, &type_key, &format!("validate{}", capitalized), 1)
        {
            ctx.remover.remove(&method);
            ctx.facets.add_facet(PropertyValidationFacet::new(
                method,
                self.binding(ctx.identifier),
            ));
        }
    }

    fn process_collection(&self, ctx: &mut ProcessMemberContext<'_>) {
        self.attach_hide_and_disable(ctx);
    }

    fn process_action(&self, ctx: &mut ProcessMemberContext<'_>) {
        self.attach_hide_and_disable(ctx);

        let type_key = ctx.class_model.type_key().clone();
        let capitalized = capitalize(ctx.member_name);
        if let Some(method) = self.support_lookup(
            ctx.cache,
            &type_key,
            &format!("validate{}", capitalized),
            ctx.method.param_count(),
        ) {
            ctx.remover.remove(&method);
            ctx.facets.add_facet(ActionValidationFacet::new(
                method,
                self.binding(ctx.identifier),
            ));
        }
    }

    fn process_action_parameter(&self, ctx: &mut ProcessParameterContext<'_>) {
        let type_key = ctx.class_model.type_key().clone();
        let capitalized = capitalize(ctx.action_name);
        let index = ctx.param_index;

        if let Some(method) = self.support_lookup(
            ctx.cache,
            &type_key,
            &format!("validate{}{}", index, capitalized),
            1,
        ) {
            ctx.remover.remove(&method);
            ctx.facets.add_facet(ActionParameterValidationFacet::new(
                method,
                index,
                self.binding(ctx.identifier),
            ));
        }
        if let Some(method) = self.support_lookup(
            ctx.cache,
            &type_key,
            &format!("default{}{}", index, capitalized),
            0,
        ) {
            ctx.remover.remove(&method);
            ctx.facets
                .add_facet(ActionParameterDefaultsFacet::new(method, index));
        }
        if let Some(method) = self.support_lookup(
            ctx.cache,
            &type_key,
            &format!("choices{}{}", index, capitalized),
            0,
        ) {
            ctx.remover.remove(&method);
            ctx.facets
                .add_facet(ActionParameterChoicesFacet::new(method, index));
        }
    }
}
