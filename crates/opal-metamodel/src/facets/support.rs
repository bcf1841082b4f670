//! Member Support Facets
//!
//! Imperative facets wrapping hide/disable/validate/default/choices support
//! methods. Validation-style facets surface a plain reason string or a
//! translated one; any other invocation result means "valid".

use std::any::Any;

use opal_core::reflect::decl::MethodModel;
use opal_core::reflect::pojo::{Invoked, Pojo};

use crate::facetapi::{Facet, ImperativeAspect, Intent};
use crate::facets::TranslationBinding;

fn reason_from(invoked: Option<Invoked>, translation: &TranslationBinding) -> Option<String> {
    match invoked {
        Some(Invoked::Text(reason)) => Some(reason),
        Some(Invoked::Translatable(reason)) => Some(translation.translate(&reason)),
        _ => None,
    }
}

/// Hides a member when its `hide...` support method returns true.
#[derive(Debug)]
pub struct HiddenFacetViaMethod {
    aspect: ImperativeAspect,
}

impl HiddenFacetViaMethod {
    /// Backed by a `hide...` support method
    pub fn new(method: MethodModel) -> Self {
        Self {
            aspect: ImperativeAspect::single(method, Intent::CheckIfHidden),
        }
    }

    /// Whether the member is hidden for the given instance
    pub fn is_hidden(&self, target: &Pojo) -> bool {
        matches!(
            self.aspect.method().invoke(target, &[]),
            Some(Invoked::Truth(true))
        )
    }
}

impl Facet for HiddenFacetViaMethod {
    fn kind_name(&self) -> &'static str {
        "hidden"
    }

    fn imperative(&self) -> Option<&ImperativeAspect> {
        Some(&self.aspect)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Disables a member when its `disable...` support method returns a reason.
#[derive(Debug)]
pub struct DisabledFacetViaMethod {
    aspect: ImperativeAspect,
    translation: TranslationBinding,
}

impl DisabledFacetViaMethod {
    /// Backed by a `disable...` support method
    pub fn new(method: MethodModel, translation: TranslationBinding) -> Self {
        Self {
            aspect: ImperativeAspect::single(method, Intent::CheckIfDisabled),
            translation,
        }
    }

    /// The veto reason, or `None` when the member is enabled
    pub fn disabled_reason(&self, target: &Pojo) -> Option<String> {
        reason_from(self.aspect.method().invoke(target, &[]), &self.translation)
    }
}

impl Facet for DisabledFacetViaMethod {
    fn kind_name(&self) -> &'static str {
        "disabled"
    }

    fn imperative(&self) -> Option<&ImperativeAspect> {
        Some(&self.aspect)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Vetoes a proposed property value via its `validate...` support method.
#[derive(Debug)]
pub struct PropertyValidationFacet {
    aspect: ImperativeAspect,
    translation: TranslationBinding,
}

impl PropertyValidationFacet {
    /// Backed by a `validate...` support method taking the proposed value
    pub fn new(method: MethodModel, translation: TranslationBinding) -> Self {
        Self {
            aspect: ImperativeAspect::single(method, Intent::CheckIfValid),
            translation,
        }
    }

    /// The veto reason for a proposed value, or `None` when valid
    pub fn invalid_reason(&self, target: &Pojo, proposed: &Pojo) -> Option<String> {
        reason_from(
            self.aspect.method().invoke(target, &[proposed.clone()]),
            &self.translation,
        )
    }
}

impl Facet for PropertyValidationFacet {
    fn kind_name(&self) -> &'static str {
        "property-validation"
    }

    fn imperative(&self) -> Option<&ImperativeAspect> {
        Some(&self.aspect)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Vetoes a whole argument list via the action's `validate...` support
/// method.
#[derive(Debug)]
pub struct ActionValidationFacet {
    aspect: ImperativeAspect,
    translation: TranslationBinding,
}

impl ActionValidationFacet {
    /// Backed by a `validate...` support method taking all arguments
    pub fn new(method: MethodModel, translation: TranslationBinding) -> Self {
        Self {
            aspect: ImperativeAspect::single(method, Intent::CheckIfValid),
            translation,
        }
    }

    /// The veto reason for the argument list, or `None` when valid
    pub fn invalid_reason(&self, target: &Pojo, args: &[Pojo]) -> Option<String> {
        reason_from(self.aspect.method().invoke(target, args), &self.translation)
    }
}

impl Facet for ActionValidationFacet {
    fn kind_name(&self) -> &'static str {
        "action-validation"
    }

    fn imperative(&self) -> Option<&ImperativeAspect> {
        Some(&self.aspect)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Vetoes a single proposed argument via a `validate<N>...` support method.
#[derive(Debug)]
pub struct ActionParameterValidationFacet {
    aspect: ImperativeAspect,
    param_index: usize,
    translation: TranslationBinding,
}

impl ActionParameterValidationFacet {
    /// Backed by a `validate<N>...` support method taking the proposed
    /// argument
    pub fn new(method: MethodModel, param_index: usize, translation: TranslationBinding) -> Self {
        Self {
            aspect: ImperativeAspect::single(method, Intent::CheckIfValid),
            param_index,
            translation,
        }
    }

    /// The parameter index this facet guards
    pub fn param_index(&self) -> usize {
        self.param_index
    }

    /// The veto reason for the proposed argument, or `None` when valid
    pub fn invalid_reason(
        &self,
        target: &Pojo,
        _pending_args: &[Pojo],
        proposed: &Pojo,
    ) -> Option<String> {
        reason_from(
            self.aspect.method().invoke(target, &[proposed.clone()]),
            &self.translation,
        )
    }
}

impl Facet for ActionParameterValidationFacet {
    fn kind_name(&self) -> &'static str {
        "action-parameter-validation"
    }

    fn imperative(&self) -> Option<&ImperativeAspect> {
        Some(&self.aspect)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Supplies a parameter default via a `default<N>...` support method.
#[derive(Debug)]
pub struct ActionParameterDefaultsFacet {
    aspect: ImperativeAspect,
    param_index: usize,
}

impl ActionParameterDefaultsFacet {
    /// Backed by a `default<N>...` support method
    pub fn new(method: MethodModel, param_index: usize) -> Self {
        Self {
            aspect: ImperativeAspect::single(method, Intent::ChoicesOrDefault),
            param_index,
        }
    }

    /// The parameter index this facet supplies
    pub fn param_index(&self) -> usize {
        self.param_index
    }

    /// The default argument, if the support method yields one
    pub fn default_value(&self, target: &Pojo) -> Option<Pojo> {
        match self.aspect.method().invoke(target, &[]) {
            Some(Invoked::Value(value)) => Some(value),
            _ => None,
        }
    }
}

impl Facet for ActionParameterDefaultsFacet {
    fn kind_name(&self) -> &'static str {
        "action-parameter-defaults"
    }

    fn imperative(&self) -> Option<&ImperativeAspect> {
        Some(&self.aspect)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Supplies parameter choices via a `choices<N>...` support method.
#[derive(Debug)]
pub struct ActionParameterChoicesFacet {
    aspect: ImperativeAspect,
    param_index: usize,
}

impl ActionParameterChoicesFacet {
    /// Backed by a `choices<N>...` support method
    pub fn new(method: MethodModel, param_index: usize) -> Self {
        Self {
            aspect: ImperativeAspect::single(method, Intent::ChoicesOrDefault),
            param_index,
        }
    }

    /// The parameter index this facet supplies
    pub fn param_index(&self) -> usize {
        self.param_index
    }

    /// The candidate arguments; empty when the support method yields
    /// nothing usable
    pub fn choices(&self, target: &Pojo) -> Vec<Pojo> {
        match self.aspect.method().invoke(target, &[]) {
            Some(Invoked::Value(value)) => value
                .downcast_ref::<Vec<Pojo>>()
                .cloned()
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

impl Facet for ActionParameterChoicesFacet {
    fn kind_name(&self) -> &'static str {
        "action-parameter-choices"
    }

    fn imperative(&self) -> Option<&ImperativeAspect> {
        Some(&self.aspect)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use opal_core::i18n::{PassThroughTranslator, TranslatableString};
    use opal_core::reflect::decl::TypeKey;

    fn binding() -> TranslationBinding {
        TranslationBinding::new(Arc::new(PassThroughTranslator), "demo::Order#placeOrder()")
    }

    #[test]
    fn test_plain_reason_is_surfaced() {
        let order = TypeKey::of("demo::Order");
        let method = MethodModel::new(order.clone(), "validate0PlaceOrder")
            .with_params(vec![TypeKey::of("i64")])
            .returning(TypeKey::of("String"))
            .with_invoker(|_target, args| {
                match args[0].downcast_ref::<i64>() {
                    Some(qty) if *qty <= 0 => Invoked::Text("quantity must be positive".into()),
                    _ => Invoked::Unit,
                }
            });
        let facet = ActionParameterValidationFacet::new(method, 0, binding());

        let target = Pojo::new(order.clone(), ());
        let bad = Pojo::new(TypeKey::of("i64"), 0_i64);
        let good = Pojo::new(TypeKey::of("i64"), 3_i64);

        assert_eq!(
            facet.invalid_reason(&target, &[], &bad),
            Some("quantity must be positive".to_string())
        );
        assert_eq!(facet.invalid_reason(&target, &[], &good), None);
    }

    #[test]
    fn test_translatable_reason_is_translated() {
        let order = TypeKey::of("demo::Order");
        let method = MethodModel::new(order.clone(), "validateNotes")
            .with_params(vec![TypeKey::of("String")])
            .returning(TypeKey::of("String"))
            .with_invoker(|_target, _args| {
                Invoked::Translatable(
                    TranslatableString::tr("too long by {n} chars").with_arg("n", 7),
                )
            });
        let facet = PropertyValidationFacet::new(method, binding());

        let target = Pojo::new(order, ());
        let proposed = Pojo::new(TypeKey::of("String"), "x".to_string());
        assert_eq!(
            facet.invalid_reason(&target, &proposed),
            Some("too long by 7 chars".to_string())
        );
    }

    #[test]
    fn test_unit_result_means_valid() {
        let order = TypeKey::of("demo::Order");
        let method = MethodModel::new(order.clone(), "validateNotes")
            .with_params(vec![TypeKey::of("String")])
            .with_invoker(|_target, _args| Invoked::Unit);
        let facet = PropertyValidationFacet::new(method, binding());

        let target = Pojo::new(order, ());
        let proposed = Pojo::new(TypeKey::of("String"), "ok".to_string());
        assert_eq!(facet.invalid_reason(&target, &proposed), None);
    }

    #[test]
    fn test_hidden_and_disabled() {
        let order = TypeKey::of("demo::Order");
        let hide = MethodModel::new(order.clone(), "hideNotes")
            .returning(TypeKey::of("bool"))
            .with_invoker(|_t, _a| Invoked::Truth(true));
        let disable = MethodModel::new(order.clone(), "disableNotes")
            .returning(TypeKey::of("String"))
            .with_invoker(|_t, _a| Invoked::Text("order is shipped".into()));

        let hidden = HiddenFacetViaMethod::new(hide);
        let disabled = DisabledFacetViaMethod::new(disable, binding());
        let target = Pojo::new(order, ());

        assert!(hidden.is_hidden(&target));
        assert_eq!(
            disabled.disabled_reason(&target),
            Some("order is shipped".to_string())
        );
    }
}
