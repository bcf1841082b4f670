//! Integration tests for the specification loader pipeline.
//!
//! Tests cover:
//! - Member discovery by getter convention and action fallback
//! - Support-method consumption into imperative facets
//! - Orphaned-support validation failures
//! - Spec caching and the metamodel summary export

use std::sync::Arc;

use opal_core::annot::{Annotation, AnnotationKind};
use opal_core::i18n::PassThroughTranslator;
use opal_core::reflect::cache::ClassCache;
use opal_core::reflect::decl::{
    ClassDeclaration, ConstructorModel, DeclarationRegistry, FieldModel, MethodModel, TypeKey,
};
use opal_core::reflect::pojo::{Invoked, Pojo};

use opal_metamodel::facets::{
    ActionParameterValidationFacet, ActionValidationFacet, CollectionAccessorFacet, EntityFacet,
    HiddenFacetViaMethod, IconFacet, PropertyAccessorFacet, PropertyValidationFacet, TitleFacet,
    ValueFacet, ValueSemantics, ViewModelFacet,
};
use opal_metamodel::object::bookmark::{Bookmark, BookmarkResolver};
use opal_metamodel::{
    default_programming_model, AcceptAll, BeanSort, MetamodelContext, SpecificationLoader,
};

struct IdResolver;

impl BookmarkResolver for IdResolver {
    fn bookmark_for(&self, type_key: &TypeKey, pojo: &Pojo) -> Option<Bookmark> {
        pojo.downcast_ref::<i64>()
            .filter(|id| **id > 0)
            .map(|id| Bookmark::new(type_key.name(), id.to_string()))
    }
}

fn customer_declaration(customer: &TypeKey) -> ClassDeclaration {
    ClassDeclaration::builder(customer.clone())
        .annotated(Annotation::of(AnnotationKind::Entity))
        .field(FieldModel::new(customer.clone(), "name", TypeKey::of("String")))
        .constructor(
            ConstructorModel::new(customer.clone())
                .annotated(Annotation::of(AnnotationKind::Inject)),
        )
        .method(
            MethodModel::new(customer.clone(), "getName")
                .returning(TypeKey::of("String"))
                .with_invoker(|_target, _args| {
                    Invoked::Value(Pojo::new(TypeKey::of("String"), "Ada".to_string()))
                }),
        )
        .method(
            MethodModel::new(customer.clone(), "getOrders")
                .returning_collection_of(TypeKey::of("demo::Order")),
        )
        .method(
            MethodModel::new(customer.clone(), "placeOrder")
                .with_params(vec![TypeKey::of("demo::Sku"), TypeKey::of("i64")])
                .returning(TypeKey::of("demo::Order"))
                .with_invoker(|_target, _args| Invoked::Unit),
        )
        .method(
            MethodModel::new(customer.clone(), "validatePlaceOrder")
                .with_params(vec![TypeKey::of("demo::Sku"), TypeKey::of("i64")])
                .returning(TypeKey::of("String"))
                .with_invoker(|_target, _args| Invoked::Unit),
        )
        .method(
            MethodModel::new(customer.clone(), "validate0PlaceOrder")
                .with_params(vec![TypeKey::of("demo::Sku")])
                .returning(TypeKey::of("String"))
                .with_invoker(|_target, args| match args[0].downcast_ref::<String>() {
                    Some(sku) if sku.is_empty() => Invoked::Text("sku required".into()),
                    _ => Invoked::Unit,
                }),
        )
        .method(
            MethodModel::new(customer.clone(), "validateName")
                .with_params(vec![TypeKey::of("String")])
                .returning(TypeKey::of("String"))
                .with_invoker(|_target, _args| Invoked::Unit),
        )
        .method(
            MethodModel::new(customer.clone(), "hideOrders")
                .returning(TypeKey::of("bool"))
                .with_invoker(|_target, _args| Invoked::Truth(false)),
        )
        .method(
            MethodModel::new(customer.clone(), "title")
                .returning(TypeKey::of("String"))
                .with_invoker(|target, _args| {
                    let id = target.downcast_ref::<i64>().copied().unwrap_or_default();
                    Invoked::Text(format!("Customer #{}", id))
                }),
        )
        .method(
            MethodModel::new(customer.clone(), "iconName")
                .returning(TypeKey::of("String"))
                .with_invoker(|_target, _args| Invoked::Text("customer".into())),
        )
        // orphan: no member called 'nickname'
        .method(
            MethodModel::new(customer.clone(), "validateNickname")
                .with_params(vec![TypeKey::of("String")])
                .returning(TypeKey::of("String")),
        )
        .build()
}

fn fixture() -> SpecificationLoader {
    let registry = Arc::new(DeclarationRegistry::new());
    let customer = TypeKey::of("demo::Customer");
    let sku = TypeKey::of("demo::Sku");
    let filter = TypeKey::of("demo::OrderFilter");

    registry.register(customer_declaration(&customer));
    registry.register(
        ClassDeclaration::builder(sku.clone())
            .annotated(Annotation::of(AnnotationKind::Value))
            .build(),
    );
    registry.register(
        ClassDeclaration::builder(TypeKey::of("demo::OrderService"))
            .annotated(Annotation::of(AnnotationKind::DomainService))
            .build(),
    );
    registry.register(
        ClassDeclaration::builder(filter.clone())
            .annotated(Annotation::of(AnnotationKind::ViewModel))
            .method(
                MethodModel::new(filter.clone(), "memento")
                    .returning(TypeKey::of("String"))
                    .with_invoker(|target, _args| {
                        Invoked::Text(
                            target.downcast_ref::<String>().cloned().unwrap_or_default(),
                        )
                    }),
            )
            .build(),
    );
    registry.register(ClassDeclaration::builder(TypeKey::of("demo::Order")).build());

    let cache = Arc::new(ClassCache::new(registry));
    let ctx = MetamodelContext::new(Arc::new(PassThroughTranslator), Arc::new(IdResolver));
    ctx.value_semantics
        .register(sku, ValueSemantics::typed::<String>());

    let mut model = default_programming_model(&ctx);
    model.init(&AcceptAll);

    SpecificationLoader::new(cache, Arc::new(model), ctx)
}

#[test]
fn test_member_discovery() {
    let loader = fixture();
    let spec = loader.spec_for_type(&TypeKey::of("demo::Customer")).unwrap();

    assert_eq!(spec.bean_sort(), BeanSort::Entity);
    assert_eq!(spec.properties().len(), 1);
    assert_eq!(spec.collections().len(), 1);
    assert_eq!(spec.actions().len(), 1);

    let name = spec.property("name").unwrap();
    assert_eq!(name.element_type().name(), "String");
    assert!(name.get_facet::<PropertyAccessorFacet>().is_some());
    assert!(name.get_facet::<PropertyValidationFacet>().is_some());

    let orders = spec.collection("orders").unwrap();
    assert_eq!(orders.element_type().name(), "demo::Order");
    assert!(orders.get_facet::<CollectionAccessorFacet>().is_some());
    assert!(orders.get_facet::<HiddenFacetViaMethod>().is_some());

    let place_order = spec.action("placeOrder").unwrap();
    assert_eq!(place_order.parameters().len(), 2);
    assert!(place_order.get_facet::<ActionValidationFacet>().is_some());
    assert!(place_order.parameters()[0]
        .get_facet::<ActionParameterValidationFacet>()
        .is_some());
    assert!(place_order.parameters()[1]
        .get_facet::<ActionParameterValidationFacet>()
        .is_none());
}

#[test]
fn test_class_level_facets() {
    let loader = fixture();
    let spec = loader.spec_for_type(&TypeKey::of("demo::Customer")).unwrap();

    let title = spec.get_facet::<TitleFacet>().unwrap();
    assert!(title.is_imperative());
    let pojo = Pojo::new(TypeKey::of("demo::Customer"), 7_i64);
    assert_eq!(title.title(Some(&pojo)), "Customer #7");

    assert!(spec.get_facet::<IconFacet>().is_some());
    assert_eq!(spec.icon_name_of(&pojo), Some("customer".to_string()));
    assert!(spec.get_facet::<EntityFacet>().is_some());
}

#[test]
fn test_support_methods_are_consumed_and_reported() {
    let loader = fixture();
    let spec = loader.spec_for_type(&TypeKey::of("demo::Customer")).unwrap();

    let consumed: Vec<&str> = spec.support_methods().iter().map(|m| m.name()).collect();
    for expected in [
        "title",
        "iconName",
        "validateName",
        "hideOrders",
        "validatePlaceOrder",
        "validate0PlaceOrder",
    ] {
        assert!(consumed.contains(&expected), "missing {}", expected);
    }
    assert!(!consumed.contains(&"validateNickname"));

    // none of the consumed methods surfaced as actions
    for method_name in &consumed {
        assert!(spec.action(method_name).is_none());
    }
}

#[test]
fn test_orphaned_support_method_is_a_validation_failure() {
    let loader = fixture();
    loader.spec_for_type(&TypeKey::of("demo::Customer")).unwrap();

    let failures = loader.validation_failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].message().contains("validateNickname"));
}

#[test]
fn test_specs_are_cached() {
    let loader = fixture();
    let first = loader.spec_for_type(&TypeKey::of("demo::Customer")).unwrap();
    let second = loader.spec_for_type(&TypeKey::of("demo::Customer")).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(loader.spec_for_type(&TypeKey::of("demo::Unknown")).is_none());
}

#[test]
fn test_bean_sorts_and_sort_specific_facets() {
    let loader = fixture();

    let sku = loader.spec_for_type(&TypeKey::of("demo::Sku")).unwrap();
    assert!(sku.is_value());
    let value_facet = sku.get_facet::<ValueFacet>().unwrap();
    let a = Pojo::new(TypeKey::of("demo::Sku"), "A-1".to_string());
    let b = Pojo::new(TypeKey::of("demo::Sku"), "A-1".to_string());
    assert!(value_facet.equal(&a, &b));

    let service = loader
        .spec_for_type(&TypeKey::of("demo::OrderService"))
        .unwrap();
    assert!(service.is_injectable());

    let filter = loader
        .spec_for_type(&TypeKey::of("demo::OrderFilter"))
        .unwrap();
    assert!(filter.is_view_model());
    assert!(filter.get_facet::<ViewModelFacet>().is_some());

    let order = loader.spec_for_type(&TypeKey::of("demo::Order")).unwrap();
    assert_eq!(order.bean_sort(), BeanSort::Other);
    // fallback title from the natural name
    assert_eq!(order.title_of(None), "Order");
}

#[test]
fn test_frozen_specs() {
    let loader = fixture();
    let spec = loader.spec_for_type(&TypeKey::of("demo::Customer")).unwrap();
    assert!(spec.facets().is_frozen());
    assert!(spec.property("name").unwrap().facets().is_frozen());
    assert!(spec.action("placeOrder").unwrap().facets().is_frozen());
}

#[test]
fn test_summary_export_serializes() {
    let loader = fixture();
    loader.spec_for_type(&TypeKey::of("demo::Customer")).unwrap();
    loader.spec_for_type(&TypeKey::of("demo::Sku")).unwrap();

    let summary = loader.summary();
    assert_eq!(summary.specs.len(), 2);
    // sorted by type name
    assert_eq!(summary.specs[0].type_name, "demo::Customer");
    assert_eq!(summary.specs[0].bean_sort, "entity");
    assert!(summary.specs[0].facets.contains(&"title"));
    assert_eq!(summary.validation_failures.len(), 1);

    let json = serde_json::to_string_pretty(&summary).unwrap();
    assert!(json.contains("placeOrder"));
}
