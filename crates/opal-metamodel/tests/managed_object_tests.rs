//! Integration tests for managed objects and specialization inference.
//!
//! Tests cover:
//! - The total, ordered inference function over (spec, pojo) pairs
//! - Entity bookmark resolution with the detached fallback
//! - The legacy bookmarked factory's compatibility check
//! - Specialization-delegated equality

use std::sync::Arc;

use opal_core::annot::{Annotation, AnnotationKind};
use opal_core::i18n::PassThroughTranslator;
use opal_core::reflect::cache::ClassCache;
use opal_core::reflect::decl::{ClassDeclaration, DeclarationRegistry, MethodModel, TypeKey};
use opal_core::reflect::pojo::{Invoked, Pojo};

use opal_metamodel::facets::ValueSemantics;
use opal_metamodel::object::bookmark::{Bookmark, BookmarkResolver};
use opal_metamodel::{
    default_programming_model, AcceptAll, ManagedObject, MetamodelContext, ObjectError,
    Specialization, SpecificationLoader,
};

struct IdResolver;

impl BookmarkResolver for IdResolver {
    fn bookmark_for(&self, type_key: &TypeKey, pojo: &Pojo) -> Option<Bookmark> {
        pojo.downcast_ref::<i64>()
            .filter(|id| **id > 0)
            .map(|id| Bookmark::new(type_key.name(), id.to_string()))
    }
}

fn fixture() -> (Arc<DeclarationRegistry>, SpecificationLoader) {
    let registry = Arc::new(DeclarationRegistry::new());
    let amount = TypeKey::of("demo::Amount");
    let filter = TypeKey::of("demo::OrderFilter");

    registry.register(
        ClassDeclaration::builder(TypeKey::of("demo::Customer"))
            .annotated(Annotation::of(AnnotationKind::Entity))
            .build(),
    );
    registry.register(
        ClassDeclaration::builder(amount.clone())
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
    registry.register(
        ClassDeclaration::builder(TypeKey::of("demo::Customer_export"))
            .annotated(Annotation::of(AnnotationKind::Mixin))
            .build(),
    );
    registry.register(
        ClassDeclaration::builder(TypeKey::of("demo::OrderList"))
            .annotated(Annotation::of(AnnotationKind::Collection))
            .build(),
    );
    registry.register(
        ClassDeclaration::builder(TypeKey::of("demo::Party"))
            .abstract_type()
            .build(),
    );
    registry.register(ClassDeclaration::builder(TypeKey::of("demo::Order")).build());

    let cache = Arc::new(ClassCache::new(registry.clone()));
    let ctx = MetamodelContext::new(Arc::new(PassThroughTranslator), Arc::new(IdResolver));
    ctx.value_semantics
        .register(amount, ValueSemantics::typed::<i64>());

    let mut model = default_programming_model(&ctx);
    model.init(&AcceptAll);

    (registry, SpecificationLoader::new(cache, Arc::new(model), ctx))
}

#[test]
fn test_inference_priority_order() {
    let (_registry, loader) = fixture();
    let pojo = Pojo::new(TypeKey::of("demo::Order"), ());

    assert_eq!(
        Specialization::infer_from(None, Some(&pojo)),
        Specialization::Unspecified
    );

    let packed = loader.spec_for_type(&TypeKey::of("demo::OrderList")).unwrap();
    assert_eq!(
        Specialization::infer_from(Some(&packed), Some(&pojo)),
        Specialization::Packed
    );

    let entity = loader.spec_for_type(&TypeKey::of("demo::Customer")).unwrap();
    assert_eq!(
        Specialization::infer_from(Some(&entity), None),
        Specialization::Empty
    );
    assert_eq!(
        Specialization::infer_from(Some(&entity), Some(&pojo)),
        Specialization::Entity
    );

    let value = loader.spec_for_type(&TypeKey::of("demo::Amount")).unwrap();
    assert_eq!(
        Specialization::infer_from(Some(&value), Some(&pojo)),
        Specialization::Value
    );

    let service = loader
        .spec_for_type(&TypeKey::of("demo::OrderService"))
        .unwrap();
    assert_eq!(
        Specialization::infer_from(Some(&service), Some(&pojo)),
        Specialization::Service
    );

    let viewmodel = loader
        .spec_for_type(&TypeKey::of("demo::OrderFilter"))
        .unwrap();
    assert_eq!(
        Specialization::infer_from(Some(&viewmodel), Some(&pojo)),
        Specialization::Viewmodel
    );

    let mixin = loader
        .spec_for_type(&TypeKey::of("demo::Customer_export"))
        .unwrap();
    assert_eq!(
        Specialization::infer_from(Some(&mixin), Some(&pojo)),
        Specialization::Mixin
    );

    let other = loader.spec_for_type(&TypeKey::of("demo::Order")).unwrap();
    assert_eq!(
        Specialization::infer_from(Some(&other), Some(&pojo)),
        Specialization::Other
    );

    // abstract and unmatched degrades rather than fails
    let party = loader.spec_for_type(&TypeKey::of("demo::Party")).unwrap();
    assert_eq!(
        Specialization::infer_from(Some(&party), Some(&pojo)),
        Specialization::Unspecified
    );
}

#[test]
fn test_entity_bookmark_resolution_and_detached_fallback() {
    let (_registry, loader) = fixture();
    let customer = TypeKey::of("demo::Customer");
    let spec = loader.spec_for_type(&customer).unwrap();

    // resolvable id -> attached
    let persistent = ManagedObject::entity(
        spec.clone(),
        Some(Pojo::new(customer.clone(), 42_i64)),
        None,
    );
    assert_eq!(persistent.specialization(), Specialization::Entity);
    assert!(!persistent.is_detached_entity());
    let bookmark = persistent.bookmark().unwrap();
    assert_eq!(bookmark.identifier(), "42");

    // unresolvable id -> detached, not an error
    let transient = ManagedObject::entity(
        spec.clone(),
        Some(Pojo::new(customer.clone(), 0_i64)),
        None,
    );
    assert!(transient.is_detached_entity());
    assert!(transient.bookmark().is_none());

    // missing pojo -> empty
    let empty = ManagedObject::entity(spec, None, None);
    assert_eq!(empty.specialization(), Specialization::Empty);
}

#[test]
fn test_bookmarked_rejects_incompatible_pojo() {
    let (registry, loader) = fixture();
    let spec = loader.spec_for_type(&TypeKey::of("demo::Customer")).unwrap();
    let wrong = Pojo::new(TypeKey::of("demo::Amount"), 5_i64);

    let result = ManagedObject::bookmarked(
        &registry,
        spec,
        wrong,
        Bookmark::new("demo::Customer", "1"),
    );
    match result {
        Err(ObjectError::IncompatiblePojo { expected, actual }) => {
            assert_eq!(expected, "demo::Customer");
            assert_eq!(actual, "demo::Amount");
        }
        other => panic!("expected incompatible-pojo error, got {:?}", other),
    }
}

#[test]
fn test_bookmarked_accepts_compatible_pojo() {
    let (registry, loader) = fixture();
    let customer = TypeKey::of("demo::Customer");
    let spec = loader.spec_for_type(&customer).unwrap();

    let adapted = ManagedObject::bookmarked(
        &registry,
        spec,
        Pojo::new(customer.clone(), 7_i64),
        Bookmark::new("demo::Customer", "7"),
    )
    .unwrap();
    assert_eq!(adapted.specialization(), Specialization::Entity);
    assert_eq!(adapted.bookmark().unwrap().identifier(), "7");
}

#[test]
fn test_adapt_scalar_dispatch() {
    let (_registry, loader) = fixture();

    let service = ManagedObject::adapt_scalar(
        &loader,
        Pojo::new(TypeKey::of("demo::OrderService"), ()),
    );
    assert_eq!(service.specialization(), Specialization::Service);

    let other = ManagedObject::adapt_scalar(&loader, Pojo::new(TypeKey::of("demo::Order"), ()));
    assert_eq!(other.specialization(), Specialization::Other);

    let unknown =
        ManagedObject::adapt_scalar(&loader, Pojo::new(TypeKey::of("demo::Unknown"), ()));
    assert_eq!(unknown.specialization(), Specialization::Unspecified);
}

#[test]
fn test_equality_is_specialization_delegated() {
    let (_registry, loader) = fixture();

    // bookmark-equal entities compare equal across wrapper instances
    let customer = TypeKey::of("demo::Customer");
    let entity_spec = loader.spec_for_type(&customer).unwrap();
    let a = ManagedObject::entity(
        entity_spec.clone(),
        Some(Pojo::new(customer.clone(), 42_i64)),
        None,
    );
    let b = ManagedObject::entity(
        entity_spec.clone(),
        Some(Pojo::new(customer.clone(), 42_i64)),
        None,
    );
    assert_eq!(a, b);

    // detached entities fall back to instance identity
    let c = ManagedObject::entity(
        entity_spec.clone(),
        Some(Pojo::new(customer.clone(), 0_i64)),
        None,
    );
    let d = ManagedObject::entity(entity_spec, Some(Pojo::new(customer, 0_i64)), None);
    assert_ne!(c, d);

    // equal values compare equal regardless of wrapper or instance
    let amount = TypeKey::of("demo::Amount");
    let value_spec = loader.spec_for_type(&amount).unwrap();
    let v1 = ManagedObject::value(value_spec.clone(), Some(Pojo::new(amount.clone(), 100_i64)));
    let v2 = ManagedObject::value(value_spec.clone(), Some(Pojo::new(amount.clone(), 100_i64)));
    let v3 = ManagedObject::value(value_spec, Some(Pojo::new(amount, 250_i64)));
    assert_eq!(v1, v2);
    assert_ne!(v1, v3);

    // state-equal view-models compare equal via their refreshable bookmarks
    let filter = TypeKey::of("demo::OrderFilter");
    let vm_spec = loader.spec_for_type(&filter).unwrap();
    let f1 = ManagedObject::viewmodel(
        vm_spec.clone(),
        Some(Pojo::new(filter.clone(), "open-orders".to_string())),
    );
    let f2 = ManagedObject::viewmodel(
        vm_spec.clone(),
        Some(Pojo::new(filter.clone(), "open-orders".to_string())),
    );
    let f3 = ManagedObject::viewmodel(
        vm_spec,
        Some(Pojo::new(filter, "closed-orders".to_string())),
    );
    assert_eq!(f1, f2);
    assert_ne!(f1, f3);

    // different specializations never compare equal
    assert_ne!(v1, f1);
    assert_eq!(ManagedObject::unspecified(), ManagedObject::unspecified());
}

#[test]
fn test_packed_wraps_elements() {
    let (_registry, loader) = fixture();
    let order = TypeKey::of("demo::Order");
    let order_spec = loader.spec_for_type(&order).unwrap();

    let elements = vec![
        ManagedObject::other(order_spec.clone(), Some(Pojo::new(order.clone(), 1_i64))),
        ManagedObject::other(order_spec.clone(), Some(Pojo::new(order, 2_i64))),
    ];
    let packed = ManagedObject::packed(order_spec, elements);

    assert_eq!(packed.specialization(), Specialization::Packed);
    assert_eq!(packed.unpack().len(), 2);
    assert!(packed.bookmark().is_none());
    assert_eq!(packed.title(), "2 x Order");
}
