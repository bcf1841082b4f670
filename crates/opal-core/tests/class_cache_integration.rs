//! Integration tests for the class cache over a deeper hierarchy.
//!
//! Tests cover:
//! - Override resolution across three levels
//! - Exclusion of bridge, static, and placeholder methods
//! - Attribute-keyed memoization across lookups
//! - Full invalidation

use std::sync::Arc;

use opal_core::annot::{Annotation, AnnotationKind};
use opal_core::reflect::cache::ClassCache;
use opal_core::reflect::decl::{
    ClassDeclaration, ConstructorModel, DeclarationRegistry, FieldModel, MethodModel, TypeKey,
};

fn deep_registry() -> Arc<DeclarationRegistry> {
    let registry = DeclarationRegistry::new();
    let base = TypeKey::of("demo::Base");
    let middle = TypeKey::of("demo::Middle");
    let leaf = TypeKey::of("demo::Leaf");

    registry.register(
        ClassDeclaration::builder(base.clone())
            .abstract_type()
            .method(MethodModel::new(base.clone(), "getLabel").returning(TypeKey::of("String")))
            .method(MethodModel::new(base.clone(), "getCount").returning(TypeKey::of("i64")))
            .build(),
    );
    registry.register(
        ClassDeclaration::builder(middle.clone())
            .extending(base.clone())
            .method(MethodModel::new(middle.clone(), "getLabel").returning(TypeKey::of("String")))
            .method(
                MethodModel::new(middle.clone(), "getLabel")
                    .returning(TypeKey::of("String"))
                    .as_bridge(),
            )
            .build(),
    );
    registry.register(
        ClassDeclaration::builder(leaf.clone())
            .extending(middle.clone())
            .field(FieldModel::new(leaf.clone(), "label", TypeKey::of("String")))
            .method(MethodModel::new(leaf.clone(), "getLabel").returning(TypeKey::of("String")))
            .method(
                MethodModel::new(leaf.clone(), "compare")
                    .with_params(vec![TypeKey::of("object")])
                    .as_generic_placeholder(),
            )
            .method(MethodModel::new(leaf.clone(), "create").as_static())
            .constructor(
                ConstructorModel::new(leaf.clone())
                    .annotated(Annotation::of(AnnotationKind::Inject)),
            )
            .build(),
    );
    Arc::new(registry)
}

#[test]
fn test_three_level_override_resolution() {
    let cache = ClassCache::new(deep_registry());
    let leaf = TypeKey::of("demo::Leaf");

    let get_label = cache.lookup_public_method(&leaf, "getLabel", &[]).unwrap();
    assert_eq!(get_label.declaring_type(), &leaf);

    let occurrences = cache
        .declared_methods(&leaf)
        .iter()
        .filter(|m| m.name() == "getLabel")
        .count();
    assert_eq!(occurrences, 1);

    // non-overridden base method is still visible on the leaf
    assert!(cache.lookup_public_method(&leaf, "getCount", &[]).is_some());
}

#[test]
fn test_bridge_static_and_placeholder_methods_are_excluded() {
    let cache = ClassCache::new(deep_registry());
    let leaf = TypeKey::of("demo::Leaf");

    let names: Vec<String> = cache
        .declared_methods(&leaf)
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    assert!(!names.contains(&"compare".to_string()));
    assert!(!names.contains(&"create".to_string()));
    assert_eq!(names.iter().filter(|n| *n == "getLabel").count(), 1);
}

#[test]
fn test_middle_type_sees_its_own_override() {
    let cache = ClassCache::new(deep_registry());
    let middle = TypeKey::of("demo::Middle");

    let get_label = cache.lookup_public_method(&middle, "getLabel", &[]).unwrap();
    assert_eq!(get_label.declaring_type(), &middle);
}

#[test]
fn test_attribute_cache_survives_across_calls() {
    let cache = ClassCache::new(deep_registry());
    let leaf = TypeKey::of("demo::Leaf");

    let first = cache.declared_methods_having(&leaf, "labels", |m| m.name().contains("Label"));
    let second = cache.declared_methods_having(&leaf, "labels", |m| m.name().contains("Label"));
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 1);
}

#[test]
fn test_getter_field_mapping_across_hierarchy() {
    let cache = ClassCache::new(deep_registry());
    let leaf = TypeKey::of("demo::Leaf");

    let field = &cache.declared_fields(&leaf)[0];
    let getter = cache.getter_for_field(&leaf, field).unwrap();
    assert_eq!(getter.name(), "getLabel");

    let back = cache.field_for_getter(&getter).unwrap();
    assert_eq!(back.name(), "label");
}

#[test]
fn test_inject_constructor_discovery() {
    let cache = ClassCache::new(deep_registry());
    let leaf = TypeKey::of("demo::Leaf");
    assert_eq!(cache.constructors_with_inject_semantics(&leaf).len(), 1);
}

#[test]
fn test_invalidate_resets_attribute_caches_too() {
    let cache = ClassCache::new(deep_registry());
    let leaf = TypeKey::of("demo::Leaf");

    let before = cache.declared_methods_having(&leaf, "labels", |m| m.name().contains("Label"));
    cache.invalidate();
    let after = cache.declared_methods_having(&leaf, "labels", |m| m.name().contains("Label"));
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before.len(), after.len());
}
