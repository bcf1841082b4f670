//! Value Facet and Value Semantics

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use opal_core::reflect::decl::TypeKey;
use opal_core::reflect::pojo::Pojo;

use crate::facetapi::Facet;

/// Equality and rendering behavior for a value type.
#[derive(Clone)]
pub struct ValueSemantics {
    eq: Arc<dyn Fn(&Pojo, &Pojo) -> bool + Send + Sync>,
    render: Arc<dyn Fn(&Pojo) -> String + Send + Sync>,
}

impl ValueSemantics {
    /// Create from explicit equality and rendering functions
    pub fn new<E, R>(eq: E, render: R) -> Self
    where
        E: Fn(&Pojo, &Pojo) -> bool + Send + Sync + 'static,
        R: Fn(&Pojo) -> String + Send + Sync + 'static,
    {
        Self {
            eq: Arc::new(eq),
            render: Arc::new(render),
        }
    }

    /// Semantics for a concrete Rust value type, using its `PartialEq` and
    /// `Display`
    pub fn typed<T>() -> Self
    where
        T: Any + PartialEq + fmt::Display + Send + Sync,
    {
        Self::new(
            |a, b| match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
            |p| {
                p.downcast_ref::<T>()
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            },
        )
    }

    /// Instance-identity fallback, rendering the declared type name
    pub fn identity() -> Self {
        Self::new(
            |a, b| a.ptr_eq(b),
            |p| p.type_key().name().to_string(),
        )
    }

    /// Value equality
    pub fn equal(&self, a: &Pojo, b: &Pojo) -> bool {
        (self.eq)(a, b)
    }

    /// User-facing rendering
    pub fn render(&self, pojo: &Pojo) -> String {
        (self.render)(pojo)
    }
}

impl fmt::Debug for ValueSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueSemantics")
    }
}

/// Registry of value semantics keyed by type, populated at bootstrap.
#[derive(Debug, Default)]
pub struct ValueSemanticsRegistry {
    by_type: RwLock<FxHashMap<TypeKey, ValueSemantics>>,
}

impl ValueSemanticsRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register semantics for a type, replacing any previous registration
    pub fn register(&self, type_key: TypeKey, semantics: ValueSemantics) {
        self.by_type.write().insert(type_key, semantics);
    }

    /// Look up semantics for a type
    pub fn lookup(&self, type_key: &TypeKey) -> Option<ValueSemantics> {
        self.by_type.read().get(type_key).cloned()
    }
}

/// Marks a specification as a value type and carries its semantics.
#[derive(Debug)]
pub struct ValueFacet {
    semantics: ValueSemantics,
}

impl ValueFacet {
    /// Create with the given semantics
    pub fn new(semantics: ValueSemantics) -> Self {
        Self { semantics }
    }

    /// Value equality for two wrapped instances
    pub fn equal(&self, a: &Pojo, b: &Pojo) -> bool {
        self.semantics.equal(a, b)
    }

    /// User-facing rendering of a wrapped instance
    pub fn render(&self, pojo: &Pojo) -> String {
        self.semantics.render(pojo)
    }
}

impl Facet for ValueFacet {
    fn kind_name(&self) -> &'static str {
        "value"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_semantics_compare_by_value() {
        let semantics = ValueSemantics::typed::<i64>();
        let money = TypeKey::of("demo::Amount");
        let a = Pojo::new(money.clone(), 100_i64);
        let b = Pojo::new(money.clone(), 100_i64);
        let c = Pojo::new(money, 250_i64);

        assert!(semantics.equal(&a, &b));
        assert!(!semantics.equal(&a, &c));
        assert_eq!(semantics.render(&c), "250");
    }

    #[test]
    fn test_identity_semantics_compare_by_instance() {
        let semantics = ValueSemantics::identity();
        let key = TypeKey::of("demo::Opaque");
        let a = Pojo::new(key.clone(), 1_i64);
        let b = a.clone();
        let c = Pojo::new(key, 1_i64);

        assert!(semantics.equal(&a, &b));
        assert!(!semantics.equal(&a, &c));
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ValueSemanticsRegistry::new();
        let key = TypeKey::of("demo::Amount");
        registry.register(key.clone(), ValueSemantics::typed::<i64>());
        assert!(registry.lookup(&key).is_some());
        assert!(registry.lookup(&TypeKey::of("demo::Other")).is_none());
    }
}
