//! Domain Object Instances
//!
//! A [`Pojo`] pairs an opaque domain value with the key of its declared
//! type, so the metamodel can find the matching specification without
//! downcasting. Method invokers declared on the type operate on pojos and
//! return a closed [`Invoked`] result.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::i18n::TranslatableString;
use crate::reflect::decl::TypeKey;

/// A plain domain object instance, wrapped with its declared type key.
#[derive(Clone)]
pub struct Pojo {
    type_key: TypeKey,
    value: Arc<dyn Any + Send + Sync>,
}

impl Pojo {
    /// Wrap a domain value under its declared type key
    pub fn new<T: Any + Send + Sync>(type_key: TypeKey, value: T) -> Self {
        Self {
            type_key,
            value: Arc::new(value),
        }
    }

    /// The declared type of the wrapped value
    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    /// Borrow the wrapped value as a concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Check whether two pojos wrap the same underlying instance
    pub fn ptr_eq(&self, other: &Pojo) -> bool {
        Arc::as_ptr(&self.value) as *const () == Arc::as_ptr(&other.value) as *const ()
    }
}

impl fmt::Debug for Pojo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pojo")
            .field("type", &self.type_key.name())
            .finish()
    }
}

/// Result of invoking a declared method on a pojo.
///
/// Validation-style facets map [`Invoked::Text`] to a veto reason and
/// [`Invoked::Translatable`] to a translated veto reason; any other result
/// means "valid".
#[derive(Debug, Clone)]
pub enum Invoked {
    /// The method returned nothing
    Unit,
    /// The method returned a boolean
    Truth(bool),
    /// The method returned plain text
    Text(String),
    /// The method returned translatable text
    Translatable(TranslatableString),
    /// The method returned a domain value
    Value(Pojo),
}

/// Callable backing a declared method; receives the target pojo and the
/// argument pojos.
pub type MethodInvoker = Arc<dyn Fn(&Pojo, &[Pojo]) -> Invoked + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast() {
        let pojo = Pojo::new(TypeKey::of("demo::Count"), 41_i64);
        assert_eq!(pojo.downcast_ref::<i64>(), Some(&41));
        assert!(pojo.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_ptr_eq_is_instance_identity() {
        let a = Pojo::new(TypeKey::of("demo::Count"), 1_i64);
        let b = a.clone();
        let c = Pojo::new(TypeKey::of("demo::Count"), 1_i64);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
