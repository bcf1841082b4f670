//! Member Accessor Facets
//!
//! Accessor invokers return [`Invoked::Value`]; collection accessors wrap
//! their elements as a `Vec<Pojo>` inside the returned value.

use std::any::Any;

use opal_core::reflect::decl::{MethodModel, TypeKey};
use opal_core::reflect::pojo::{Invoked, Pojo};

use crate::facetapi::{Facet, ImperativeAspect, Intent};

/// Reads a property value through its getter.
#[derive(Debug)]
pub struct PropertyAccessorFacet {
    aspect: ImperativeAspect,
}

impl PropertyAccessorFacet {
    /// Backed by the property's getter
    pub fn via_getter(method: MethodModel) -> Self {
        Self {
            aspect: ImperativeAspect::single(method, Intent::Accessor),
        }
    }

    /// The current property value, if the getter yields one
    pub fn value(&self, target: &Pojo) -> Option<Pojo> {
        match self.aspect.method().invoke(target, &[]) {
            Some(Invoked::Value(value)) => Some(value),
            _ => None,
        }
    }
}

impl Facet for PropertyAccessorFacet {
    fn kind_name(&self) -> &'static str {
        "property-accessor"
    }

    fn imperative(&self) -> Option<&ImperativeAspect> {
        Some(&self.aspect)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reads a collection's elements through its getter.
#[derive(Debug)]
pub struct CollectionAccessorFacet {
    aspect: ImperativeAspect,
    element_type: TypeKey,
}

impl CollectionAccessorFacet {
    /// Backed by the collection's getter
    pub fn via_getter(method: MethodModel, element_type: TypeKey) -> Self {
        Self {
            aspect: ImperativeAspect::single(method, Intent::Accessor),
            element_type,
        }
    }

    /// The declared element type
    pub fn element_type(&self) -> &TypeKey {
        &self.element_type
    }

    /// The current elements; empty when the getter yields nothing usable
    pub fn elements(&self, target: &Pojo) -> Vec<Pojo> {
        match self.aspect.method().invoke(target, &[]) {
            Some(Invoked::Value(value)) => value
                .downcast_ref::<Vec<Pojo>>()
                .cloned()
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

impl Facet for CollectionAccessorFacet {
    fn kind_name(&self) -> &'static str {
        "collection-accessor"
    }

    fn imperative(&self) -> Option<&ImperativeAspect> {
        Some(&self.aspect)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
