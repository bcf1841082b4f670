//! Facet API
//!
//! A facet is an attachable unit of behavior or metadata; every concrete
//! facet type is its own facet kind, and a [`FacetHolder`] owns at most one
//! facet per kind. Holders are mutable while the metamodel is under
//! construction and frozen afterwards.

use std::any::{Any, TypeId};
use std::fmt;

use rustc_hash::FxHashMap;

use opal_core::reflect::decl::MethodModel;

/// Why an imperative facet's backing method exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Reads a member value
    Accessor,
    /// Executes an action
    Execute,
    /// Vetoes a proposed value or argument list
    CheckIfValid,
    /// Hides a member
    CheckIfHidden,
    /// Disables a member
    CheckIfDisabled,
    /// Supplies choices or a default
    ChoicesOrDefault,
    /// Supplies a UI hint such as a title or icon
    UiHint,
    /// Lifecycle callback
    LifecycleEvent,
}

/// The imperative side of a facet: the support method(s) backing it and the
/// intent they serve. Methods recorded here were consumed during metamodel
/// build and must not be treated as ordinary members.
#[derive(Debug, Clone)]
pub struct ImperativeAspect {
    methods: Vec<MethodModel>,
    intent: Intent,
}

impl ImperativeAspect {
    /// Aspect backed by a single method
    pub fn single(method: MethodModel, intent: Intent) -> Self {
        Self {
            methods: vec![method],
            intent,
        }
    }

    /// The backing methods
    pub fn methods(&self) -> &[MethodModel] {
        &self.methods
    }

    /// The first backing method
    pub fn method(&self) -> &MethodModel {
        &self.methods[0]
    }

    /// The intent the backing methods serve
    pub fn intent(&self) -> Intent {
        self.intent
    }
}

/// An attachable unit of behavior or metadata.
pub trait Facet: Any + Send + Sync + fmt::Debug {
    /// Stable kind name for diagnostics and the metamodel summary
    fn kind_name(&self) -> &'static str;

    /// The imperative side of this facet, when method-backed
    fn imperative(&self) -> Option<&ImperativeAspect> {
        None
    }

    /// Upcast for kind-keyed retrieval
    fn as_any(&self) -> &dyn Any;
}

/// Owner of a set of facets, keyed by facet kind.
///
/// Mutable until [`FacetHolder::freeze`]; adding a facet of an already
/// present kind replaces it (last writer wins).
#[derive(Debug, Default)]
pub struct FacetHolder {
    facets: FxHashMap<TypeId, Box<dyn Facet>>,
    frozen: bool,
}

impl FacetHolder {
    /// Create an open, empty holder
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a facet, replacing any existing facet of the same kind.
    ///
    /// # Panics
    /// Panics when the holder has been frozen; facets are only contributed
    /// during metamodel build.
    pub fn add_facet<F: Facet>(&mut self, facet: F) {
        assert!(
            !self.frozen,
            "facet holder is frozen, cannot add facet '{}'",
            facet.kind_name()
        );
        self.facets.insert(TypeId::of::<F>(), Box::new(facet));
    }

    /// The facet of the given kind, if present
    pub fn get_facet<F: Facet>(&self) -> Option<&F> {
        self.facets
            .get(&TypeId::of::<F>())
            .and_then(|f| f.as_any().downcast_ref::<F>())
    }

    /// Check for a facet of the given kind
    pub fn contains_facet<F: Facet>(&self) -> bool {
        self.facets.contains_key(&TypeId::of::<F>())
    }

    /// Number of facets held
    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    /// Kind names of all held facets, sorted for stable output
    pub fn facet_kind_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> =
            self.facets.values().map(|f| f.kind_name()).collect();
        names.sort_unstable();
        names
    }

    /// Backing methods of every imperative facet held
    pub fn imperative_methods(&self) -> Vec<MethodModel> {
        self.facets
            .values()
            .filter_map(|f| f.imperative())
            .flat_map(|aspect| aspect.methods().iter().cloned())
            .collect()
    }

    /// Close the holder for mutation
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether the holder has been frozen
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}
