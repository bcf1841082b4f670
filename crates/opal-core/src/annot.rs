//! Annotation Model
//!
//! Declarations carry annotations the metamodel inspects for presence and
//! attribute values. An annotation may itself be meta-annotated; synthesis
//! resolves presence either directly or through the meta-annotation chain,
//! so convention markers can be composed.

use rustc_hash::FxHashMap;

/// Marker kinds the metamodel understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// Constructor injection marker
    Inject,
    /// Autowire marker with a `required` attribute (defaults to true)
    Autowired,
    /// Zero-arg lifecycle callback invoked after construction
    PostConstruct,
    /// Root-element marker for externalizable types
    RootElement,
    /// Plain domain object
    DomainObject,
    /// Injectable domain service
    DomainService,
    /// View model (state travels with its bookmark)
    ViewModel,
    /// Value type with value semantics
    Value,
    /// Persistence-managed entity
    Entity,
    /// Mixin contributing members to another type
    Mixin,
    /// Explicit action marker
    Action,
    /// Explicit property marker
    Property,
    /// Explicit collection marker
    Collection,
    /// Excluded from the metamodel entirely
    Programmatic,
}

/// An annotation attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Boolean attribute
    Bool(bool),
    /// Integer attribute
    Int(i64),
    /// Text attribute
    Text(String),
}

/// A single annotation instance: a kind, named attributes, and any
/// meta-annotations present on the annotation itself.
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    kind: Option<AnnotationKind>,
    attributes: FxHashMap<String, AttributeValue>,
    meta: Vec<Annotation>,
}

impl Annotation {
    /// Create an annotation of the given kind
    pub fn of(kind: AnnotationKind) -> Self {
        Self {
            kind: Some(kind),
            attributes: FxHashMap::default(),
            meta: Vec::new(),
        }
    }

    /// Attach a named attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Attach a meta-annotation
    pub fn with_meta(mut self, meta: Annotation) -> Self {
        self.meta.push(meta);
        self
    }

    /// The annotation's kind
    pub fn kind(&self) -> Option<AnnotationKind> {
        self.kind
    }

    /// Boolean attribute lookup
    pub fn attr_bool(&self, name: &str) -> Option<bool> {
        match self.attributes.get(name) {
            Some(AttributeValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Integer attribute lookup
    pub fn attr_int(&self, name: &str) -> Option<i64> {
        match self.attributes.get(name) {
            Some(AttributeValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Text attribute lookup
    pub fn attr_text(&self, name: &str) -> Option<&str> {
        match self.attributes.get(name) {
            Some(AttributeValue::Text(t)) => Some(t.as_str()),
            _ => None,
        }
    }

    fn find(&self, kind: AnnotationKind) -> Option<&Annotation> {
        if self.kind == Some(kind) {
            return Some(self);
        }
        self.meta.iter().find_map(|m| m.find(kind))
    }
}

/// The set of annotations declared on one element.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    annotations: Vec<Annotation>,
}

impl AnnotationSet {
    /// The empty set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from the given annotations
    pub fn of(annotations: Vec<Annotation>) -> Self {
        Self { annotations }
    }

    /// Add an annotation to the set
    pub fn push(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Directly declared annotation of the given kind, ignoring
    /// meta-annotations
    pub fn direct(&self, kind: AnnotationKind) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.kind() == Some(kind))
    }

    /// Resolve an annotation of the given kind, either directly declared or
    /// reachable through meta-annotations (depth-first)
    pub fn synthesize(&self, kind: AnnotationKind) -> Option<&Annotation> {
        self.annotations.iter().find_map(|a| a.find(kind))
    }

    /// Check for presence, directly or via meta-annotations
    pub fn is_present(&self, kind: AnnotationKind) -> bool {
        self.synthesize(kind).is_some()
    }
}
