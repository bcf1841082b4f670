//! Class Declarations
//!
//! A [`ClassDeclaration`] is the structural description of one domain type:
//! supertypes, annotations, declared fields, methods, and constructors.
//! Declarations are built with builders and registered in an explicitly
//! constructed [`DeclarationRegistry`] passed by reference to all
//! consumers; there is no ambient global registry.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::annot::{Annotation, AnnotationSet};
use crate::reflect::pojo::{Invoked, MethodInvoker, Pojo};

static OBJECT_ROOT: Lazy<TypeKey> = Lazy::new(|| TypeKey(Arc::from("object")));

/// Interned fully-qualified logical type name.
///
/// A distinguished root key, [`TypeKey::object`], plays the role of the
/// universal base type every declared type ultimately extends.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(Arc<str>);

impl TypeKey {
    /// Key for the given fully-qualified name
    pub fn of(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The universal object base type
    pub fn object() -> Self {
        OBJECT_ROOT.clone()
    }

    /// Fully qualified name
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Name after the last `::` segment
    pub fn simple_name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }

    /// Check whether this is the universal object base type
    pub fn is_object_root(&self) -> bool {
        *self == *OBJECT_ROOT
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.0)
    }
}

/// A declared field.
#[derive(Debug, Clone)]
pub struct FieldModel {
    declaring_type: TypeKey,
    name: Arc<str>,
    field_type: TypeKey,
    annotations: AnnotationSet,
}

impl FieldModel {
    /// Create a field declaration
    pub fn new(declaring_type: TypeKey, name: impl Into<Arc<str>>, field_type: TypeKey) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            field_type,
            annotations: AnnotationSet::empty(),
        }
    }

    /// Attach an annotation
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// The declaring type
    pub fn declaring_type(&self) -> &TypeKey {
        &self.declaring_type
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field type
    pub fn field_type(&self) -> &TypeKey {
        &self.field_type
    }

    /// Annotations on the field
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }
}

/// A declared method: its erased signature, visibility and structural
/// flags, annotations, and an optional invoker backing imperative facets.
#[derive(Clone)]
pub struct MethodModel {
    declaring_type: TypeKey,
    name: Arc<str>,
    param_types: Vec<TypeKey>,
    return_type: Option<TypeKey>,
    collection_of: Option<TypeKey>,
    is_public: bool,
    is_static: bool,
    is_bridge: bool,
    has_generic_placeholder: bool,
    annotations: AnnotationSet,
    invoker: Option<MethodInvoker>,
}

impl MethodModel {
    /// Create a public instance method with no parameters and no return
    pub fn new(declaring_type: TypeKey, name: impl Into<Arc<str>>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            param_types: Vec::new(),
            return_type: None,
            collection_of: None,
            is_public: true,
            is_static: false,
            is_bridge: false,
            has_generic_placeholder: false,
            annotations: AnnotationSet::empty(),
            invoker: None,
        }
    }

    /// Set the erased parameter types
    pub fn with_params(mut self, param_types: Vec<TypeKey>) -> Self {
        self.param_types = param_types;
        self
    }

    /// Set the return type
    pub fn returning(mut self, return_type: TypeKey) -> Self {
        self.return_type = Some(return_type);
        self
    }

    /// Set a collection return type with the given element type
    pub fn returning_collection_of(mut self, element_type: TypeKey) -> Self {
        self.return_type = Some(TypeKey::of(format!("Vec<{}>", element_type.name())));
        self.collection_of = Some(element_type);
        self
    }

    /// Mark as non-public
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as a bridge method
    pub fn as_bridge(mut self) -> Self {
        self.is_bridge = true;
        self
    }

    /// Mark as a generic-bounds-erasure placeholder
    pub fn as_generic_placeholder(mut self) -> Self {
        self.has_generic_placeholder = true;
        self
    }

    /// Attach an annotation
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Attach the callable backing this method
    pub fn with_invoker<F>(mut self, invoker: F) -> Self
    where
        F: Fn(&Pojo, &[Pojo]) -> Invoked + Send + Sync + 'static,
    {
        self.invoker = Some(Arc::new(invoker));
        self
    }

    /// The declaring type
    pub fn declaring_type(&self) -> &TypeKey {
        &self.declaring_type
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Erased parameter types
    pub fn param_types(&self) -> &[TypeKey] {
        &self.param_types
    }

    /// Number of parameters
    pub fn param_count(&self) -> usize {
        self.param_types.len()
    }

    /// Return type; `None` means the method returns nothing
    pub fn return_type(&self) -> Option<&TypeKey> {
        self.return_type.as_ref()
    }

    /// Element type when the method returns a collection
    pub fn collection_of(&self) -> Option<&TypeKey> {
        self.collection_of.as_ref()
    }

    /// Whether the method is public
    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// Whether the method is static
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether the method is a bridge method
    pub fn is_bridge(&self) -> bool {
        self.is_bridge
    }

    /// Whether the method is a generic-bounds-erasure placeholder
    pub fn has_generic_placeholder(&self) -> bool {
        self.has_generic_placeholder
    }

    /// Annotations on the method
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Zero parameters and a non-unit return
    pub fn is_getter(&self) -> bool {
        self.param_types.is_empty() && self.return_type.is_some()
    }

    /// Invoke the backing callable, if one was declared
    pub fn invoke(&self, target: &Pojo, args: &[Pojo]) -> Option<Invoked> {
        self.invoker.as_ref().map(|f| f(target, args))
    }

    /// Check whether both models describe the same erased signature
    pub fn same_signature(&self, other: &MethodModel) -> bool {
        self.name == other.name && self.param_types == other.param_types
    }
}

impl fmt::Debug for MethodModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodModel")
            .field("declaring_type", &self.declaring_type.name())
            .field("name", &self.name)
            .field("param_types", &self.param_types)
            .field("return_type", &self.return_type)
            .field("is_public", &self.is_public)
            .field("has_invoker", &self.invoker.is_some())
            .finish()
    }
}

impl PartialEq for MethodModel {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_type == other.declaring_type
            && self.name == other.name
            && self.param_types == other.param_types
    }
}

impl Eq for MethodModel {}

/// A declared constructor.
#[derive(Debug, Clone)]
pub struct ConstructorModel {
    declaring_type: TypeKey,
    param_types: Vec<TypeKey>,
    is_public: bool,
    annotations: AnnotationSet,
}

impl ConstructorModel {
    /// Create a public constructor with no parameters
    pub fn new(declaring_type: TypeKey) -> Self {
        Self {
            declaring_type,
            param_types: Vec::new(),
            is_public: true,
            annotations: AnnotationSet::empty(),
        }
    }

    /// Set the erased parameter types
    pub fn with_params(mut self, param_types: Vec<TypeKey>) -> Self {
        self.param_types = param_types;
        self
    }

    /// Mark as non-public
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Attach an annotation
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// The declaring type
    pub fn declaring_type(&self) -> &TypeKey {
        &self.declaring_type
    }

    /// Erased parameter types
    pub fn param_types(&self) -> &[TypeKey] {
        &self.param_types
    }

    /// Whether the constructor is public
    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// Annotations on the constructor
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }
}

/// The structural description of one domain type.
#[derive(Debug, Clone)]
pub struct ClassDeclaration {
    type_key: TypeKey,
    supertypes: Vec<TypeKey>,
    is_abstract: bool,
    annotations: AnnotationSet,
    fields: Vec<FieldModel>,
    methods: Vec<MethodModel>,
    constructors: Vec<ConstructorModel>,
}

impl ClassDeclaration {
    /// Start building a declaration for the given type
    pub fn builder(type_key: TypeKey) -> ClassDeclarationBuilder {
        ClassDeclarationBuilder {
            decl: ClassDeclaration {
                type_key,
                supertypes: Vec::new(),
                is_abstract: false,
                annotations: AnnotationSet::empty(),
                fields: Vec::new(),
                methods: Vec::new(),
                constructors: Vec::new(),
            },
        }
    }

    /// The declared type's key
    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    /// Direct supertypes, nearest first
    pub fn supertypes(&self) -> &[TypeKey] {
        &self.supertypes
    }

    /// Whether the type is abstract
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Annotations on the type
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Declared fields
    pub fn fields(&self) -> &[FieldModel] {
        &self.fields
    }

    /// Declared methods
    pub fn methods(&self) -> &[MethodModel] {
        &self.methods
    }

    /// Declared constructors
    pub fn constructors(&self) -> &[ConstructorModel] {
        &self.constructors
    }
}

/// Builder for [`ClassDeclaration`].
#[derive(Debug)]
pub struct ClassDeclarationBuilder {
    decl: ClassDeclaration,
}

impl ClassDeclarationBuilder {
    /// Add a direct supertype
    pub fn extending(mut self, supertype: TypeKey) -> Self {
        self.decl.supertypes.push(supertype);
        self
    }

    /// Mark the type abstract
    pub fn abstract_type(mut self) -> Self {
        self.decl.is_abstract = true;
        self
    }

    /// Attach a type-level annotation
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.decl.annotations.push(annotation);
        self
    }

    /// Add a declared field
    pub fn field(mut self, field: FieldModel) -> Self {
        self.decl.fields.push(field);
        self
    }

    /// Add a declared method
    pub fn method(mut self, method: MethodModel) -> Self {
        self.decl.methods.push(method);
        self
    }

    /// Add a declared constructor
    pub fn constructor(mut self, constructor: ConstructorModel) -> Self {
        self.decl.constructors.push(constructor);
        self
    }

    /// Finish the declaration
    pub fn build(self) -> ClassDeclaration {
        self.decl
    }
}

/// Registry of class declarations, keyed by type.
///
/// Explicitly constructed at bootstrap and passed by reference to every
/// consumer; the test-harness path is to construct a fresh registry.
#[derive(Debug, Default)]
pub struct DeclarationRegistry {
    declarations: RwLock<FxHashMap<TypeKey, Arc<ClassDeclaration>>>,
}

impl DeclarationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration, replacing any previous one for the type
    pub fn register(&self, declaration: ClassDeclaration) -> TypeKey {
        let key = declaration.type_key().clone();
        self.declarations
            .write()
            .insert(key.clone(), Arc::new(declaration));
        key
    }

    /// Look up the declaration for a type
    pub fn lookup(&self, type_key: &TypeKey) -> Option<Arc<ClassDeclaration>> {
        self.declarations.read().get(type_key).cloned()
    }

    /// All registered type keys, in no particular order
    pub fn type_keys(&self) -> Vec<TypeKey> {
        self.declarations.read().keys().cloned().collect()
    }

    /// The supertype closure of a type, starting with the type itself,
    /// breadth-first over declared supertypes, without duplicates. The
    /// object root is not included.
    pub fn hierarchy_of(&self, type_key: &TypeKey) -> Vec<TypeKey> {
        let mut chain = Vec::new();
        let mut queue = vec![type_key.clone()];
        while let Some(next) = queue.pop() {
            if next.is_object_root() || chain.contains(&next) {
                continue;
            }
            if let Some(decl) = self.lookup(&next) {
                queue.extend(decl.supertypes().iter().cloned());
            }
            chain.push(next);
        }
        chain
    }

    /// Reflexive, transitive subtype check. Every type is a subtype of the
    /// object root.
    pub fn is_subtype_of(&self, sub: &TypeKey, sup: &TypeKey) -> bool {
        if sup.is_object_root() || sub == sup {
            return true;
        }
        self.hierarchy_of(sub).contains(sup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_key_simple_name() {
        assert_eq!(TypeKey::of("demo::orders::Order").simple_name(), "Order");
        assert_eq!(TypeKey::of("Order").simple_name(), "Order");
        assert!(TypeKey::object().is_object_root());
    }

    #[test]
    fn test_builder_produces_declaration() {
        let key = TypeKey::of("demo::Customer");
        let decl = ClassDeclaration::builder(key.clone())
            .extending(TypeKey::of("demo::Party"))
            .field(FieldModel::new(key.clone(), "name", TypeKey::of("String")))
            .method(
                MethodModel::new(key.clone(), "getName").returning(TypeKey::of("String")),
            )
            .constructor(ConstructorModel::new(key.clone()))
            .build();

        assert_eq!(decl.type_key(), &key);
        assert_eq!(decl.supertypes(), &[TypeKey::of("demo::Party")]);
        assert_eq!(decl.fields().len(), 1);
        assert_eq!(decl.methods().len(), 1);
        assert!(decl.methods()[0].is_getter());
    }

    #[test]
    fn test_subtype_relation() {
        let registry = DeclarationRegistry::new();
        let party = TypeKey::of("demo::Party");
        let customer = TypeKey::of("demo::Customer");
        registry.register(ClassDeclaration::builder(party.clone()).abstract_type().build());
        registry.register(
            ClassDeclaration::builder(customer.clone())
                .extending(party.clone())
                .build(),
        );

        assert!(registry.is_subtype_of(&customer, &party));
        assert!(registry.is_subtype_of(&customer, &customer));
        assert!(registry.is_subtype_of(&customer, &TypeKey::object()));
        assert!(!registry.is_subtype_of(&party, &customer));
    }

    #[test]
    fn test_hierarchy_includes_self_first() {
        let registry = DeclarationRegistry::new();
        let a = TypeKey::of("A");
        let b = TypeKey::of("B");
        registry.register(ClassDeclaration::builder(a.clone()).build());
        registry.register(ClassDeclaration::builder(b.clone()).extending(a.clone()).build());

        let chain = registry.hierarchy_of(&b);
        assert_eq!(chain[0], b);
        assert!(chain.contains(&a));
    }
}
