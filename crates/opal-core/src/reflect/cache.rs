//! Memoizing Class Cache
//!
//! Resolving a type's members (hierarchy walk, inclusion filtering,
//! override resolution) is expensive; the cache does it exactly once per
//! type and answers all lookups from the memoized [`ClassModel`].
//! "Not found" is always an absent result, never an error.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::annot::{AnnotationKind, AnnotationSet};
use crate::reflect::decl::{
    ConstructorModel, DeclarationRegistry, FieldModel, MethodModel, TypeKey,
};

/// Method identity: inspected type, name, erased parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MethodKey {
    type_key: TypeKey,
    name: String,
    param_types: Vec<TypeKey>,
}

impl MethodKey {
    fn of(type_key: &TypeKey, name: &str, param_types: &[TypeKey]) -> Self {
        Self {
            type_key: type_key.clone(),
            name: name.to_string(),
            param_types: param_types.to_vec(),
        }
    }
}

/// Constructor identity: inspected type, erased parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConstructorKey {
    type_key: TypeKey,
    param_types: Vec<TypeKey>,
}

/// The memoized structural facts for one inspected type.
///
/// Immutable after construction except for the attribute-keyed method
/// cache, which is populated idempotently under its own lock.
#[derive(Debug)]
pub struct ClassModel {
    type_key: TypeKey,
    is_abstract: bool,
    annotations: AnnotationSet,
    declared_fields: Vec<FieldModel>,
    declared_methods: Vec<MethodModel>,
    public_constructors: FxHashMap<ConstructorKey, ConstructorModel>,
    inject_constructors: FxHashMap<ConstructorKey, ConstructorModel>,
    public_methods: FxHashMap<MethodKey, MethodModel>,
    post_construct_methods: FxHashMap<MethodKey, MethodModel>,
    non_public_declared_methods: FxHashMap<MethodKey, MethodModel>,
    methods_by_attribute: Mutex<FxHashMap<String, Arc<[MethodModel]>>>,
    has_root_element_semantics: bool,
}

impl ClassModel {
    /// The inspected type
    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    /// Whether the inspected type is abstract
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Type-level annotations
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Declared fields of the inspected type
    pub fn declared_fields(&self) -> &[FieldModel] {
        &self.declared_fields
    }

    /// Declared methods over the whole hierarchy, inclusion-filtered and
    /// override-resolved, in discovery order
    pub fn declared_methods(&self) -> &[MethodModel] {
        &self.declared_methods
    }

    /// Whether the type carries root-element semantics
    pub fn has_root_element_semantics(&self) -> bool {
        self.has_root_element_semantics
    }
}

/// Keep or put the method that overrides the other when two methods
/// key-collide because of inheritance.
fn put_honoring_override(
    registry: &DeclarationRegistry,
    by_key: &mut FxHashMap<MethodKey, MethodModel>,
    order: &mut Vec<MethodKey>,
    key: MethodKey,
    method: MethodModel,
) {
    match by_key.get(&key) {
        None => {
            order.push(key.clone());
            by_key.insert(key, method);
        }
        Some(existing) => {
            // key-clash originating from one method overriding the other;
            // keep the one with the more specific declaring type
            if registry.is_subtype_of(method.declaring_type(), existing.declaring_type()) {
                by_key.insert(key, method);
            }
        }
    }
}

fn is_object_contract_method(method: &MethodModel) -> bool {
    matches!(
        (method.name(), method.param_count()),
        ("toString", 0) | ("hashCode", 0) | ("equals", 1) | ("clone", 0) | ("finalize", 0)
    )
}

fn is_overriding_to_string(method: &MethodModel) -> bool {
    method.name() == "toString"
        && method.param_count() == 0
        && !method.declaring_type().is_object_root()
}

/// Methods excluded from the metamodel: bridge methods, statics, anything
/// declared on the object root, object-contract methods (kept only for an
/// overriding `toString`), and generic-bounds-erasure placeholders.
pub fn method_exclude_filter(method: &MethodModel) -> bool {
    method.is_bridge()
        || method.is_static()
        || method.declaring_type().is_object_root()
        || (is_object_contract_method(method) && !is_overriding_to_string(method))
        || method.has_generic_placeholder()
}

/// Complement of [`method_exclude_filter`]
pub fn method_include_filter(method: &MethodModel) -> bool {
    !method_exclude_filter(method)
}

fn is_inject_semantics(constructor: &ConstructorModel) -> bool {
    constructor
        .annotations()
        .synthesize(AnnotationKind::Inject)
        .is_some()
        || constructor
            .annotations()
            .synthesize(AnnotationKind::Autowired)
            .map(|a| a.attr_bool("required").unwrap_or(true))
            .unwrap_or(false)
}

fn is_post_construct(method: &MethodModel) -> bool {
    method.return_type().is_none()
        && method.param_count() == 0
        && method
            .annotations()
            .synthesize(AnnotationKind::PostConstruct)
            .is_some()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn field_name_for_getter(getter: &MethodModel) -> Option<String> {
    if getter.param_count() > 0 || getter.return_type().is_none() {
        return None;
    }
    let name = getter.name();
    let rest = if name.starts_with("is") && name.len() > 2 {
        &name[2..]
    } else if name.starts_with("get") && name.len() > 3 {
        &name[3..]
    } else {
        return None;
    };
    Some(decapitalize(rest))
}

/// Memoizing class cache.
///
/// Thread-safe behind one coarse lock around the memoization map;
/// concurrent first-time inspections of the same type resolve to the same
/// cached [`ClassModel`] instance. Steady-state reads are map lookups under
/// the same lock.
pub struct ClassCache {
    registry: Arc<DeclarationRegistry>,
    inspected: Mutex<FxHashMap<TypeKey, Arc<ClassModel>>>,
}

impl ClassCache {
    /// Create a cache over the given declaration registry
    pub fn new(registry: Arc<DeclarationRegistry>) -> Self {
        Self {
            registry,
            inspected: Mutex::new(FxHashMap::default()),
        }
    }

    /// The registry this cache resolves declarations from
    pub fn registry(&self) -> &Arc<DeclarationRegistry> {
        &self.registry
    }

    /// Inspect a type, memoized; repeated calls return the same instance.
    /// Unknown types resolve to an empty model, never an error.
    pub fn inspect(&self, type_key: &TypeKey) -> Arc<ClassModel> {
        let mut inspected = self.inspected.lock();
        if let Some(hit) = inspected.get(type_key) {
            return hit.clone();
        }
        let model = Arc::new(self.build_model(type_key));
        inspected.insert(type_key.clone(), model.clone());
        model
    }

    /// Drop every cached entry. Test-harness support only; callers must
    /// quiesce concurrent readers first.
    pub fn invalidate(&self) {
        self.inspected.lock().clear();
    }

    /// Public method lookup that never fails for a missing method
    pub fn lookup_public_method(
        &self,
        type_key: &TypeKey,
        name: &str,
        param_types: &[TypeKey],
    ) -> Option<MethodModel> {
        let model = self.inspect(type_key);
        let key = MethodKey::of(type_key, name, param_types);
        model.public_methods.get(&key).cloned()
    }

    /// Variant of [`Self::lookup_public_method`] that also finds non-public
    /// declared methods
    pub fn lookup_public_or_declared_method(
        &self,
        type_key: &TypeKey,
        name: &str,
        param_types: &[TypeKey],
    ) -> Option<MethodModel> {
        let model = self.inspect(type_key);
        let key = MethodKey::of(type_key, name, param_types);
        model
            .public_methods
            .get(&key)
            .or_else(|| model.non_public_declared_methods.get(&key))
            .cloned()
    }

    /// All public methods of a type
    pub fn public_methods(&self, type_key: &TypeKey) -> Vec<MethodModel> {
        self.inspect(type_key)
            .declared_methods
            .iter()
            .filter(|m| m.is_public())
            .cloned()
            .collect()
    }

    /// All declared methods (public and non-public), in discovery order
    pub fn declared_methods(&self, type_key: &TypeKey) -> Vec<MethodModel> {
        self.inspect(type_key).declared_methods.to_vec()
    }

    /// Declared fields of a type
    pub fn declared_fields(&self, type_key: &TypeKey) -> Vec<FieldModel> {
        self.inspect(type_key).declared_fields.to_vec()
    }

    /// Public constructors of a type
    pub fn public_constructors(&self, type_key: &TypeKey) -> Vec<ConstructorModel> {
        self.inspect(type_key)
            .public_constructors
            .values()
            .cloned()
            .collect()
    }

    /// Public constructor lookup that never fails for a missing constructor
    pub fn lookup_public_constructor(
        &self,
        type_key: &TypeKey,
        param_types: &[TypeKey],
    ) -> Option<ConstructorModel> {
        let model = self.inspect(type_key);
        let key = ConstructorKey {
            type_key: type_key.clone(),
            param_types: param_types.to_vec(),
        };
        model.public_constructors.get(&key).cloned()
    }

    /// Public constructors carrying injection semantics: an Inject marker
    /// (directly or via meta-annotation), or an Autowired marker whose
    /// `required` attribute resolves to true
    pub fn constructors_with_inject_semantics(
        &self,
        type_key: &TypeKey,
    ) -> Vec<ConstructorModel> {
        self.inspect(type_key)
            .inject_constructors
            .values()
            .cloned()
            .collect()
    }

    /// Zero-arg, unit-returning methods carrying a post-construct marker,
    /// public or not
    pub fn post_construct_methods(&self, type_key: &TypeKey) -> Vec<MethodModel> {
        self.inspect(type_key)
            .post_construct_methods
            .values()
            .cloned()
            .collect()
    }

    /// Declared methods passing `filter`, memoized under `attribute_name`
    /// so higher layers can cache their own derived method sets without
    /// re-scanning
    pub fn declared_methods_having<F>(
        &self,
        type_key: &TypeKey,
        attribute_name: &str,
        filter: F,
    ) -> Arc<[MethodModel]>
    where
        F: Fn(&MethodModel) -> bool,
    {
        let model = self.inspect(type_key);
        let mut by_attribute = model.methods_by_attribute.lock();
        if let Some(hit) = by_attribute.get(attribute_name) {
            return hit.clone();
        }
        let computed: Arc<[MethodModel]> = model
            .declared_methods
            .iter()
            .filter(|m| filter(m))
            .cloned()
            .collect();
        by_attribute.insert(attribute_name.to_string(), computed.clone());
        computed
    }

    /// The single declared method with the given name; when overload
    /// candidates remain, the one with the most specific declaring type
    pub fn find_method_uniquely_by_name(
        &self,
        type_key: &TypeKey,
        name: &str,
    ) -> Option<MethodModel> {
        let model = self.inspect(type_key);
        let mut winner: Option<MethodModel> = None;
        for m in model.declared_methods.iter().filter(|m| m.name() == name) {
            winner = Some(match winner {
                None => m.clone(),
                Some(current) => {
                    if self
                        .registry
                        .is_subtype_of(m.declaring_type(), current.declaring_type())
                    {
                        m.clone()
                    } else {
                        current
                    }
                }
            });
        }
        winner
    }

    /// Conventionally-named getter for a field: `get`/`is` + capitalized
    /// field name, best-effort
    pub fn getter_for_field(
        &self,
        type_key: &TypeKey,
        field: &FieldModel,
    ) -> Option<MethodModel> {
        let capitalized = capitalize(field.name());
        ["get", "is"]
            .iter()
            .filter_map(|prefix| {
                self.lookup_public_or_declared_method(
                    type_key,
                    &format!("{}{}", prefix, capitalized),
                    &[],
                )
            })
            .find(|m| m.is_getter())
    }

    /// Field backing a conventionally-named getter, searching the getter's
    /// declaring type and its supertypes, best-effort
    pub fn field_for_getter(&self, getter: &MethodModel) -> Option<FieldModel> {
        if is_object_contract_method(getter) {
            return None;
        }
        let field_name = field_name_for_getter(getter)?;
        for type_key in self.registry.hierarchy_of(getter.declaring_type()) {
            if let Some(decl) = self.registry.lookup(&type_key) {
                if let Some(field) = decl.fields().iter().find(|f| f.name() == field_name) {
                    return Some(field.clone());
                }
            }
        }
        None
    }

    /// Whether the type carries root-element semantics
    pub fn has_root_element_semantics(&self, type_key: &TypeKey) -> bool {
        self.inspect(type_key).has_root_element_semantics
    }

    fn build_model(&self, type_key: &TypeKey) -> ClassModel {
        let decl = self.registry.lookup(type_key);

        let mut order: Vec<MethodKey> = Vec::new();
        let mut by_key: FxHashMap<MethodKey, MethodModel> = FxHashMap::default();
        for hierarchy_key in self.registry.hierarchy_of(type_key) {
            if let Some(d) = self.registry.lookup(&hierarchy_key) {
                for method in d.methods() {
                    if !method_include_filter(method) {
                        continue;
                    }
                    let key = MethodKey::of(type_key, method.name(), method.param_types());
                    put_honoring_override(
                        &self.registry,
                        &mut by_key,
                        &mut order,
                        key,
                        method.clone(),
                    );
                }
            }
        }
        let declared_methods: Vec<MethodModel> = order
            .iter()
            .map(|key| by_key.get(key).expect("key collected above").clone())
            .collect();

        let mut public_constructors = FxHashMap::default();
        let mut inject_constructors = FxHashMap::default();
        let mut declared_fields = Vec::new();
        let mut is_abstract = false;
        let mut annotations = AnnotationSet::empty();
        let mut has_root_element_semantics = false;

        if let Some(d) = &decl {
            declared_fields = d.fields().to_vec();
            is_abstract = d.is_abstract();
            annotations = d.annotations().clone();
            has_root_element_semantics = d
                .annotations()
                .synthesize(AnnotationKind::RootElement)
                .is_some();

            for constructor in d.constructors().iter().filter(|c| c.is_public()) {
                let key = ConstructorKey {
                    type_key: type_key.clone(),
                    param_types: constructor.param_types().to_vec(),
                };
                public_constructors.insert(key.clone(), constructor.clone());
                if is_inject_semantics(constructor) {
                    inject_constructors.insert(key, constructor.clone());
                }
            }
        }

        let mut public_methods = FxHashMap::default();
        let mut post_construct_methods = FxHashMap::default();
        let mut non_public_declared_methods = FxHashMap::default();
        for method in &declared_methods {
            let key = MethodKey::of(type_key, method.name(), method.param_types());
            if is_post_construct(method) {
                post_construct_methods.insert(key.clone(), method.clone());
            }
            if method.is_public() {
                public_methods.insert(key, method.clone());
            } else {
                non_public_declared_methods.insert(key, method.clone());
            }
        }

        ClassModel {
            type_key: type_key.clone(),
            is_abstract,
            annotations,
            declared_fields,
            declared_methods,
            public_constructors,
            inject_constructors,
            public_methods,
            post_construct_methods,
            non_public_declared_methods,
            methods_by_attribute: Mutex::new(FxHashMap::default()),
            has_root_element_semantics,
        }
    }
}

impl std::fmt::Debug for ClassCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassCache")
            .field("inspected_types", &self.inspected.lock().len())
            .finish()
    }
}
