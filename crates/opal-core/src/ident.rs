//! Feature Identifiers
//!
//! An [`Identifier`] names a single feature of the metamodel (a class, a
//! property or collection, or an action) uniquely and stably. Identifiers
//! key facets, permissions, and translation contexts for the lifetime of
//! the process.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::reflect::decl::TypeKey;

/// What kind of feature an [`Identifier`] identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// The type itself
    Class,
    /// A property or collection member
    PropertyOrCollection,
    /// An action member
    Action,
}

impl FeatureKind {
    /// Check if this is an action feature
    pub fn is_action(&self) -> bool {
        matches!(self, FeatureKind::Action)
    }

    /// Check if this is a property or collection feature
    pub fn is_property_or_collection(&self) -> bool {
        matches!(self, FeatureKind::PropertyOrCollection)
    }

    /// Check if this is a class feature
    pub fn is_class(&self) -> bool {
        matches!(self, FeatureKind::Class)
    }
}

/// Stable, immutable key naming a class, property/collection, or action.
///
/// Constructed once per feature during metamodel build and used as a map
/// key throughout the system's lifetime.
#[derive(Debug, Clone)]
pub struct Identifier {
    type_key: TypeKey,
    member_name: Arc<str>,
    parameter_class_names: Vec<Arc<str>>,
    kind: FeatureKind,
    full_identity_string: String,
    member_identity_string: String,
    translation_context: String,
}

impl Identifier {
    /// Identifier for the class itself
    pub fn class_identifier(type_key: TypeKey) -> Self {
        Self::new(type_key, "", Vec::new(), FeatureKind::Class)
    }

    /// Identifier for a property or collection member
    pub fn property_or_collection_identifier(
        type_key: TypeKey,
        member_name: impl Into<Arc<str>>,
    ) -> Self {
        Self::new(
            type_key,
            member_name,
            Vec::new(),
            FeatureKind::PropertyOrCollection,
        )
    }

    /// Identifier for an action member, parameters given as type keys
    pub fn action_identifier(
        type_key: TypeKey,
        action_name: impl Into<Arc<str>>,
        parameter_types: &[TypeKey],
    ) -> Self {
        let names = parameter_types
            .iter()
            .map(|t| Arc::from(t.name()))
            .collect();
        Self::new(type_key, action_name, names, FeatureKind::Action)
    }

    /// Identifier for an action member, parameters given as pre-stringified
    /// type names; produces a value equal to the type-key overload for the
    /// same member.
    pub fn action_identifier_from_names<I, S>(
        type_key: TypeKey,
        action_name: impl Into<Arc<str>>,
        parameter_class_names: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let names = parameter_class_names
            .into_iter()
            .map(Into::into)
            .collect();
        Self::new(type_key, action_name, names, FeatureKind::Action)
    }

    fn new(
        type_key: TypeKey,
        member_name: impl Into<Arc<str>>,
        parameter_class_names: Vec<Arc<str>>,
        kind: FeatureKind,
    ) -> Self {
        let member_name = member_name.into();
        let class_name = type_key.name();

        let member_identity_string = if kind.is_action() {
            let params = parameter_class_names
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(",");
            format!("{}({})", member_name, params)
        } else {
            member_name.to_string()
        };

        let translation_context = format!(
            "{}#{}{}",
            class_name,
            member_name,
            if kind.is_action() { "()" } else { "" }
        );

        let full_identity_string = if member_name.is_empty() {
            class_name.to_string()
        } else {
            format!("{}#{}", class_name, member_identity_string)
        };

        Self {
            type_key,
            member_name,
            parameter_class_names,
            kind,
            full_identity_string,
            member_identity_string,
            translation_context,
        }
    }

    /// The owning type's key
    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    /// The owning type's fully qualified name
    pub fn class_name(&self) -> &str {
        self.type_key.name()
    }

    /// The member name; empty for class identifiers
    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    /// Ordered parameter type names; empty unless this is an action
    pub fn member_parameter_class_names(&self) -> &[Arc<str>] {
        &self.parameter_class_names
    }

    /// What kind of feature this identifies
    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    /// Fully qualified identity string (class-name + member-name + param-class-names)
    pub fn full_identity_string(&self) -> &str {
        &self.full_identity_string
    }

    /// Member identity string (class omitted), including parameters if any
    pub fn member_name_and_parameter_class_names_identity_string(&self) -> &str {
        &self.member_identity_string
    }

    /// Context to be used for translation of user-facing text
    pub fn translation_context(&self) -> &str {
        &self.translation_context
    }

    /// Human-readable name of the owning type's simple name
    pub fn class_natural_name(&self) -> String {
        natural_name(self.type_key.simple_name())
    }

    /// Human-readable name of the member
    pub fn member_natural_name(&self) -> String {
        natural_name(&self.member_name)
    }

    /// Human-readable names of the parameter types
    pub fn member_parameter_natural_names(&self) -> Vec<String> {
        self.parameter_class_names
            .iter()
            .map(|n| natural_name(simple_name_of(n)))
            .collect()
    }
}

// Equality deliberately ignores `kind`: a Class identifier and a
// PropertyOrCollection identifier with coincidentally equal
// class+member+params compare equal. Long-standing contract; consumers key
// on the identity string triple, so changing this would re-partition every
// facet and permission map.
impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.class_name() == other.class_name()
            && self.member_name == other.member_name
            && self.parameter_class_names == other.parameter_class_names
    }
}

impl Eq for Identifier {}

impl std::hash::Hash for Identifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.class_name().hash(state);
        self.member_name.hash(state);
        self.parameter_class_names.hash(state);
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.class_name()
            .cmp(other.class_name())
            .then_with(|| self.member_name.cmp(&other.member_name))
            .then_with(|| self.parameter_class_names.cmp(&other.parameter_class_names))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_identity_string)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.full_identity_string)
    }
}

fn simple_name_of(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// Returns a word-spaced version of a camel-case name, so there are spaces
/// between the words and each word starts with a capital letter. E.g.
/// `"NextAvailableDate"` is returned as `"Next Available Date"`.
///
/// Single left-to-right scan with one character of lookback and lookahead:
/// a space is inserted before an uppercase letter preceded by a lowercase
/// one, before an uppercase letter that ends an acronym run
/// (upper-upper-lower), and before the first digit of a digit run. Names of
/// length <= 1 are simply upper-cased.
pub fn natural_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let length = chars.len();

    if length <= 1 {
        return name.to_uppercase();
    }

    let mut out = String::with_capacity(length + 4);

    // ensure the first character is upper case; the scan looks back at the
    // upper-cased form
    let mut character = chars[0].to_uppercase().next().unwrap_or(chars[0]);
    out.push(character);
    let mut next_character = chars[1];

    for pos in 2..length {
        let previous_character = character;
        character = next_character;
        next_character = chars[pos];

        if previous_character != ' ' {
            if character.is_uppercase() && !previous_character.is_uppercase() {
                out.push(' ');
            }
            if character.is_uppercase()
                && next_character.is_lowercase()
                && previous_character.is_uppercase()
            {
                out.push(' ');
            }
            if character.is_numeric() && !previous_character.is_numeric() {
                out.push(' ');
            }
        }
        out.push(character);
    }
    out.push(next_character);
    out
}
