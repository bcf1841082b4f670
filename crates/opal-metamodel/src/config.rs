//! Introspection Configuration

use serde::{Deserialize, Serialize};

/// Defaults for the support-method prefix table.
pub const DEFAULT_SUPPORT_PREFIXES: &[&str] =
    &["hide", "disable", "validate", "default", "choices"];

/// Method names reserved for class-level support and never discovered as
/// members.
pub const RESERVED_METHOD_NAMES: &[&str] = &["title", "iconName", "toString", "memento"];

/// Tunables for the specification loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionConfig {
    /// When true, public methods only become actions if they carry an
    /// explicit Action marker
    pub require_explicit_action_annotation: bool,
    /// When true, support-prefixed methods matched to no member are
    /// reported as validation failures
    pub orphaned_support_is_failure: bool,
    /// Support-method prefix table; overrides the default
    pub support_prefixes: Vec<String>,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            require_explicit_action_annotation: false,
            orphaned_support_is_failure: true,
            support_prefixes: DEFAULT_SUPPORT_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl IntrospectionConfig {
    /// Whether the given method name starts with a support prefix followed
    /// by a capitalized remainder or a digit (per-parameter support)
    pub fn is_support_method_name(&self, name: &str) -> bool {
        self.support_prefixes.iter().any(|prefix| {
            name.len() > prefix.len()
                && name.starts_with(prefix.as_str())
                && name[prefix.len()..]
                    .chars()
                    .next()
                    .map(|c| c.is_uppercase() || c.is_ascii_digit())
                    .unwrap_or(false)
        })
    }

    /// Whether the given method name is reserved for class-level support
    pub fn is_reserved_method_name(&self, name: &str) -> bool {
        RESERVED_METHOD_NAMES.contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_method_name_matching() {
        let config = IntrospectionConfig::default();
        assert!(config.is_support_method_name("validateName"));
        assert!(config.is_support_method_name("validate0PlaceOrder"));
        assert!(config.is_support_method_name("hideNotes"));
        assert!(!config.is_support_method_name("validate"));
        assert!(!config.is_support_method_name("validator"));
        assert!(!config.is_support_method_name("getName"));
    }

    #[test]
    fn test_reserved_names() {
        let config = IntrospectionConfig::default();
        assert!(config.is_reserved_method_name("title"));
        assert!(config.is_reserved_method_name("toString"));
        assert!(!config.is_reserved_method_name("placeOrder"));
    }

    #[test]
    fn test_config_round_trips_through_serde() {
        let config = IntrospectionConfig {
            require_explicit_action_annotation: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: IntrospectionConfig = serde_json::from_str(&json).unwrap();
        assert!(back.require_explicit_action_annotation);
        assert_eq!(back.support_prefixes, config.support_prefixes);
    }
}
