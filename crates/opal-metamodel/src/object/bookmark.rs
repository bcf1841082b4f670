//! Bookmarks
//!
//! A bookmark is a persistent, stable identity reference for an entity or
//! a refreshable view-model. The persistence layer owns resolution; this
//! core only asks "what is the bookmark for this pojo" and branches on
//! presence.

use std::fmt;

use serde::{Deserialize, Serialize};

use opal_core::reflect::decl::TypeKey;
use opal_core::reflect::pojo::Pojo;

/// Stable identity reference: logical type name plus an identifier string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bookmark {
    logical_type_name: String,
    identifier: String,
}

impl Bookmark {
    /// Create a bookmark
    pub fn new(logical_type_name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            logical_type_name: logical_type_name.into(),
            identifier: identifier.into(),
        }
    }

    /// The bookmarked type's logical name
    pub fn logical_type_name(&self) -> &str {
        &self.logical_type_name
    }

    /// The identifier within the type
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.logical_type_name, self.identifier)
    }
}

/// Persistence-layer seam resolving the bookmark for an entity instance.
pub trait BookmarkResolver: Send + Sync {
    /// The bookmark for the given pojo, or `None` when the instance has no
    /// persistent identity yet
    fn bookmark_for(&self, type_key: &TypeKey, pojo: &Pojo) -> Option<Bookmark>;
}

/// Resolver that never finds a bookmark; used when no persistence layer is
/// wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBookmarks;

impl BookmarkResolver for NoBookmarks {
    fn bookmark_for(&self, _type_key: &TypeKey, _pojo: &Pojo) -> Option<Bookmark> {
        None
    }
}
