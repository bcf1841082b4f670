//! Entity Facet

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use opal_core::reflect::decl::TypeKey;
use opal_core::reflect::pojo::Pojo;

use crate::facetapi::Facet;
use crate::object::bookmark::{Bookmark, BookmarkResolver};

/// Marks a specification as persistence-managed and carries the seam used
/// to resolve entity bookmarks.
#[derive(Clone)]
pub struct EntityFacet {
    resolver: Arc<dyn BookmarkResolver>,
}

impl EntityFacet {
    /// Create over the given persistence seam
    pub fn new(resolver: Arc<dyn BookmarkResolver>) -> Self {
        Self { resolver }
    }

    /// Resolve the bookmark for an entity instance; `None` means the
    /// instance is not persistent yet
    pub fn bookmark_for(&self, type_key: &TypeKey, pojo: &Pojo) -> Option<Bookmark> {
        self.resolver.bookmark_for(type_key, pojo)
    }
}

impl fmt::Debug for EntityFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EntityFacet")
    }
}

impl Facet for EntityFacet {
    fn kind_name(&self) -> &'static str {
        "entity"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
