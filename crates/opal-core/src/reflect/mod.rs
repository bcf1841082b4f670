//! Declarations and the Memoizing Class Cache
//!
//! Domain types are described by [`decl::ClassDeclaration`]s registered in
//! a [`decl::DeclarationRegistry`]; the [`cache::ClassCache`] memoizes the
//! expensive per-type resolution (hierarchy walk, member filtering,
//! override resolution) into immutable [`cache::ClassModel`]s.

pub mod cache;
pub mod decl;
pub mod pojo;
