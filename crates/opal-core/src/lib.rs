//! Opal Commons
//!
//! This crate provides the commons layer shared by the metamodel:
//! - Feature identifiers (stable keys for classes and members)
//! - Annotation model with meta-annotation synthesis
//! - Class declarations (the registry describing domain types)
//! - Memoizing class cache with non-throwing reflective lookups
//! - Translation seam for user-facing text

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod annot;
pub mod i18n;
pub mod ident;
pub mod reflect;

pub use annot::{Annotation, AnnotationKind, AnnotationSet, AttributeValue};
pub use i18n::{PassThroughTranslator, TranslatableString, TranslationService};
pub use ident::{FeatureKind, Identifier};
pub use reflect::cache::{ClassCache, ClassModel};
pub use reflect::decl::{
    ClassDeclaration, ClassDeclarationBuilder, ConstructorModel, DeclarationRegistry, FieldModel,
    MethodModel, TypeKey,
};
pub use reflect::pojo::{Invoked, MethodInvoker, Pojo};
