//! DOM Module - Arena-based markup tree
//!
//! Implements a mutable tree using:
//! - Arena allocation for nodes
//! - Generational NodeId indices, with parent links as plain ids
//! - Released slots reused by later nodes
//! - A closed set of node kinds carrying their own payload
//! - Namespace lookup over `xmlns` declarations

pub mod doctype;
pub mod document;
pub mod namespace;
pub mod node;
mod serialize;

pub use doctype::{
    identifier_clause, DocumentType, DocumentTypeMut, DocumentTypeRef, Entity, Notation,
};
pub use document::Document;
pub use node::{Attribute, NodeData, NodeId, NodeKind, TreeNode};
