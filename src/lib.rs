//! RustyDOM - Arena-based markup tree with a document type node
//!
//! Pieces:
//! A: Arena tree with ordered children and index-based parent links (dom::document)
//! B: Document type node with sibling navigation, cloning and serialization (dom::doctype)
//! C: Namespace lookup over `xmlns` declarations (dom::namespace)
//! D: DOCTYPE declaration reader, lenient or strict (core::doctype)
//!
//! ```
//! use rustydom::Document;
//!
//! let mut doc = Document::new();
//! let doctype = doc.read_document_type("<!DOCTYPE html SYSTEM \"about:legacy-compat\">")?;
//! let html = doc.create_element("html");
//! doc.append_child(doc.root(), doctype)?;
//! doc.append_child(doc.root(), html)?;
//!
//! let view = doc.document_type(doctype).unwrap();
//! assert_eq!(view.next_element_sibling(), Some(html));
//! assert_eq!(view.to_html(), "<!DOCTYPE html SYSTEM \"about:legacy-compat\">");
//! # Ok::<(), rustydom::DomError>(())
//! ```

pub mod core;
pub mod dom;
pub mod error;

pub use crate::core::doctype::{DoctypeDecl, DoctypeReader};
pub use dom::{
    identifier_clause, Attribute, Document, DocumentType, DocumentTypeMut, DocumentTypeRef,
    Entity, NodeData, NodeId, NodeKind, Notation, TreeNode,
};
pub use error::{DomError, Result};
