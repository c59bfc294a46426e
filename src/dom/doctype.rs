//! Document Type Node
//!
//! The `<!DOCTYPE ...>` node of a document. Its name is the generic node name
//! and never changes after construction; the public identifier, system
//! identifier and internal subset are mutable. Entity and notation lists are
//! always empty.
//!
//! Access goes through two handles borrowed from the `Document`:
//! - `DocumentTypeRef` for queries (navigation, serialization, namespaces)
//! - `DocumentTypeMut` for identifier setters, cloning and tree mutation

use super::document::Document;
use super::node::{NodeData, NodeId, NodeKind};
use crate::core::doctype::{DoctypeDecl, DoctypeReader};
use crate::error::Result;

/// Entity declared by a document type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub notation_name: Option<String>,
}

/// Notation declared by a document type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notation {
    pub name: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
}

/// Kind-specific state of a document type node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentType {
    public_identifier: Option<String>,
    system_identifier: Option<String>,
    internal_subset: Option<String>,
}

impl DocumentType {
    /// Payload with no identifiers and no internal subset
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the public identifier (`PUBLIC "..."`)
    pub fn public_identifier(&self) -> Option<&str> {
        self.public_identifier.as_deref()
    }

    /// Get the system identifier (`SYSTEM "..."`)
    pub fn system_identifier(&self) -> Option<&str> {
        self.system_identifier.as_deref()
    }

    /// Get the raw internal subset text between `[` and `]`
    pub fn internal_subset(&self) -> Option<&str> {
        self.internal_subset.as_deref()
    }

    /// Set or clear the public identifier
    pub fn set_public_identifier(&mut self, value: Option<String>) {
        self.public_identifier = value;
    }

    /// Set or clear the system identifier
    pub fn set_system_identifier(&mut self, value: Option<String>) {
        self.system_identifier = value;
    }

    /// Set or clear the internal subset
    pub fn set_internal_subset(&mut self, value: Option<String>) {
        self.internal_subset = value;
    }

    /// Always empty
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        std::iter::empty()
    }

    /// Always empty
    pub fn notations(&self) -> impl Iterator<Item = &Notation> + '_ {
        std::iter::empty()
    }

    /// Copy the three identifier fields, the part of a clone the generic
    /// tree copy knows nothing about
    pub fn copy_identifiers_to(&self, target: &mut DocumentType) {
        target.public_identifier.clone_from(&self.public_identifier);
        target.system_identifier.clone_from(&self.system_identifier);
        target.internal_subset.clone_from(&self.internal_subset);
    }

    /// Serialize as `<!DOCTYPE {name} {ids}>`.
    ///
    /// The space before `>` stays even when there are no identifiers, and
    /// quote characters inside identifiers are written as they are.
    pub fn to_html(&self, name: &str) -> String {
        let ids = identifier_clause(self.public_identifier(), self.system_identifier());
        format!("<!DOCTYPE {name} {ids}>")
    }
}

/// Format the external identifier part of a DOCTYPE declaration.
///
/// Empty strings count as absent.
pub fn identifier_clause(public_id: Option<&str>, system_id: Option<&str>) -> String {
    let public_id = public_id.filter(|id| !id.is_empty());
    let system_id = system_id.filter(|id| !id.is_empty());

    match (public_id, system_id) {
        (None, None) => String::new(),
        (Some(public_id), None) => format!("PUBLIC \"{public_id}\""),
        (None, Some(system_id)) => format!("SYSTEM \"{system_id}\""),
        (Some(public_id), Some(system_id)) => format!("PUBLIC \"{public_id}\" \"{system_id}\""),
    }
}

/// Read-only view of a document type node
#[derive(Debug, Clone, Copy)]
pub struct DocumentTypeRef<'a> {
    document: &'a Document,
    id: NodeId,
    name: &'a str,
    data: &'a DocumentType,
}

impl<'a> DocumentTypeRef<'a> {
    pub(crate) fn new(document: &'a Document, id: NodeId) -> Option<Self> {
        let node = document.get_node(id)?;
        match node.data() {
            NodeData::DocumentType(data) => Some(DocumentTypeRef {
                document,
                id,
                name: node.name(),
                data,
            }),
            _ => None,
        }
    }

    /// Get the node ID
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The name given at construction
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Get the public identifier
    pub fn public_identifier(&self) -> Option<&'a str> {
        self.data.public_identifier()
    }

    /// Get the system identifier
    pub fn system_identifier(&self) -> Option<&'a str> {
        self.data.system_identifier()
    }

    /// Get the internal subset
    pub fn internal_subset(&self) -> Option<&'a str> {
        self.data.internal_subset()
    }

    /// Declared entities, always empty
    pub fn entities(&self) -> impl Iterator<Item = &'a Entity> + 'a {
        self.data.entities()
    }

    /// Declared notations, always empty
    pub fn notations(&self) -> impl Iterator<Item = &'a Notation> + 'a {
        self.data.notations()
    }

    /// Nearest element before this node among its parent's children.
    ///
    /// Non-element siblings are skipped however many there are. Returns
    /// `None` when detached, or when this node is missing from its parent's
    /// child list.
    pub fn previous_element_sibling(&self) -> Option<NodeId> {
        let parent = self.document.parent_of(self.id)?;
        let mut found = false;

        for &child in self.document.children_of(parent).iter().rev() {
            if child == self.id {
                found = true;
            } else if found && self.is_element(child) {
                return Some(child);
            }
        }
        None
    }

    /// Nearest element after this node among its parent's children
    pub fn next_element_sibling(&self) -> Option<NodeId> {
        let parent = self.document.parent_of(self.id)?;
        let mut found = false;

        for &child in self.document.children_of(parent) {
            if child == self.id {
                found = true;
            } else if found && self.is_element(child) {
                return Some(child);
            }
        }
        None
    }

    fn is_element(&self, id: NodeId) -> bool {
        self.document.kind_of(id) == Some(NodeKind::Element)
    }

    /// Serialize as `<!DOCTYPE {name} {ids}>`
    pub fn to_html(&self) -> String {
        self.data.to_html(self.name)
    }

    /// Document types are in no namespace scope
    pub fn locate_namespace(&self, _prefix: Option<&str>) -> Option<&'a str> {
        None
    }

    /// Document types are in no namespace scope
    pub fn locate_prefix(&self, _namespace_uri: Option<&str>) -> Option<&'a str> {
        None
    }
}

/// Mutable handle to a document type node
#[derive(Debug)]
pub struct DocumentTypeMut<'a> {
    document: &'a mut Document,
    id: NodeId,
}

impl<'a> DocumentTypeMut<'a> {
    pub(crate) fn new(document: &'a mut Document, id: NodeId) -> Option<Self> {
        match document.kind_of(id)? {
            NodeKind::DocumentType => Some(DocumentTypeMut { document, id }),
            _ => None,
        }
    }

    /// Get the node ID
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn update(&mut self, apply: impl FnOnce(&mut DocumentType)) -> &mut Self {
        if let Ok(NodeData::DocumentType(data)) =
            self.document.node_mut(self.id).map(|node| &mut node.data)
        {
            apply(data);
        }
        self
    }

    /// Set or clear the public identifier
    pub fn set_public_identifier(&mut self, value: Option<String>) -> &mut Self {
        self.update(|data| data.set_public_identifier(value))
    }

    /// Set or clear the system identifier
    pub fn set_system_identifier(&mut self, value: Option<String>) -> &mut Self {
        self.update(|data| data.set_system_identifier(value))
    }

    /// Set or clear the internal subset
    pub fn set_internal_subset(&mut self, value: Option<String>) -> &mut Self {
        self.update(|data| data.set_internal_subset(value))
    }

    /// Clone into a new detached document type node and return its id
    pub fn clone_node(&mut self, deep: bool) -> Result<NodeId> {
        self.document.clone_node(self.id, deep)
    }

    /// `clone_node(true)`
    pub fn clone_node_deep(&mut self) -> Result<NodeId> {
        self.clone_node(true)
    }

    /// Insert `nodes` before this node
    pub fn before(&mut self, nodes: &[NodeId]) -> Result<()> {
        self.document.insert_before_node(self.id, nodes)
    }

    /// Insert `nodes` after this node
    pub fn after(&mut self, nodes: &[NodeId]) -> Result<()> {
        self.document.insert_after_node(self.id, nodes)
    }

    /// Replace this node with `nodes`
    pub fn replace(&mut self, nodes: &[NodeId]) -> Result<()> {
        self.document.replace_node_with(self.id, nodes)
    }

    /// Detach this node from its parent
    pub fn remove(&mut self) -> Result<()> {
        self.document.remove_from_parent(self.id)
    }
}

impl Document {
    /// Read-only view of a document type node, `None` for other kinds
    pub fn document_type(&self, id: NodeId) -> Option<DocumentTypeRef<'_>> {
        DocumentTypeRef::new(self, id)
    }

    /// Mutable handle to a document type node, `None` for other kinds
    pub fn document_type_mut(&mut self, id: NodeId) -> Option<DocumentTypeMut<'_>> {
        DocumentTypeMut::new(self, id)
    }

    /// Create a detached document type node from declaration fields
    pub fn create_document_type_from_decl(&mut self, decl: DoctypeDecl) -> NodeId {
        let id = self.create_document_type(decl.name);
        if let Ok(NodeData::DocumentType(data)) = self.node_mut(id).map(|node| &mut node.data) {
            data.set_public_identifier(decl.public_id);
            data.set_system_identifier(decl.system_id);
            data.set_internal_subset(decl.internal_subset);
        }
        id
    }

    /// Read `<!DOCTYPE ...>` markup (lenient) into a new detached node
    pub fn read_document_type(&mut self, markup: &str) -> Result<NodeId> {
        let decl = DoctypeReader::new(markup).read()?;
        Ok(self.create_document_type_from_decl(decl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomError;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const XHTML_PUBLIC: &str = "-//W3C//DTD XHTML 1.0//EN";
    const XHTML_SYSTEM: &str = "http://www.w3.org/TR/xhtml1/DTD/xhtml1.dtd";

    fn doctype_with(public: Option<&str>, system: Option<&str>) -> (Document, NodeId) {
        let mut doc = Document::new();
        let id = doc.create_document_type("html");
        let mut handle = doc.document_type_mut(id).unwrap();
        handle
            .set_public_identifier(public.map(str::to_string))
            .set_system_identifier(system.map(str::to_string));
        (doc, id)
    }

    #[rstest]
    #[case(None, None, "<!DOCTYPE html >")]
    #[case(None, Some("about:legacy-compat"), "<!DOCTYPE html SYSTEM \"about:legacy-compat\">")]
    #[case(Some(XHTML_PUBLIC), None, "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0//EN\">")]
    #[case(
        Some(XHTML_PUBLIC),
        Some(XHTML_SYSTEM),
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1.dtd\">"
    )]
    fn test_to_html(
        #[case] public: Option<&str>,
        #[case] system: Option<&str>,
        #[case] expected: &str,
    ) {
        let (doc, id) = doctype_with(public, system);
        assert_eq!(doc.document_type(id).unwrap().to_html(), expected);
    }

    #[rstest]
    #[case(Some(""), Some(""), "")]
    #[case(Some(""), Some("s"), "SYSTEM \"s\"")]
    #[case(Some("p"), Some(""), "PUBLIC \"p\"")]
    fn test_identifier_clause_empty_is_absent(
        #[case] public: Option<&str>,
        #[case] system: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(identifier_clause(public, system), expected);
    }

    #[test]
    fn test_quotes_not_escaped() {
        assert_eq!(
            identifier_clause(Some("a\"b"), None),
            "PUBLIC \"a\"b\"".to_string()
        );
    }

    #[test]
    fn test_new_node_has_no_identifiers() {
        let mut doc = Document::new();
        let id = doc.create_document_type("svg");
        let view = doc.document_type(id).unwrap();
        assert_eq!(view.name(), "svg");
        assert_eq!(view.public_identifier(), None);
        assert_eq!(view.system_identifier(), None);
        assert_eq!(view.internal_subset(), None);
        assert_eq!(view.entities().count(), 0);
        assert_eq!(view.notations().count(), 0);
    }

    #[test]
    fn test_handles_reject_other_kinds() {
        let mut doc = Document::new();
        let element = doc.create_element("html");
        assert!(doc.document_type(element).is_none());
        assert!(doc.document_type_mut(element).is_none());
        assert!(doc.document_type(99).is_none());
    }

    #[test]
    fn test_entities_stay_empty_with_subset() {
        let (mut doc, id) = doctype_with(Some(XHTML_PUBLIC), None);
        doc.document_type_mut(id)
            .unwrap()
            .set_internal_subset(Some("<!ENTITY e \"x\">".to_string()));
        let view = doc.document_type(id).unwrap();
        assert_eq!(view.entities().count(), 0);
        assert_eq!(view.notations().count(), 0);
    }

    /// Root holds [comment, doctype, comment, pi, html, comment]
    fn attached() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let c1 = doc.create_comment("one");
        let doctype = doc.create_document_type("html");
        let c2 = doc.create_comment("two");
        let pi = doc.create_processing_instruction("xml-stylesheet", "href=\"a.css\"");
        let html = doc.create_element("html");
        let c3 = doc.create_comment("three");
        for id in [c1, doctype, c2, pi, html, c3] {
            doc.append_child(Document::ROOT, id).unwrap();
        }
        (doc, doctype, html)
    }

    #[test]
    fn test_next_element_sibling_skips_non_elements() {
        let (doc, doctype, html) = attached();
        let view = doc.document_type(doctype).unwrap();
        assert_eq!(view.next_element_sibling(), Some(html));
        assert_eq!(view.previous_element_sibling(), None);
    }

    #[test]
    fn test_previous_element_sibling() {
        let (mut doc, doctype, html) = attached();
        doc.append_child(Document::ROOT, doctype).unwrap();
        let view = doc.document_type(doctype).unwrap();
        assert_eq!(view.previous_element_sibling(), Some(html));
        assert_eq!(view.next_element_sibling(), None);
    }

    #[test]
    fn test_siblings_pick_nearest_element() {
        let (mut doc, doctype, html) = attached();
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.insert_before(Document::ROOT, head, Some(doctype)).unwrap();
        doc.append_child(Document::ROOT, body).unwrap();
        let view = doc.document_type(doctype).unwrap();
        assert_eq!(view.previous_element_sibling(), Some(head));
        assert_eq!(view.next_element_sibling(), Some(html));
    }

    #[test]
    fn test_navigation_over_all_layouts() {
        // Every layout of up to five siblings drawn from element/comment/pi,
        // with the doctype at every position
        for len in 0..5u32 {
            for pattern in 0..3u32.pow(len) {
                for position in 0..=len as usize {
                    let mut doc = Document::new();
                    let mut children = Vec::new();
                    let mut code = pattern;
                    for i in 0..len {
                        let id = match code % 3 {
                            0 => doc.create_element(format!("e{i}")),
                            1 => doc.create_comment("c"),
                            _ => doc.create_processing_instruction("p", ""),
                        };
                        code /= 3;
                        children.push(id);
                    }
                    let doctype = doc.create_document_type("html");
                    children.insert(position, doctype);
                    for &id in &children {
                        doc.append_child(Document::ROOT, id).unwrap();
                    }

                    let is_element = |id: &NodeId| doc.kind_of(*id) == Some(NodeKind::Element);
                    let expected_previous =
                        children[..position].iter().rev().copied().find(is_element);
                    let expected_next =
                        children[position + 1..].iter().copied().find(is_element);

                    let view = doc.document_type(doctype).unwrap();
                    assert_eq!(view.previous_element_sibling(), expected_previous);
                    assert_eq!(view.next_element_sibling(), expected_next);
                }
            }
        }
    }

    #[test]
    fn test_detached_has_no_siblings() {
        let mut doc = Document::new();
        let id = doc.create_document_type("html");
        let view = doc.document_type(id).unwrap();
        assert_eq!(view.previous_element_sibling(), None);
        assert_eq!(view.next_element_sibling(), None);
    }

    #[test]
    fn test_clone_copies_identifiers() {
        let (mut doc, id) = doctype_with(Some(XHTML_PUBLIC), Some(XHTML_SYSTEM));
        doc.document_type_mut(id)
            .unwrap()
            .set_internal_subset(Some("<!ENTITY a \"b\">".to_string()));

        let copy = doc.document_type_mut(id).unwrap().clone_node_deep().unwrap();
        let original = doc.document_type(id).unwrap();
        let cloned = doc.document_type(copy).unwrap();
        assert_ne!(copy, id);
        assert_eq!(cloned.name(), original.name());
        assert_eq!(cloned.public_identifier(), original.public_identifier());
        assert_eq!(cloned.system_identifier(), original.system_identifier());
        assert_eq!(cloned.internal_subset(), original.internal_subset());
        assert_eq!(doc.parent_of(copy), None);
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_clone_is_independent(#[case] deep: bool) {
        let (mut doc, id) = doctype_with(Some("p"), Some("s"));
        let copy = doc.document_type_mut(id).unwrap().clone_node(deep).unwrap();

        doc.document_type_mut(copy)
            .unwrap()
            .set_public_identifier(None)
            .set_system_identifier(Some("changed".to_string()));
        let original = doc.document_type(id).unwrap();
        assert_eq!(original.public_identifier(), Some("p"));
        assert_eq!(original.system_identifier(), Some("s"));

        doc.document_type_mut(id)
            .unwrap()
            .set_internal_subset(Some("x".to_string()));
        assert_eq!(doc.document_type(copy).unwrap().internal_subset(), None);
    }

    #[test]
    fn test_clone_replace_cycle_keeps_node_count() {
        let (mut doc, mut doctype, html) = attached();
        let before = doc.node_count();
        for _ in 0..10_000 {
            let mut handle = doc.document_type_mut(doctype).unwrap();
            let copy = handle.clone_node_deep().unwrap();
            handle.replace(&[copy]).unwrap();
            doc.drop_node(doctype).unwrap();
            doctype = copy;
        }

        assert_eq!(doc.node_count(), before);
        assert_eq!(doc.doctype(), Some(doctype));
        let view = doc.document_type(doctype).unwrap();
        assert_eq!(view.next_element_sibling(), Some(html));
        assert_eq!(view.to_html(), "<!DOCTYPE html >");
    }

    #[test]
    fn test_mutation_forwards_to_tree() {
        let (mut doc, doctype, html) = attached();
        let marker = doc.create_comment("marker");

        doc.document_type_mut(doctype).unwrap().before(&[marker]).unwrap();
        assert_eq!(doc.index_in_parent(marker), Some(1));
        assert_eq!(doc.index_in_parent(doctype), Some(2));

        doc.document_type_mut(doctype).unwrap().after(&[marker]).unwrap();
        assert_eq!(doc.index_in_parent(doctype), Some(1));
        assert_eq!(doc.index_in_parent(marker), Some(2));

        let replacement = doc.create_document_type("svg");
        doc.document_type_mut(doctype)
            .unwrap()
            .replace(&[replacement])
            .unwrap();
        assert_eq!(doc.parent_of(doctype), None);
        assert_eq!(doc.doctype(), Some(replacement));

        doc.document_type_mut(replacement).unwrap().remove().unwrap();
        assert_eq!(doc.doctype(), None);
        assert_eq!(doc.document_element(), Some(html));
    }

    #[test]
    fn test_mutation_propagates_base_errors() {
        let (mut doc, doctype, _) = attached();
        let err = doc
            .document_type_mut(doctype)
            .unwrap()
            .before(&[Document::ROOT]);
        assert!(matches!(err, Err(DomError::HierarchyRequest(_))));

        let err = doc.document_type_mut(doctype).unwrap().after(&[1234]);
        assert_eq!(err, Err(DomError::NodeNotFound(1234)));
    }

    #[test]
    fn test_name_unchanged_by_operations() {
        let (mut doc, doctype, _) = attached();
        let copy = doc.document_type_mut(doctype).unwrap().clone_node(false).unwrap();
        doc.document_type_mut(doctype).unwrap().remove().unwrap();
        assert_eq!(doc.document_type(doctype).unwrap().name(), "html");
        assert_eq!(doc.document_type(copy).unwrap().name(), "html");
    }

    #[test]
    fn test_read_document_type() {
        let mut doc = Document::new();
        let markup = "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1.dtd\">";
        let id = doc.read_document_type(markup).unwrap();
        let view = doc.document_type(id).unwrap();
        assert_eq!(view.name(), "html");
        assert_eq!(view.public_identifier(), Some(XHTML_PUBLIC));
        assert_eq!(view.system_identifier(), Some(XHTML_SYSTEM));
        assert_eq!(view.internal_subset(), None);
        assert_eq!(view.to_html(), markup);
    }

    #[test]
    fn test_read_document_type_error() {
        let mut doc = Document::new();
        let before = doc.node_count();
        assert!(matches!(
            doc.read_document_type("<!DOCTYPE>"),
            Err(DomError::InvalidDeclaration(_))
        ));
        assert_eq!(doc.node_count(), before);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("xml"))]
    #[case(Some("never-seen"))]
    fn test_namespace_lookups_find_nothing(#[case] input: Option<&str>) {
        let (doc, doctype, _) = attached();
        let view = doc.document_type(doctype).unwrap();
        assert_eq!(view.locate_namespace(input), None);
        assert_eq!(view.locate_prefix(input), None);
    }
}
