//! Namespace Lookup
//!
//! Resolves prefixes to namespace URIs (and back) by walking `xmlns`
//! declarations from a node up through its ancestor elements.

use super::document::Document;
use super::node::{NodeId, NodeKind};

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

impl Document {
    /// Find the namespace URI bound to `prefix` (`None` for the default
    /// namespace) as seen from `id`
    pub fn locate_namespace(&self, id: NodeId, prefix: Option<&str>) -> Option<&str> {
        match self.kind_of(id)? {
            NodeKind::Element => self.element_namespace(id, prefix),
            NodeKind::Document => {
                let element = self.document_element()?;
                self.locate_namespace(element, prefix)
            }
            NodeKind::DocumentType => self.document_type(id)?.locate_namespace(prefix),
            NodeKind::Text
            | NodeKind::CData
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => {
                let parent = self.parent_element(id)?;
                self.element_namespace(parent, prefix)
            }
        }
    }

    /// Find a prefix bound to `namespace_uri` as seen from `id`
    pub fn locate_prefix(&self, id: NodeId, namespace_uri: Option<&str>) -> Option<&str> {
        let namespace_uri = namespace_uri.filter(|uri| !uri.is_empty())?;
        match self.kind_of(id)? {
            NodeKind::Element => self.element_prefix(id, namespace_uri),
            NodeKind::Document => {
                let element = self.document_element()?;
                self.element_prefix(element, namespace_uri)
            }
            NodeKind::DocumentType => self.document_type(id)?.locate_prefix(Some(namespace_uri)),
            NodeKind::Text
            | NodeKind::CData
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction => {
                let parent = self.parent_element(id)?;
                self.element_prefix(parent, namespace_uri)
            }
        }
    }

    fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent_of(id)
            .filter(|&parent| self.kind_of(parent) == Some(NodeKind::Element))
    }

    fn element_namespace(&self, element: NodeId, prefix: Option<&str>) -> Option<&str> {
        match prefix {
            Some("xml") => return Some(ns::XML),
            Some("xmlns") => return Some(ns::XMLNS),
            _ => {}
        }

        let mut current = Some(element);
        while let Some(id) = current {
            let node = self.get_node(id)?;
            let declared = match prefix {
                Some(prefix) if !prefix.is_empty() => node
                    .attributes()
                    .iter()
                    .find(|attr| attr.name.strip_prefix("xmlns:") == Some(prefix)),
                _ => node.attributes().iter().find(|attr| attr.name == "xmlns"),
            };
            if let Some(attr) = declared {
                // An empty value undeclares the binding
                return Some(attr.value.as_str()).filter(|uri| !uri.is_empty());
            }
            current = self.parent_element(id);
        }
        None
    }

    fn element_prefix(&self, element: NodeId, namespace_uri: &str) -> Option<&str> {
        let mut current = Some(element);
        while let Some(id) = current {
            let node = self.get_node(id)?;
            let prefix = node.attributes().iter().find_map(|attr| {
                let prefix = attr.name.strip_prefix("xmlns:")?;
                (attr.value == namespace_uri).then_some(prefix)
            });
            if prefix.is_some() {
                return prefix;
            }
            current = self.parent_element(id);
        }
        None
    }
}
