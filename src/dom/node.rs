//! Tree node representation
//!
//! Uses NodeId for compact node references into the document arena: the
//! low 32 bits are the slot index, the high 32 bits the slot generation.
//! The payload of each node kind lives in the closed `NodeData` enum; the
//! links (parent, ordered children) and the generic name live on `TreeNode`.

use super::doctype::DocumentType;

/// Compact node identifier (slot index plus slot generation).
///
/// A document holds at most `u32::MAX` slots at once. Ids of dropped nodes
/// stop resolving once their slot is released.
pub type NodeId = u64;

/// Slot index part of a node id
#[inline]
pub(crate) fn slot_index(id: NodeId) -> usize {
    (id & u64::from(u32::MAX)) as usize
}

/// Generation part of a node id
#[inline]
pub(crate) fn slot_generation(id: NodeId) -> u32 {
    (id >> 32) as u32
}

#[inline]
pub(crate) fn make_id(index: u32, generation: u32) -> NodeId {
    (u64::from(generation) << 32) | u64::from(index)
}

/// Type of tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Document type declaration
    DocumentType,
    /// Element node
    Element,
    /// Text content
    Text,
    /// CDATA section
    CData,
    /// Comment
    Comment,
    /// Processing instruction
    ProcessingInstruction,
}

/// Element attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Kind-specific state of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Document,
    DocumentType(DocumentType),
    Element { attributes: Vec<Attribute> },
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Document => NodeKind::Document,
            NodeData::DocumentType(_) => NodeKind::DocumentType,
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::CData(_) => NodeKind::CData,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::ProcessingInstruction(_) => NodeKind::ProcessingInstruction,
        }
    }

    /// A payload of the same kind with every kind-specific field empty
    pub fn empty_like(&self) -> NodeData {
        match self {
            NodeData::Document => NodeData::Document,
            NodeData::DocumentType(_) => NodeData::DocumentType(DocumentType::new()),
            NodeData::Element { .. } => NodeData::Element {
                attributes: Vec::new(),
            },
            NodeData::Text(_) => NodeData::Text(String::new()),
            NodeData::CData(_) => NodeData::CData(String::new()),
            NodeData::Comment(_) => NodeData::Comment(String::new()),
            NodeData::ProcessingInstruction(_) => NodeData::ProcessingInstruction(String::new()),
        }
    }

    /// Copy the kind-specific fields into `target`.
    ///
    /// This is the second phase of a clone, after the generic tree state has
    /// been copied. Payloads of different kinds are left untouched.
    pub fn copy_kind_fields(&self, target: &mut NodeData) {
        match (self, target) {
            (NodeData::DocumentType(source), NodeData::DocumentType(target)) => {
                source.copy_identifiers_to(target);
            }
            (
                NodeData::Element { attributes },
                NodeData::Element {
                    attributes: target_attributes,
                },
            ) => {
                target_attributes.clone_from(attributes);
            }
            (NodeData::Text(source), NodeData::Text(target))
            | (NodeData::CData(source), NodeData::CData(target))
            | (NodeData::Comment(source), NodeData::Comment(target))
            | (NodeData::ProcessingInstruction(source), NodeData::ProcessingInstruction(target)) => {
                target.clone_from(source);
            }
            _ => {}
        }
    }
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Generic node name (tag name, doctype name, `#text`, ...)
    name: String,
    /// Parent node (None for the document root and detached nodes)
    pub(crate) parent: Option<NodeId>,
    /// Ordered child nodes
    pub(crate) children: Vec<NodeId>,
    /// Kind-specific payload
    pub(crate) data: NodeData,
}

impl TreeNode {
    fn new(name: impl Into<String>, data: NodeData) -> Self {
        TreeNode {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            data,
        }
    }

    /// Create a new document root node
    pub fn document() -> Self {
        Self::new("#document", NodeData::Document)
    }

    /// Create a new document type node with empty identifiers
    pub fn document_type(name: impl Into<String>) -> Self {
        Self::new(name, NodeData::DocumentType(DocumentType::new()))
    }

    /// Create a new element node
    pub fn element(name: impl Into<String>) -> Self {
        Self::new(
            name,
            NodeData::Element {
                attributes: Vec::new(),
            },
        )
    }

    /// Create a new text node
    pub fn text(content: impl Into<String>) -> Self {
        Self::new("#text", NodeData::Text(content.into()))
    }

    /// Create a new CDATA node
    pub fn cdata(content: impl Into<String>) -> Self {
        Self::new("#cdata-section", NodeData::CData(content.into()))
    }

    /// Create a new comment node
    pub fn comment(content: impl Into<String>) -> Self {
        Self::new("#comment", NodeData::Comment(content.into()))
    }

    /// Create a processing instruction node
    pub fn processing_instruction(target: impl Into<String>, data: impl Into<String>) -> Self {
        Self::new(target, NodeData::ProcessingInstruction(data.into()))
    }

    /// Detached node with the same name and kind but none of the state
    pub(crate) fn blank_like(&self) -> Self {
        Self::new(self.name.clone(), self.data.empty_like())
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// Check if this is an element node
    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    /// Only documents and elements may hold children
    #[inline]
    pub fn can_have_children(&self) -> bool {
        matches!(self.kind(), NodeKind::Document | NodeKind::Element)
    }

    /// Attributes of an element, empty for every other kind
    pub fn attributes(&self) -> &[Attribute] {
        match &self.data {
            NodeData::Element { attributes } => attributes.as_slice(),
            _ => &[],
        }
    }

    /// Get attribute value by name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }
}
