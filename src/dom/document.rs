//! Document - Arena-based tree
//!
//! Efficient mutable tree storage with:
//! - Arena allocation for nodes, with released slots reused
//! - Generational NodeId indices for traversal
//! - Non-owning parent back-references (ids, never ownership edges)
//!
//! The document node always lives at index 0. Detached nodes stay in the
//! arena and can be inserted again until `drop_node` releases them.

use super::node::{
    make_id, slot_generation, slot_index, Attribute, NodeData, NodeId, NodeKind, TreeNode,
};
use crate::error::{DomError, Result};

/// Arena slot; `node` is `None` once released
#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<TreeNode>,
}

/// A markup document stored in arena format
#[derive(Debug, Clone)]
pub struct Document {
    /// Arena of nodes
    slots: Vec<Slot>,
    /// Indices of released slots
    free: Vec<u32>,
    /// Number of live nodes
    live: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Id of the document node
    pub const ROOT: NodeId = 0;

    /// Create an empty document holding only the document node
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(64);
        slots.push(Slot {
            generation: 0,
            node: Some(TreeNode::document()),
        });
        Document {
            slots,
            free: Vec::new(),
            live: 1,
        }
    }

    /// Get the document node ID
    #[inline]
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Get total number of live nodes, attached or not
    pub fn node_count(&self) -> usize {
        self.live
    }

    /// Get a node by ID; `None` for unknown and dropped ids
    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode> {
        let slot = self.slots.get(slot_index(id))?;
        if slot.generation != slot_generation(id) {
            return None;
        }
        slot.node.as_ref()
    }

    fn get_node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        let slot = self.slots.get_mut(slot_index(id))?;
        if slot.generation != slot_generation(id) {
            return None;
        }
        slot.node.as_mut()
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&TreeNode> {
        self.get_node(id).ok_or(DomError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode> {
        self.get_node_mut(id).ok_or(DomError::NodeNotFound(id))
    }

    /// Get parent of a node
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.parent()
    }

    /// Get children of a node, empty for unknown ids
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.get_node(id).map(TreeNode::children).unwrap_or(&[])
    }

    /// Get the kind of a node
    pub fn kind_of(&self, id: NodeId) -> Option<NodeKind> {
        self.get_node(id).map(TreeNode::kind)
    }

    /// Get node name as string
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.get_node(id).map(TreeNode::name)
    }

    /// First element child of the document node
    pub fn document_element(&self) -> Option<NodeId> {
        self.first_child_of_kind(Self::ROOT, NodeKind::Element)
    }

    /// First document type child of the document node
    pub fn doctype(&self) -> Option<NodeId> {
        self.first_child_of_kind(Self::ROOT, NodeKind::DocumentType)
    }

    fn first_child_of_kind(&self, parent: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children_of(parent)
            .iter()
            .copied()
            .find(|&id| self.kind_of(id) == Some(kind))
    }

    /// Position of a node within its parent's children
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.children_of(parent).iter().position(|&c| c == id)
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    fn push(&mut self, node: TreeNode) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return make_id(index, slot.generation);
        }
        // Slot indices are u32; past that many live nodes ids would alias
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        make_id(index, 0)
    }

    /// Release a detached node and its whole subtree.
    ///
    /// The slots are reused by later nodes and every released id resolves
    /// to `NodeNotFound` from then on. The document node can't be dropped
    /// and attached nodes must be removed from their parent first.
    pub fn drop_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if id == Self::ROOT {
            return Err(DomError::HierarchyRequest(
                "the document node cannot be dropped",
            ));
        }
        if let Some(parent) = node.parent() {
            return Err(DomError::StillAttached { id, parent });
        }

        let mut pending = vec![id];
        let mut released = 0usize;
        while let Some(current) = pending.pop() {
            let Some(slot) = self.slots.get_mut(slot_index(current)) else {
                continue;
            };
            if slot.generation != slot_generation(current) {
                continue;
            }
            let Some(node) = slot.node.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            // Index came from a valid id, so it fits in u32
            self.free.push(slot_index(current) as u32);
            self.live -= 1;
            released += 1;
            pending.extend(node.children);
        }

        log::trace!("dropped node {id} and {} descendants", released - 1);
        Ok(())
    }

    /// Create a detached element node
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.push(TreeNode::element(name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.push(TreeNode::text(content))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: impl Into<String>) -> NodeId {
        self.push(TreeNode::comment(content))
    }

    /// Create a detached CDATA node
    pub fn create_cdata(&mut self, content: impl Into<String>) -> NodeId {
        self.push(TreeNode::cdata(content))
    }

    /// Create a detached processing instruction node
    pub fn create_processing_instruction(
        &mut self,
        target: impl Into<String>,
        data: impl Into<String>,
    ) -> NodeId {
        self.push(TreeNode::processing_instruction(target, data))
    }

    /// Create a detached document type node with empty identifiers.
    ///
    /// The name is taken as given; checking that it is a valid name token is
    /// up to whoever read it from markup.
    pub fn create_document_type(&mut self, name: impl Into<String>) -> NodeId {
        self.push(TreeNode::document_type(name))
    }

    /// Set or replace an attribute on an element
    pub fn set_attribute(
        &mut self,
        element: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let node = self.node_mut(element)?;
        let NodeData::Element { attributes } = &mut node.data else {
            return Err(DomError::WrongKind {
                id: element,
                expected: NodeKind::Element,
            });
        };

        let name = name.into();
        let value = value.into();
        match attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => attributes.push(Attribute { name, value }),
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mutation primitives
    // ------------------------------------------------------------------

    /// Check that `node` may become a child of `parent`
    fn ensure_pre_insertion_validity(&self, parent: NodeId, node: NodeId) -> Result<()> {
        let parent_node = self.node(parent)?;
        let child = self.node(node)?;

        if child.kind() == NodeKind::Document {
            return Err(DomError::HierarchyRequest("a document cannot be inserted"));
        }
        if !parent_node.can_have_children() {
            return Err(DomError::HierarchyRequest("parent cannot have children"));
        }
        if self.is_inclusive_ancestor(node, parent) {
            return Err(DomError::HierarchyRequest(
                "node is an inclusive ancestor of the parent",
            ));
        }

        match (child.kind(), parent_node.kind()) {
            (NodeKind::DocumentType, NodeKind::Element) => Err(DomError::HierarchyRequest(
                "document type nodes may only be children of a document",
            )),
            (NodeKind::Text | NodeKind::CData, NodeKind::Document) => Err(
                DomError::HierarchyRequest("text cannot be a child of a document"),
            ),
            _ => Ok(()),
        }
    }

    /// Unlink a node from its parent, if it has one
    fn unlink(&mut self, id: NodeId) {
        let Some(parent) = self.parent_of(id) else {
            return;
        };
        if let Some(parent_node) = self.get_node_mut(parent) {
            parent_node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.get_node_mut(id) {
            node.parent = None;
        }
    }

    /// Move `child` under `parent` in front of `reference`, appending when
    /// there is no reference. Validity must already have been checked.
    fn link_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.unlink(child);

        let Some(parent_node) = self.get_node_mut(parent) else {
            return;
        };
        let siblings = &mut parent_node.children;
        let index = reference
            .and_then(|r| siblings.iter().position(|&c| c == r))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        if let Some(node) = self.get_node_mut(child) {
            node.parent = Some(parent);
        }

        log::trace!("linked node {child} under {parent} at index {index}");
    }

    /// Insert `child` into `parent` before `reference` (append when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<NodeId> {
        self.ensure_pre_insertion_validity(parent, child)?;

        if let Some(reference) = reference {
            self.node(reference)?;
            if self.parent_of(reference) != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }

        // Inserting a node before itself means before its next sibling
        let reference = match reference {
            Some(r) if r == child => self.next_sibling_of(child),
            other => other,
        };

        self.link_before(parent, child, reference);
        Ok(child)
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        self.node(parent)?;
        self.node(child)?;
        if self.parent_of(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.unlink(child);
        log::trace!("removed node {child} from {parent}");
        Ok(child)
    }

    /// Detach a node from wherever it is attached; no-op when detached
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        if let Some(parent) = self.parent_of(id) {
            self.remove_child(parent, id)?;
        }
        Ok(())
    }

    fn next_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(id)?;
        let index = self.index_in_parent(id)?;
        self.children_of(parent).get(index + 1).copied()
    }

    /// Check every node before touching the tree so that a rejected batch
    /// leaves it unchanged
    fn ensure_batch_validity(&self, parent: NodeId, nodes: &[NodeId]) -> Result<()> {
        nodes
            .iter()
            .try_for_each(|&n| self.ensure_pre_insertion_validity(parent, n))
    }

    /// Insert `nodes` in order just before `node`.
    ///
    /// `node` may itself appear in `nodes`. Without a parent this does nothing.
    pub fn insert_before_node(&mut self, node: NodeId, nodes: &[NodeId]) -> Result<()> {
        self.node(node)?;
        let Some(parent) = self.parent_of(node) else {
            return Ok(());
        };
        self.ensure_batch_validity(parent, nodes)?;

        let index = self.index_in_parent(node).unwrap_or(0);
        let viable_previous = self.children_of(parent)[..index]
            .iter()
            .rev()
            .copied()
            .find(|c| !nodes.contains(c));

        for &n in nodes {
            self.unlink(n);
        }

        let reference = match viable_previous {
            Some(previous) => self.next_sibling_of(previous),
            None => self.children_of(parent).first().copied(),
        };
        for &n in nodes {
            self.link_before(parent, n, reference);
        }
        Ok(())
    }

    /// Insert `nodes` in order just after `node`.
    ///
    /// `node` may itself appear in `nodes`. Without a parent this does nothing.
    pub fn insert_after_node(&mut self, node: NodeId, nodes: &[NodeId]) -> Result<()> {
        self.node(node)?;
        let Some(parent) = self.parent_of(node) else {
            return Ok(());
        };
        self.ensure_batch_validity(parent, nodes)?;

        let viable_next = self.viable_next_sibling(parent, node, nodes);

        for &n in nodes {
            self.unlink(n);
        }
        for &n in nodes {
            self.link_before(parent, n, viable_next);
        }
        Ok(())
    }

    /// Replace `node` with `nodes`.
    ///
    /// `node` may itself appear in `nodes`. Without a parent this does nothing.
    pub fn replace_node_with(&mut self, node: NodeId, nodes: &[NodeId]) -> Result<()> {
        self.node(node)?;
        let Some(parent) = self.parent_of(node) else {
            return Ok(());
        };
        self.ensure_batch_validity(parent, nodes)?;

        let viable_next = self.viable_next_sibling(parent, node, nodes);

        for &n in nodes {
            self.unlink(n);
        }

        let reference = if self.parent_of(node) == Some(parent) {
            let next = self.next_sibling_of(node);
            self.unlink(node);
            log::trace!("replaced node {node} in {parent}");
            next
        } else {
            viable_next
        };
        for &n in nodes {
            self.link_before(parent, n, reference);
        }
        Ok(())
    }

    /// Detach `node` from its parent
    pub fn remove_from_parent(&mut self, node: NodeId) -> Result<()> {
        self.detach(node)
    }

    fn viable_next_sibling(
        &self,
        parent: NodeId,
        node: NodeId,
        nodes: &[NodeId],
    ) -> Option<NodeId> {
        let index = self.index_in_parent(node)?;
        self.children_of(parent)[index + 1..]
            .iter()
            .copied()
            .find(|c| !nodes.contains(c))
    }

    // ------------------------------------------------------------------
    // Cloning
    // ------------------------------------------------------------------

    /// Clone a node into a new detached node.
    ///
    /// Runs in two phases: the generic tree state is copied by
    /// `copy_properties`, then the kind-specific payload by
    /// `copy_kind_fields`. A node kind that adds state only has to extend
    /// `NodeData::copy_kind_fields`.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> Result<NodeId> {
        let template = self.node(id)?.blank_like();
        let copy = self.push(template);
        self.copy_properties(id, copy, deep)?;
        self.copy_kind_fields(id, copy)?;
        log::trace!("cloned node {id} into {copy} (deep: {deep})");
        Ok(copy)
    }

    /// Copy generic tree state. Children are cloned only when `deep`,
    /// level by level from a work stack so depth is not bounded by the
    /// call stack.
    fn copy_properties(&mut self, source: NodeId, target: NodeId, deep: bool) -> Result<()> {
        if !deep {
            return Ok(());
        }
        let mut pending = vec![(source, target)];
        while let Some((source, target)) = pending.pop() {
            let children = self.node(source)?.children.clone();
            for child in children {
                let template = self.node(child)?.blank_like();
                let child_copy = self.push(template);
                self.copy_kind_fields(child, child_copy)?;
                self.link_before(target, child_copy, None);
                pending.push((child, child_copy));
            }
        }
        Ok(())
    }

    fn copy_kind_fields(&mut self, source: NodeId, target: NodeId) -> Result<()> {
        let mut target_data =
            std::mem::replace(&mut self.node_mut(target)?.data, NodeData::Document);
        self.node(source)?.data.copy_kind_fields(&mut target_data);
        self.node_mut(target)?.data = target_data;
        Ok(())
    }
}
