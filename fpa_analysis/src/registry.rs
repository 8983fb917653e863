//! Registry of nodes participating in at least one propagation path.
//!
//! Insertion-ordered, deduplicated by handle. Grows during construction
//! and is frozen with the owning analysis.

use std::collections::HashSet;

use fpa_common::model::NodeId;

#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    order: Vec<NodeId>,
    members: HashSet<NodeId>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Returns `false` if it was already registered.
    pub fn insert(&mut self, node: NodeId) -> bool {
        if !self.members.insert(node) {
            return false;
        }
        self.order.push(node);
        true
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered nodes in first-registration order.
    pub fn as_slice(&self) -> &[NodeId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpa_common::model::{ComponentCategory, InstanceModelBuilder};

    #[test]
    fn insert_deduplicates_and_keeps_order() {
        let mut b = InstanceModelBuilder::new();
        let c = b.add_classifier("T", ComponentCategory::System);
        let top = b.add_root("top", c);
        let x = b.add_child(top, "x", c);
        let y = b.add_child(top, "y", c);

        let mut registry = NodeRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.insert(y));
        assert!(registry.insert(x));
        assert!(!registry.insert(y));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.as_slice(), &[y, x]);
        assert!(registry.contains(x));
        assert!(!registry.contains(top));
    }
}
