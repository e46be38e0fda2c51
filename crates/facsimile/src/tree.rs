//! The depth-indexed descriptor tree stored on the clipboard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use facsimile_core::Id;

use crate::descriptor::Descriptor;

/// Descriptors bucketed by the depth they were discovered at.
///
/// Within a bucket descriptors are kept in ascending priority order, which
/// is also the order they are created in on paste.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    branches: BTreeMap<usize, Vec<Descriptor>>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the tree holds no descriptor at all.
    pub fn is_empty(&self) -> bool {
        self.branches.values().all(Vec::is_empty)
    }

    /// Total number of descriptors over all depths.
    pub fn len(&self) -> usize {
        self.branches.values().map(Vec::len).sum()
    }

    /// Depths that hold at least one descriptor, ascending.
    pub fn depths(&self) -> impl Iterator<Item = usize> + '_ {
        self.branches
            .iter()
            .filter(|(_, branch)| !branch.is_empty())
            .map(|(depth, _)| *depth)
    }

    /// Returns the descriptors recorded at `depth`.
    pub fn branch(&self, depth: usize) -> Option<&[Descriptor]> {
        self.branches.get(&depth).map(Vec::as_slice)
    }

    pub fn branch_mut(&mut self, depth: usize) -> Option<&mut Vec<Descriptor>> {
        self.branches.get_mut(&depth)
    }

    /// Iterates over `(depth, branch)` pairs in ascending depth.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Descriptor])> {
        self.branches
            .iter()
            .map(|(depth, branch)| (*depth, branch.as_slice()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut Vec<Descriptor>)> {
        self.branches.iter_mut().map(|(depth, branch)| (*depth, branch))
    }

    /// Iterates over every descriptor in creation order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.branches.values().flatten()
    }

    /// Finds the descriptor copied from element `id`.
    pub fn find(&self, id: Id) -> Option<&Descriptor> {
        self.descriptors().find(|descriptor| descriptor.id == id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.find(id).is_some()
    }

    /// Appends `descriptor` to the branch at `depth`.
    ///
    /// Callers are responsible for pushing in ascending priority order.
    pub fn push(&mut self, depth: usize, descriptor: Descriptor) {
        self.branches.entry(depth).or_default().push(descriptor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Priority;

    fn descriptor(name: &str, priority: Priority) -> Descriptor {
        Descriptor {
            priority,
            ..Descriptor::new(Id::new(name))
        }
    }

    #[test]
    fn test_empty_tree() {
        let mut tree = Tree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);

        tree.branches.insert(2, Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.depths().count(), 0);
    }

    #[test]
    fn test_push_and_lookup() {
        let mut tree = Tree::new();
        tree.push(1, descriptor("child", Priority::Shape));
        tree.push(0, descriptor("container", Priority::Shape));
        tree.push(1, descriptor("flow", Priority::Connection));

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.depths().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(tree.branch(1).unwrap().len(), 2);
        assert!(tree.branch(5).is_none());

        let order: Vec<_> = tree.descriptors().map(|d| d.id.to_name()).collect();
        assert_eq!(order, vec!["container", "child", "flow"]);

        assert!(tree.contains(Id::new("flow")));
        assert_eq!(tree.find(Id::new("child")).unwrap().priority, Priority::Shape);
        assert!(!tree.contains(Id::new("other")));
    }
}
