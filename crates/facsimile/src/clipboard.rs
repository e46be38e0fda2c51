//! Clipboard storage for copied trees.
//!
//! The engine owns one [`ClipboardStore`]. A host that needs to observe or
//! seed the clipboard shares a single instance with the engine through
//! `Rc<RefCell<Clipboard>>`.

use std::{cell::RefCell, rc::Rc};

use crate::tree::Tree;

/// Store for the last copied tree.
pub trait ClipboardStore {
    /// Returns a copy of the stored tree.
    fn get(&self) -> Option<Tree>;

    /// Replaces the stored tree.
    fn set(&mut self, tree: Tree);

    fn clear(&mut self);

    fn is_empty(&self) -> bool;
}

/// In-memory clipboard.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    tree: Option<Tree>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored tree without copying it.
    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }
}

impl ClipboardStore for Clipboard {
    fn get(&self) -> Option<Tree> {
        self.tree.clone()
    }

    fn set(&mut self, tree: Tree) {
        self.tree = Some(tree);
    }

    fn clear(&mut self) {
        self.tree = None;
    }

    fn is_empty(&self) -> bool {
        self.tree.as_ref().is_none_or(Tree::is_empty)
    }
}

impl<T: ClipboardStore> ClipboardStore for Rc<RefCell<T>> {
    fn get(&self) -> Option<Tree> {
        self.borrow().get()
    }

    fn set(&mut self, tree: Tree) {
        self.borrow_mut().set(tree);
    }

    fn clear(&mut self) {
        self.borrow_mut().clear();
    }

    fn is_empty(&self) -> bool {
        self.borrow().is_empty()
    }
}
