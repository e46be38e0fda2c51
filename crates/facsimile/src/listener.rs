//! Typed observers of the copy/paste lifecycle.
//!
//! A [`CopyPasteListener`] is notified synchronously at four points and may
//! mutate the payload it receives:
//!
//! | Hook | Fired | Payload |
//! |------|-------|---------|
//! | [`elements_copy`](CopyPasteListener::elements_copy) | after the tree is built, before it is stored | the tree |
//! | [`elements_copied`](CopyPasteListener::elements_copied) | after the clipboard was updated | the stored tree |
//! | [`elements_paste`](CopyPasteListener::elements_paste) | before materialization | the paste hints |
//! | [`element_paste`](CopyPasteListener::element_paste) | before each element is created | the descriptor and the id cache |

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use facsimile_core::Id;

use crate::{descriptor::Descriptor, tree::Tree};

/// Hint disabling host modeling behaviors when `false`.
pub const HINT_BEHAVIOR: &str = "behavior";

/// Free-form flags forwarded to the host together with pasted elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hints {
    flags: BTreeMap<String, bool>,
}

impl Hints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`.
    pub fn set(&mut self, key: impl Into<String>, value: bool) {
        self.flags.insert(key.into(), value);
    }

    pub fn with(mut self, key: impl Into<String>, value: bool) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        self.flags.get(key).copied()
    }

    pub fn remove(&mut self, key: &str) -> Option<bool> {
        self.flags.remove(key)
    }

    /// Returns `true` unless behaviors were explicitly disabled.
    pub fn behavior(&self) -> bool {
        self.get(HINT_BEHAVIOR).unwrap_or(true)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(key, value)| (key.as_str(), *value))
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Maps descriptor ids to the ids of the elements created for them.
///
/// Scoped to a single paste. Listeners may insert entries of their own to
/// redirect references, e.g. onto elements that already exist in the
/// diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasteCache {
    entries: HashMap<Id, Id>,
}

impl PasteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that references to `descriptor` resolve to `element`.
    pub fn insert(&mut self, descriptor: Id, element: Id) -> Option<Id> {
        self.entries.insert(descriptor, element)
    }

    pub fn get(&self, descriptor: Id) -> Option<Id> {
        self.entries.get(&descriptor).copied()
    }

    pub fn contains(&self, descriptor: Id) -> bool {
        self.entries.contains_key(&descriptor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, Id)> + '_ {
        self.entries.iter().map(|(from, to)| (*from, *to))
    }
}

/// Observer of copy and paste.
///
/// Every hook defaults to a no-op.
pub trait CopyPasteListener {
    /// Called with the freshly built tree before it reaches the clipboard.
    fn elements_copy(&mut self, _tree: &mut Tree) {}

    /// Called once the clipboard has been updated.
    fn elements_copied(&mut self, _tree: &Tree) {}

    /// Called before a paste materializes anything.
    fn elements_paste(&mut self, _hints: &mut Hints) {}

    /// Called before the element of `descriptor` is created.
    ///
    /// `parent` already holds the id of the pasted parent (or `None` if the
    /// parent was not pasted). `source`, `target`, `host` and `label_target`
    /// still hold the copied ids; they are resolved through `cache` after
    /// the hook returns, so redirect them by inserting into `cache` rather
    /// than rewriting the fields.
    fn element_paste(&mut self, _descriptor: &mut Descriptor, _cache: &mut PasteCache) {}
}

impl<L: CopyPasteListener> CopyPasteListener for Rc<RefCell<L>> {
    fn elements_copy(&mut self, tree: &mut Tree) {
        self.borrow_mut().elements_copy(tree);
    }

    fn elements_copied(&mut self, tree: &Tree) {
        self.borrow_mut().elements_copied(tree);
    }

    fn elements_paste(&mut self, hints: &mut Hints) {
        self.borrow_mut().elements_paste(hints);
    }

    fn element_paste(&mut self, descriptor: &mut Descriptor, cache: &mut PasteCache) {
        self.borrow_mut().element_paste(descriptor, cache);
    }
}

/// Listener switching host modeling behaviors off for every paste.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisableBehaviors;

impl CopyPasteListener for DisableBehaviors {
    fn elements_paste(&mut self, hints: &mut Hints) {
        hints.set(HINT_BEHAVIOR, false);
    }
}
