//! The diagram arena.
//!
//! A [`Diagram`] owns every [`Element`] of a document keyed by [`Id`] and keeps
//! the inverse relations (`children`, `attachers`, `labels`, `incoming`,
//! `outgoing`) consistent with the forward relations each element declares.
//!
//! # Invariants
//!
//! - Element ids are unique.
//! - Every forward relation refers to an element of the same diagram.
//! - Following `parent` links never leads back to the starting element.
//! - Inverse relation lists mirror the forward relations exactly.

use indexmap::IndexMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    element::{Element, Relation},
    identifier::Id,
};

/// Errors raised while building or mutating a [`Diagram`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    #[error("Element '{0}' already exists")]
    DuplicateId(Id),

    #[error("Element '{0}' not found")]
    NotFound(Id),

    #[error("Element '{element}' references unknown {relation} '{referenced}'")]
    UnknownReference {
        element: Id,
        relation: Relation,
        referenced: Id,
    },

    #[error("Element '{0}' is still referenced by other elements")]
    HasDependents(Id),

    #[error("Element '{0}' is nested inside itself")]
    ParentCycle(Id),
}

/// Serializable form of a diagram.
///
/// Only forward relations are stored; inverse relations are rebuilt on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Id>,

    #[serde(default)]
    pub elements: Vec<Element>,
}

/// Insertion-ordered element arena with an optional root element.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    root: Option<Id>,
    elements: IndexMap<Id, Element>,
}

impl Diagram {
    /// Creates an empty diagram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a diagram from elements listed in any order.
    ///
    /// # Arguments
    ///
    /// * `root` - Optional root element; must be one of `elements`.
    /// * `elements` - Elements with their forward relations set.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::DuplicateId`] for repeated ids,
    /// [`DiagramError::UnknownReference`] for relations pointing outside the
    /// given elements and [`DiagramError::ParentCycle`] when an element is
    /// its own ancestor.
    pub fn from_elements<I>(root: Option<Id>, elements: I) -> Result<Self, DiagramError>
    where
        I: IntoIterator<Item = Element>,
    {
        let mut diagram = Self::new();

        for element in elements {
            let id = element.id();
            if diagram.elements.insert(id, detached(element)).is_some() {
                return Err(DiagramError::DuplicateId(id));
            }
        }

        let ids: Vec<Id> = diagram.elements.keys().copied().collect();
        for &id in &ids {
            diagram.check_references(id)?;
        }
        for &id in &ids {
            diagram.check_containment(id)?;
        }
        for id in ids {
            diagram.link(id);
        }

        if let Some(root) = root {
            if !diagram.contains(root) {
                return Err(DiagramError::NotFound(root));
            }
            diagram.root = Some(root);
        }

        debug!(elements = diagram.len(); "Diagram loaded");
        Ok(diagram)
    }

    /// Builds a diagram from its serialized form.
    ///
    /// # Errors
    ///
    /// See [`Diagram::from_elements`].
    pub fn from_file(file: DiagramFile) -> Result<Self, DiagramError> {
        Self::from_elements(file.root, file.elements)
    }

    /// Returns the serializable form of the diagram.
    pub fn to_file(&self) -> DiagramFile {
        DiagramFile {
            root: self.root,
            elements: self.elements.values().cloned().map(detached).collect(),
        }
    }

    /// Returns the root element id, if any.
    pub fn root(&self) -> Option<Id> {
        self.root
    }

    /// Adds `element`, wiring it into the elements it references.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is taken, a referenced element is missing
    /// or the element is its own parent; the diagram is left unchanged in
    /// that case.
    pub fn add(&mut self, element: Element) -> Result<(), DiagramError> {
        let id = element.id();
        if self.contains(id) {
            return Err(DiagramError::DuplicateId(id));
        }
        if element.parent() == Some(id) {
            return Err(DiagramError::ParentCycle(id));
        }

        for (relation, referenced) in element.relations() {
            if !self.contains(referenced) {
                return Err(DiagramError::UnknownReference {
                    element: id,
                    relation,
                    referenced,
                });
            }
        }

        self.elements.insert(id, detached(element));
        self.link(id);
        trace!(id:?; "Element added");
        Ok(())
    }

    /// Removes the element `id` and unwires it from the elements it references.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::HasDependents`] while children, attachers,
    /// labels or connections still point at the element.
    pub fn remove(&mut self, id: Id) -> Result<Element, DiagramError> {
        let element = self.element(id)?;
        if element.has_dependents() {
            return Err(DiagramError::HasDependents(id));
        }

        let relations = element.relations();
        for (relation, referenced) in relations {
            if let Some(other) = self.elements.get_mut(&referenced) {
                other.remove_dependent(relation, id);
            }
        }

        if self.root == Some(id) {
            self.root = None;
        }

        trace!(id:?; "Element removed");
        self.elements
            .shift_remove(&id)
            .ok_or(DiagramError::NotFound(id))
    }

    /// Returns the element `id`, if present.
    pub fn get(&self, id: Id) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Returns the element `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::NotFound`] if the element does not exist.
    pub fn element(&self, id: Id) -> Result<&Element, DiagramError> {
        self.get(id).ok_or(DiagramError::NotFound(id))
    }

    pub fn contains(&self, id: Id) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over the elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Iterates over the element ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.elements.keys().copied()
    }

    /// Returns `true` if `ancestor` is `id` itself or one of its transitive parents.
    pub fn is_descendant_of(&self, id: Id, ancestor: Id) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == ancestor {
                return true;
            }
            current = self.get(current_id).and_then(Element::parent);
        }
        false
    }

    fn check_references(&self, id: Id) -> Result<(), DiagramError> {
        let element = self.element(id)?;
        for (relation, referenced) in element.relations() {
            if !self.contains(referenced) {
                return Err(DiagramError::UnknownReference {
                    element: id,
                    relation,
                    referenced,
                });
            }
        }
        Ok(())
    }

    /// Walks up the parents of `id`, failing if the walk returns to `id`.
    fn check_containment(&self, id: Id) -> Result<(), DiagramError> {
        let mut current = self.get(id).and_then(Element::parent);
        // a cycle through `id` is at most as long as the diagram
        for _ in 0..self.len() {
            match current {
                None => return Ok(()),
                Some(parent) if parent == id => return Err(DiagramError::ParentCycle(id)),
                Some(parent) => current = self.get(parent).and_then(Element::parent),
            }
        }
        Ok(())
    }

    fn link(&mut self, id: Id) {
        let relations = match self.get(id) {
            Some(element) => element.relations(),
            None => return,
        };

        for (relation, referenced) in relations {
            if let Some(other) = self.elements.get_mut(&referenced) {
                other.add_dependent(relation, id);
            }
        }
    }
}

/// Strips inverse relations so the owner can rebuild them.
fn detached(element: Element) -> Element {
    let mut fresh = Element::new(element.id());
    fresh.set_parent(element.parent());
    fresh.set_position(element.x(), element.y());
    fresh.set_size(element.width(), element.height());
    fresh.set_host(element.host());
    fresh.set_source(element.source());
    fresh.set_target(element.target());
    fresh.set_waypoints(element.waypoints().map(<[_]>::to_vec));
    fresh.set_label_target(element.label_target());
    *fresh.attrs_mut() = element.attrs().clone();
    fresh
}
