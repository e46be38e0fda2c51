//! Ordered collection of freshly materialized elements.
//!
//! Pasted elements are not part of any diagram yet. [`Elements`] keeps them
//! in creation order and wires inverse relations between its own members,
//! so a host receives a fully linked group.

use indexmap::IndexMap;

use facsimile_core::{Element, Id, geometry::Bounds, geometry::bounding_box};

/// Elements in creation order, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Elements {
    elements: IndexMap<Id, Element>,
}

impl Elements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `element`, replacing (in place) an element with the same id.
    pub fn add(&mut self, element: Element) {
        self.elements.insert(element.id(), element);
    }

    /// Removes the element `id`, keeping the order of the others.
    pub fn remove(&mut self, id: Id) -> Option<Element> {
        self.elements.shift_remove(&id)
    }

    /// Replaces the element with the id of `element`.
    ///
    /// Returns the previous element, or `None` (leaving the collection
    /// untouched) when no such element exists.
    pub fn replace(&mut self, element: Element) -> Option<Element> {
        let slot = self.elements.get_mut(&element.id())?;
        Some(std::mem::replace(slot, element))
    }

    pub fn get(&self, id: Id) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: Id) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.elements.contains_key(&id)
    }

    /// Returns the first element matching `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<&Element>
    where
        P: FnMut(&Element) -> bool,
    {
        self.iter().find(|element| predicate(element))
    }

    /// Returns every element matching `predicate`, in order.
    pub fn filter<P>(&self, mut predicate: P) -> Vec<&Element>
    where
        P: FnMut(&Element) -> bool,
    {
        self.iter().filter(|element| predicate(element)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.values_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.elements.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn into_vec(self) -> Vec<Element> {
        self.elements.into_values().collect()
    }

    /// Combined bounds of all elements, `None` for an empty collection.
    pub fn bounds(&self) -> Option<Bounds> {
        bounding_box(self.iter().map(Element::bounds))
    }

    /// Registers element `id` on the members it references.
    ///
    /// References to elements outside the collection are left alone; they
    /// are wired by whoever inserts the group into a diagram.
    pub fn link(&mut self, id: Id) {
        let Some(element) = self.elements.get(&id) else {
            return;
        };
        for (relation, referenced) in element.relations() {
            if let Some(referenced) = self.elements.get_mut(&referenced) {
                referenced.add_dependent(relation, id);
            }
        }
    }
}

impl FromIterator<Element> for Elements {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        let mut elements = Self::new();
        for element in iter {
            elements.add(element);
        }
        elements
    }
}

impl IntoIterator for Elements {
    type Item = Element;
    type IntoIter = indexmap::map::IntoValues<Id, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_values()
    }
}

impl<'a> IntoIterator for &'a Elements {
    type Item = &'a Element;
    type IntoIter = indexmap::map::Values<'a, Id, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.values()
    }
}
