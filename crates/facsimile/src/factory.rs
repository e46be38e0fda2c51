//! Creation of new elements from descriptors.
//!
//! The materializer resolves every reference of a descriptor to a freshly
//! created element before handing it to an [`ElementFactory`], so factories
//! only decide on ids and on which fields a new element carries.

use std::collections::{HashMap, HashSet};

use facsimile_core::{Diagram, Element, Id};

use crate::descriptor::Descriptor;

/// Creates elements for pasted descriptors.
///
/// Returned elements must carry a new id, never the id of the descriptor
/// they were created from.
pub trait ElementFactory {
    fn create_shape(&mut self, descriptor: &Descriptor) -> Element;

    fn create_connection(&mut self, descriptor: &Descriptor) -> Element;

    fn create_label(&mut self, descriptor: &Descriptor) -> Element;
}

/// Factory naming elements `shape_N`, `connection_N` and `label_N`.
#[derive(Debug, Clone, Default)]
pub struct DefaultElementFactory {
    reserved: HashSet<Id>,
    counters: HashMap<&'static str, usize>,
}

impl DefaultElementFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory that never hands out an id already used in `diagram`.
    pub fn for_diagram(diagram: &Diagram) -> Self {
        Self::new().with_reserved(diagram.ids())
    }

    /// Marks `ids` as taken.
    pub fn with_reserved<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = Id>,
    {
        self.reserve(ids);
        self
    }

    pub fn reserve<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = Id>,
    {
        self.reserved.extend(ids);
    }

    fn next_id(&mut self, prefix: &'static str) -> Id {
        let counter = self.counters.entry(prefix).or_insert(0);
        loop {
            *counter += 1;
            let id = Id::sequential(prefix, *counter);
            if self.reserved.insert(id) {
                return id;
            }
        }
    }
}

impl ElementFactory for DefaultElementFactory {
    fn create_shape(&mut self, descriptor: &Descriptor) -> Element {
        let mut element = build(self.next_id("shape"), descriptor);
        element.set_host(descriptor.host);
        element
    }

    fn create_connection(&mut self, descriptor: &Descriptor) -> Element {
        let mut element = build(self.next_id("connection"), descriptor);
        element.set_source(descriptor.source);
        element.set_target(descriptor.target);
        element.set_waypoints(descriptor.waypoints.clone());
        element
    }

    fn create_label(&mut self, descriptor: &Descriptor) -> Element {
        let mut element = build(self.next_id("label"), descriptor);
        element.set_label_target(descriptor.label_target);
        element
    }
}

/// Copies the fields shared by every element kind.
fn build(id: Id, descriptor: &Descriptor) -> Element {
    let mut element = Element::new(id);
    element.set_parent(descriptor.parent);
    element.set_position(descriptor.x, descriptor.y);
    element.set_size(descriptor.width, descriptor.height);
    element.attrs_mut().extend(
        descriptor
            .attrs
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    element
}
