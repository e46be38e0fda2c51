//! Pointer tracking and the create-by-dragging interaction.
//!
//! A paste without an explicit target does not insert anything itself; it
//! hands the materialized elements to a [`CreateInteraction`], which lets
//! the user drop them. The drag starts at the last known pointer event,
//! obtained from a [`PointerSource`] such as [`MouseTracking`].

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use log::trace;

use facsimile_core::geometry::Point;

use crate::{elements::Elements, listener::Hints};

/// A pointer event observed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    name: String,
    position: Point,
}

impl PointerEvent {
    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Point {
        self.position
    }
}

/// Source of the most recent pointer events.
pub trait PointerSource {
    /// Returns the last event named `name`, if any was seen.
    fn last_event(&self, name: &str) -> Option<PointerEvent>;
}

/// Interaction placing new elements by dragging them onto the canvas.
pub trait CreateInteraction {
    /// Starts dragging `elements`.
    ///
    /// `event` is the pointer event the drag starts from; `None` when no
    /// pointer event has been seen yet.
    fn start(&mut self, event: Option<PointerEvent>, elements: Elements, hints: Hints);
}

/// Remembers the last pointer event, overall and per event name.
#[derive(Debug, Clone, Default)]
pub struct MouseTracking {
    last: Option<PointerEvent>,
    by_name: HashMap<String, PointerEvent>,
}

impl MouseTracking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `event` as the most recent one.
    pub fn record(&mut self, event: PointerEvent) {
        trace!(name = event.name(); "Pointer event recorded");
        self.by_name.insert(event.name.clone(), event.clone());
        self.last = Some(event);
    }

    /// Returns the most recent event of any name.
    pub fn last(&self) -> Option<&PointerEvent> {
        self.last.as_ref()
    }

    /// Forgets every recorded event, e.g. when the diagram is torn down.
    pub fn clear(&mut self) {
        self.last = None;
        self.by_name.clear();
    }
}

impl PointerSource for MouseTracking {
    fn last_event(&self, name: &str) -> Option<PointerEvent> {
        self.by_name.get(name).cloned()
    }
}

impl<T: PointerSource> PointerSource for Rc<RefCell<T>> {
    fn last_event(&self, name: &str) -> Option<PointerEvent> {
        self.borrow().last_event(name)
    }
}

impl<T: CreateInteraction> CreateInteraction for Rc<RefCell<T>> {
    fn start(&mut self, event: Option<PointerEvent>, elements: Elements, hints: Hints) {
        self.borrow_mut().start(event, elements, hints);
    }
}
