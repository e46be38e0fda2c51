//! Structural mutation of the live diagram.
//!
//! Pasting ends with a single call to [`Modeling::create_elements`], which
//! inserts the whole group into the document as one undoable unit.
//! [`Modeler`] is an in-memory implementation over a [`Diagram`].

use log::{debug, trace};

use facsimile_core::{Diagram, Element, Id, geometry::Point};

use crate::{elements::Elements, error::CopyPasteError, listener::Hints};

/// Host facility inserting pasted elements into the document.
pub trait Modeling {
    /// Inserts `elements` into `target`.
    ///
    /// `elements` arrive centered around the origin; the implementation
    /// moves them to `anchor` and parents every element without a parent
    /// onto `target`.
    ///
    /// # Returns
    ///
    /// The ids of the inserted elements, in insertion order.
    ///
    /// # Errors
    ///
    /// Implementations report failures through [`CopyPasteError`]; nothing
    /// may be left half inserted.
    fn create_elements(
        &mut self,
        elements: Elements,
        anchor: Point,
        target: Id,
        hints: &Hints,
    ) -> Result<Vec<Id>, CopyPasteError>;
}

/// One undoable insertion.
#[derive(Debug, Clone)]
struct Batch {
    elements: Vec<Element>,
}

/// Undoable [`Modeling`] over an owned [`Diagram`].
#[derive(Debug, Default)]
pub struct Modeler {
    diagram: Diagram,
    /// Batches that can be undone (most recent last)
    undo_stack: Vec<Batch>,
    /// Batches that can be redone (most recent last)
    redo_stack: Vec<Batch>,
}

impl Modeler {
    pub fn new(diagram: Diagram) -> Self {
        Self {
            diagram,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn into_diagram(self) -> Diagram {
        self.diagram
    }

    /// Removes the most recently inserted batch.
    ///
    /// Returns `false` if there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns a [`DiagramError`](facsimile_core::DiagramError) if the
    /// diagram no longer matches the batch.
    pub fn undo(&mut self) -> Result<bool, CopyPasteError> {
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(false);
        };

        let ids: Vec<Id> = batch.elements.iter().map(Element::id).collect();
        if let Err(err) = self.remove_all(&ids) {
            self.undo_stack.push(batch);
            return Err(err);
        }

        debug!(elements = ids.len(); "Undid element creation");
        self.redo_stack.push(batch);
        Ok(true)
    }

    /// Re-inserts the most recently undone batch.
    ///
    /// Returns `false` if there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns a [`DiagramError`](facsimile_core::DiagramError) if the
    /// batch no longer fits the diagram.
    pub fn redo(&mut self) -> Result<bool, CopyPasteError> {
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(false);
        };

        if let Err(err) = self.insert_all(batch.elements.clone()) {
            self.redo_stack.push(batch);
            return Err(err);
        }

        debug!(elements = batch.elements.len(); "Redid element creation");
        self.undo_stack.push(batch);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Inserts `elements` in order, rolling back on the first failure.
    fn insert_all(&mut self, elements: Vec<Element>) -> Result<Vec<Id>, CopyPasteError> {
        let mut inserted = Vec::with_capacity(elements.len());
        for element in elements {
            let id = element.id();
            if let Err(err) = self.diagram.add(element) {
                self.remove_all(&inserted)?;
                return Err(err.into());
            }
            inserted.push(id);
        }
        Ok(inserted)
    }

    /// Removes `ids` in reverse insertion order.
    fn remove_all(&mut self, ids: &[Id]) -> Result<(), CopyPasteError> {
        for &id in ids.iter().rev() {
            self.diagram.remove(id)?;
        }
        Ok(())
    }
}

impl Modeling for Modeler {
    fn create_elements(
        &mut self,
        elements: Elements,
        anchor: Point,
        target: Id,
        hints: &Hints,
    ) -> Result<Vec<Id>, CopyPasteError> {
        self.diagram.element(target)?;

        let elements: Vec<Element> = elements
            .into_iter()
            .map(|mut element| {
                element.translate(anchor);
                if element.parent().is_none() {
                    element.set_parent(Some(target));
                }
                element
            })
            .collect();

        trace!(target:?, behavior = hints.behavior(); "Creating elements");
        let ids = self.insert_all(elements.clone())?;

        self.redo_stack.clear();
        self.undo_stack.push(Batch { elements });

        debug!(elements = ids.len(), target:?; "Elements created");
        Ok(ids)
    }
}
