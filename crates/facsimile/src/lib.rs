//! Facsimile - copy and paste for diagram editors.
//!
//! Copying a selection of shapes, connections, labels and attached shapes
//! produces a self-contained [`Tree`] of descriptors: every element the
//! selection depends on is pulled in, elements whose dependencies cannot be
//! copied are dropped, and the rest is ordered so that pasting never
//! references an element before it exists. Pasting recreates the tree with
//! fresh ids and places it, centered, at a new location.
//!
//! # Examples
//!
//! ```
//! use facsimile::{CopyPaste, PasteContext, PasteOutcome, modeling::Modeler};
//! use facsimile_core::{Diagram, Element, Id, geometry::Point};
//!
//! let diagram = Diagram::from_elements(
//!     Some(Id::new("root")),
//!     [
//!         Element::new(Id::new("root")),
//!         Element::shape(Id::new("task"), 100.0, 100.0, 80.0, 60.0).with_parent(Id::new("root")),
//!     ],
//! )
//! .unwrap();
//!
//! let mut copy_paste = CopyPaste::default();
//! let tree = copy_paste.copy(&diagram, &[Id::new("task")]).unwrap().unwrap();
//! assert_eq!(tree.len(), 1);
//!
//! let mut modeler = Modeler::new(diagram);
//! let outcome = copy_paste
//!     .paste(&PasteContext::at(Id::new("root"), Point::new(500.0, 500.0)), &mut modeler)
//!     .unwrap();
//!
//! let PasteOutcome::Created(ids) = outcome else { panic!("expected a direct paste") };
//! let pasted = modeler.diagram().element(ids[0]).unwrap();
//! assert_eq!(pasted.bounds().center(), Point::new(500.0, 500.0));
//! ```

pub mod clipboard;
pub mod closure;
pub mod config;
pub mod descriptor;
pub mod elements;
pub mod factory;
pub mod interaction;
pub mod listener;
pub mod modeling;
pub mod rules;
pub mod tree;

mod copy_paste;
mod error;

pub use facsimile_core::{geometry, identifier};

pub use copy_paste::{CopyPaste, PasteContext, PasteOutcome};
pub use descriptor::{Descriptor, Priority};
pub use elements::Elements;
pub use error::CopyPasteError;
pub use tree::Tree;
