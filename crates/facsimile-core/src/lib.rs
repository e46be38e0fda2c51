//! Facsimile Core Types and Definitions
//!
//! This crate provides the element model consumed by the Facsimile copy/paste
//! engine. It includes:
//!
//! - **Identifiers**: String-interned element identifiers ([`identifier::Id`])
//! - **Geometry**: Points, bounds and displacement helpers ([`geometry`] module)
//! - **Elements**: Shapes, connections and labels with their relations ([`element`] module)
//! - **Diagram**: An arena owning elements and their containment graph ([`diagram`] module)

pub mod diagram;
pub mod element;
pub mod geometry;
pub mod identifier;

pub use diagram::{Diagram, DiagramError, DiagramFile};
pub use element::{AttrValue, Element, ElementKind, Relation, Waypoint};
pub use identifier::Id;
