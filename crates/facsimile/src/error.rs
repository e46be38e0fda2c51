//! Error types for Facsimile operations.
//!
//! This module provides the main error type [`CopyPasteError`]. Filtering
//! during copy (missing dependencies, permission denials) is not an error;
//! only broken invariants and failures of host collaborators surface here.

use thiserror::Error;

use facsimile_core::{DiagramError, Id, Relation};

/// The main error type for copy/paste operations.
#[derive(Debug, Error)]
pub enum CopyPasteError {
    #[error("Diagram error: {0}")]
    Diagram(#[from] DiagramError),

    /// A descriptor references an element that was never materialized.
    ///
    /// Trees built by [`crate::CopyPaste::create_tree`] never trigger this; it
    /// indicates a hand-edited or corrupted tree.
    #[error("Cannot paste '{element}': {relation} '{referenced}' was not created before it")]
    UnresolvedReference {
        element: Id,
        relation: Relation,
        referenced: Id,
    },

    #[error("Descriptor contributor '{0}' is already registered")]
    DuplicateDescriptor(String),

    #[error("Modeling error: {0}")]
    Modeling(Box<dyn std::error::Error + Send + Sync>),
}

impl CopyPasteError {
    /// Wraps an error raised by a host [`crate::modeling::Modeling`] implementation.
    pub fn modeling(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Modeling(Box::new(err))
    }
}
