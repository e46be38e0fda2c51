//! Permission oracle consulted before an element is copied.

use std::fmt;

use facsimile_core::{Diagram, Element};

/// Action a rule is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleAction {
    ElementCopy,
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementCopy => f.write_str("element.copy"),
        }
    }
}

/// Context of a rule evaluation.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The candidate element.
    pub element: &'a Element,
    /// Every element of the closure being copied, rejected ones included.
    pub elements: &'a [&'a Element],
    pub diagram: &'a Diagram,
}

/// Host permission oracle.
pub trait Rules {
    /// Returns `true` if `action` is allowed in `context`.
    fn allowed(&self, action: RuleAction, context: &RuleContext<'_>) -> bool;
}

/// Rules allowing everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl Rules for AllowAll {
    fn allowed(&self, _action: RuleAction, _context: &RuleContext<'_>) -> bool {
        true
    }
}

impl<F> Rules for F
where
    F: Fn(RuleAction, &RuleContext<'_>) -> bool,
{
    fn allowed(&self, action: RuleAction, context: &RuleContext<'_>) -> bool {
        self(action, context)
    }
}
