//! Selection closure.
//!
//! Expands a user selection into every element that has to be copied along
//! with it: children of selected containers, labels, attached shapes and
//! connections touching visited elements.
//!
//! Each element is recorded once, at the greatest depth it was reached at.
//! Attachers and incident connections are recorded at the depth of the
//! element that pulled them in, not one level deeper. Once the walk is done,
//! connections, labels and attachers are promoted to the depth of the
//! deepest element they depend on, so they are never pasted before it.

use indexmap::IndexMap;
use log::trace;

use facsimile_core::{Diagram, DiagramError, Element, Id};

/// An element of the closure with the nesting level it was discovered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosureEntry {
    element: Id,
    depth: usize,
}

impl ClosureEntry {
    pub fn new(element: Id, depth: usize) -> Self {
        Self { element, depth }
    }

    pub fn element(&self) -> Id {
        self.element
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Reduces `selection` to the elements not nested inside another selected element.
///
/// Input order is kept; repeated ids are reported once.
///
/// # Errors
///
/// Returns [`DiagramError::NotFound`] for ids missing from `diagram`.
pub fn top_level(diagram: &Diagram, selection: &[Id]) -> Result<Vec<Id>, DiagramError> {
    let mut unique: Vec<Id> = Vec::with_capacity(selection.len());
    for &id in selection {
        diagram.element(id)?;
        if !unique.contains(&id) {
            unique.push(id);
        }
    }

    Ok(unique
        .iter()
        .copied()
        .filter(|&id| {
            !unique
                .iter()
                .any(|&other| other != id && diagram.is_descendant_of(id, other))
        })
        .collect())
}

/// Computes the closure of `selection`.
///
/// # Errors
///
/// Returns [`DiagramError::NotFound`] for ids missing from `diagram`.
pub fn collect(diagram: &Diagram, selection: &[Id]) -> Result<Vec<ClosureEntry>, DiagramError> {
    let roots = top_level(diagram, selection)?;

    let mut walker = Walker {
        diagram,
        included: IndexMap::new(),
    };
    walker.visit_all(&roots, 0)?;
    walker.settle_dependents()?;

    Ok(walker
        .included
        .into_iter()
        .map(|(element, depth)| ClosureEntry::new(element, depth))
        .collect())
}

struct Walker<'a> {
    diagram: &'a Diagram,
    included: IndexMap<Id, usize>,
}

impl Walker<'_> {
    fn visit_all(&mut self, ids: &[Id], depth: usize) -> Result<(), DiagramError> {
        for &id in ids {
            let element = self.diagram.element(id)?;
            self.visit(element, depth)?;
        }
        Ok(())
    }

    fn visit(&mut self, element: &Element, depth: usize) -> Result<(), DiagramError> {
        // labels only travel with their target
        if element.is_label() {
            return Ok(());
        }

        self.include_labels(element, depth);

        let related = element
            .attachers()
            .iter()
            .chain(element.incoming())
            .chain(element.outgoing());
        for &id in related {
            let related = self.diagram.element(id)?;
            self.include_labels(related, depth);
            self.include(id, depth);
        }

        self.include(element.id(), depth);

        if !element.children().is_empty() {
            self.visit_all(element.children(), depth + 1)?;
        }
        Ok(())
    }

    /// Promotes every entry to the greatest depth of the included elements it
    /// references, until nothing moves.
    ///
    /// Promotion only goes to the depth of an existing entry, so this
    /// terminates even for mutually referencing elements.
    fn settle_dependents(&mut self) -> Result<(), DiagramError> {
        loop {
            let mut promotions = Vec::new();
            for (&id, &depth) in &self.included {
                let element = self.diagram.element(id)?;
                let required = [
                    element.source(),
                    element.target(),
                    element.label_target(),
                    element.host(),
                ]
                .into_iter()
                .flatten()
                .filter_map(|dependency| self.included.get(&dependency).copied())
                .max();

                if let Some(required) = required.filter(|&required| required > depth) {
                    promotions.push((id, required));
                }
            }

            if promotions.is_empty() {
                return Ok(());
            }
            for (id, depth) in promotions {
                self.include(id, depth);
            }
        }
    }

    fn include_labels(&mut self, element: &Element, depth: usize) {
        for &label in element.labels() {
            self.include(label, depth);
        }
    }

    /// Registers `id` at `depth`, keeping the greatest depth seen so far.
    ///
    /// A promoted element moves to the end of the closure order.
    fn include(&mut self, id: Id, depth: usize) {
        match self.included.get(&id) {
            None => {
                self.included.insert(id, depth);
            }
            Some(&known) if known < depth => {
                trace!(id:?, from = known, to = depth; "Promoting closure entry");
                self.included.shift_remove(&id);
                self.included.insert(id, depth);
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facsimile_core::Waypoint;

    fn id(name: &str) -> Id {
        Id::new(name)
    }

    /// root > parent1 > child1..3, root > parent2 > child4, child5 > grand_child1
    fn family() -> Diagram {
        Diagram::from_elements(
            Some(id("root")),
            [
                Element::new(id("root")),
                Element::new(id("parent1")).with_parent(id("root")),
                Element::new(id("child1")).with_parent(id("parent1")),
                Element::new(id("child2")).with_parent(id("parent1")),
                Element::new(id("child3")).with_parent(id("parent1")),
                Element::new(id("parent2")).with_parent(id("root")),
                Element::new(id("child4")).with_parent(id("parent2")),
                Element::new(id("child5")).with_parent(id("parent2")),
                Element::new(id("grand_child1")).with_parent(id("child5")),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_top_level_drops_nested_selection() {
        let diagram = family();
        let selection = [
            "parent1",
            "child1",
            "child2",
            "child3",
            "parent2",
            "child4",
            "child5",
            "grand_child1",
        ]
        .map(id);

        assert_eq!(
            top_level(&diagram, &selection).unwrap(),
            vec![id("parent1"), id("parent2")]
        );
    }

    #[test]
    fn test_top_level_keeps_siblings() {
        let diagram = family();
        let selection = ["child1", "child2", "child3", "child4", "child5", "grand_child1"].map(id);

        assert_eq!(
            top_level(&diagram, &selection).unwrap(),
            ["child1", "child2", "child3", "child4", "child5"].map(id).to_vec()
        );
    }

    #[test]
    fn test_top_level_deduplicates() {
        let diagram = family();
        let selection = ["child1", "child1"].map(id);

        assert_eq!(top_level(&diagram, &selection).unwrap(), vec![id("child1")]);
    }

    #[test]
    fn test_unknown_selection_is_an_error() {
        let diagram = family();

        assert_eq!(
            collect(&diagram, &[id("nope")]).unwrap_err(),
            DiagramError::NotFound(id("nope"))
        );
    }

    #[test]
    fn test_collect_orders_labels_before_owner_and_children_after() {
        let diagram = Diagram::from_elements(
            None,
            [
                Element::shape(id("box"), 0.0, 0.0, 100.0, 100.0),
                Element::label(id("box_label"), id("box")).with_parent(id("box")),
                Element::shape(id("inner"), 10.0, 10.0, 10.0, 10.0).with_parent(id("box")),
            ],
        )
        .unwrap();

        let entries = collect(&diagram, &[id("box")]).unwrap();

        assert_eq!(
            entries,
            vec![
                ClosureEntry::new(id("box_label"), 0),
                ClosureEntry::new(id("box"), 0),
                ClosureEntry::new(id("inner"), 1),
            ]
        );
    }

    #[test]
    fn test_collect_keeps_attachers_and_connections_at_owner_depth() {
        let diagram = Diagram::from_elements(
            None,
            [
                Element::shape(id("host"), 0.0, 0.0, 100.0, 100.0),
                Element::shape(id("attacher"), 90.0, 90.0, 20.0, 20.0).with_host(id("host")),
                Element::label(id("attacher_label"), id("attacher")),
                Element::shape(id("other"), 300.0, 0.0, 100.0, 100.0),
                Element::connection(
                    id("flow"),
                    id("host"),
                    id("other"),
                    vec![Waypoint::new(100.0, 50.0), Waypoint::new(300.0, 50.0)],
                ),
            ],
        )
        .unwrap();

        let entries = collect(&diagram, &[id("host")]).unwrap();

        assert_eq!(
            entries,
            vec![
                ClosureEntry::new(id("attacher_label"), 0),
                ClosureEntry::new(id("attacher"), 0),
                ClosureEntry::new(id("flow"), 0),
                ClosureEntry::new(id("host"), 0),
            ]
        );
    }

    #[test]
    fn test_collect_promotes_to_greatest_depth() {
        let diagram = Diagram::from_elements(
            None,
            [
                Element::shape(id("container"), 0.0, 0.0, 500.0, 500.0),
                Element::shape(id("a"), 10.0, 10.0, 10.0, 10.0).with_parent(id("container")),
                Element::shape(id("b"), 100.0, 10.0, 10.0, 10.0).with_parent(id("container")),
                Element::connection(id("flow"), id("a"), id("b"), vec![]),
            ],
        )
        .unwrap();

        let entries = collect(&diagram, &[id("flow"), id("container")]).unwrap();

        let flow: Vec<_> = entries.iter().filter(|e| e.element() == id("flow")).collect();
        assert_eq!(flow.len(), 1);
        assert_eq!(flow[0].depth(), 1);
        // re-registered at the end of the order once promoted
        assert_eq!(entries.last().map(ClosureEntry::element), Some(id("b")));
        assert_eq!(entries[entries.len() - 3].element(), id("flow"));
    }

    #[test]
    fn test_collect_moves_connection_below_nested_attacher() {
        // root > { x, sub > task }, boundary rides on task, flow: boundary -> x
        let diagram = Diagram::from_elements(
            Some(id("root")),
            [
                Element::new(id("root")),
                Element::shape(id("x"), 400.0, 0.0, 50.0, 50.0).with_parent(id("root")),
                Element::shape(id("sub"), 0.0, 0.0, 300.0, 200.0).with_parent(id("root")),
                Element::shape(id("task"), 20.0, 20.0, 100.0, 80.0).with_parent(id("sub")),
                Element::shape(id("boundary"), 100.0, 80.0, 20.0, 20.0)
                    .with_parent(id("root"))
                    .with_host(id("task")),
                Element::label(id("flow_label"), id("flow")).with_parent(id("root")),
                Element::connection(
                    id("flow"),
                    id("boundary"),
                    id("x"),
                    vec![Waypoint::new(110.0, 100.0), Waypoint::new(425.0, 50.0)],
                )
                .with_parent(id("root")),
            ],
        )
        .unwrap();

        let entries = collect(&diagram, &[id("x"), id("sub")]).unwrap();
        let depth = |name: &str| {
            entries
                .iter()
                .find(|entry| entry.element() == id(name))
                .map(ClosureEntry::depth)
        };

        assert_eq!(depth("x"), Some(0));
        assert_eq!(depth("boundary"), Some(1));
        assert_eq!(depth("flow"), Some(1));
        assert_eq!(depth("flow_label"), Some(1));
        assert_eq!(entries.len(), 6);
    }

    #[test]
    fn test_collect_skips_selected_labels() {
        let diagram = Diagram::from_elements(
            None,
            [
                Element::shape(id("shape"), 0.0, 0.0, 10.0, 10.0),
                Element::label(id("shape_label"), id("shape")),
            ],
        )
        .unwrap();

        assert!(collect(&diagram, &[id("shape_label")]).unwrap().is_empty());
    }
}
