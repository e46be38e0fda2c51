//! The copy/paste engine.
//!
//! # Overview
//!
//! Copying turns a selection into a [`Tree`]:
//!
//! 1. The selection closure is collected ([`closure::collect`]).
//! 2. Every element of the closure is described by the registered
//!    [`DescriptorContributor`]s.
//! 3. Candidates are stably sorted by [`Priority`] and validated in that
//!    order: connections need both endpoints, labels their label target
//!    and attached shapes their host to have been accepted already, and
//!    the [`Rules`] have to allow the copy.
//! 4. Accepted descriptors are bucketed by depth.
//!
//! Pasting materializes a tree depth by depth, resolving every reference
//! through a per-paste [`PasteCache`], then either inserts the new
//! elements centered on a point through [`Modeling`] or hands them to a
//! [`CreateInteraction`] for dragging.

use std::collections::HashSet;

use log::{debug, info, trace};

use facsimile_core::{
    Diagram, Element, Id, Relation,
    geometry::{Point, bounding_box, delta},
};

use crate::{
    clipboard::{Clipboard, ClipboardStore},
    closure::{self, ClosureEntry},
    config::AppConfig,
    descriptor::{ClosureContext, Delta, Descriptor, DescriptorContributor, DescriptorRegistry, Priority},
    elements::Elements,
    error::CopyPasteError,
    factory::{DefaultElementFactory, ElementFactory},
    interaction::{CreateInteraction, PointerSource},
    listener::{CopyPasteListener, DisableBehaviors, Hints, PasteCache},
    modeling::Modeling,
    rules::{AllowAll, RuleAction, RuleContext, Rules},
    tree::Tree,
};

/// Where a paste should go.
///
/// Only a context carrying both a target and a point places elements
/// directly; anything else starts a drag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PasteContext {
    target: Option<Id>,
    point: Option<Point>,
}

impl PasteContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context pasting into `target`, centered on `point`.
    pub fn at(target: Id, point: Point) -> Self {
        Self {
            target: Some(target),
            point: Some(point),
        }
    }

    pub fn with_target(mut self, target: Id) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_point(mut self, point: Point) -> Self {
        self.point = Some(point);
        self
    }

    pub fn target(&self) -> Option<Id> {
        self.target
    }

    pub fn point(&self) -> Option<Point> {
        self.point
    }
}

/// Result of [`CopyPaste::paste`].
#[derive(Debug, Clone, PartialEq)]
pub enum PasteOutcome {
    /// The clipboard was empty.
    Nothing,
    /// Elements were inserted directly; holds the ids reported by [`Modeling`].
    Created(Vec<Id>),
    /// Elements were handed to the [`CreateInteraction`].
    Dragging,
    /// No drag interaction is configured; the materialized elements are
    /// returned to the caller instead.
    Pending(Elements),
}

/// Copies selections to the clipboard and pastes them back.
pub struct CopyPaste {
    config: AppConfig,
    clipboard: Box<dyn ClipboardStore>,
    rules: Box<dyn Rules>,
    factory: Box<dyn ElementFactory>,
    interaction: Option<Box<dyn CreateInteraction>>,
    pointer_source: Option<Box<dyn PointerSource>>,
    listeners: Vec<Box<dyn CopyPasteListener>>,
    descriptors: DescriptorRegistry,
}

impl std::fmt::Debug for CopyPaste {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyPaste")
            .field("config", &self.config)
            .field("descriptors", &self.descriptors)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for CopyPaste {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl CopyPaste {
    /// Creates an engine with an in-memory clipboard, permissive rules and
    /// the [`DefaultElementFactory`].
    ///
    /// Unless `config` enables behaviors, a [`DisableBehaviors`] listener is
    /// registered first.
    pub fn new(config: AppConfig) -> Self {
        let mut listeners: Vec<Box<dyn CopyPasteListener>> = Vec::new();
        if !config.paste().behavior() {
            listeners.push(Box::new(DisableBehaviors));
        }

        Self {
            config,
            clipboard: Box::new(Clipboard::new()),
            rules: Box::new(AllowAll),
            factory: Box::new(DefaultElementFactory::new()),
            interaction: None,
            pointer_source: None,
            listeners,
            descriptors: DescriptorRegistry::new(),
        }
    }

    pub fn with_clipboard(mut self, clipboard: impl ClipboardStore + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    pub fn with_rules(mut self, rules: impl Rules + 'static) -> Self {
        self.rules = Box::new(rules);
        self
    }

    pub fn with_factory(mut self, factory: impl ElementFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    pub fn with_interaction(mut self, interaction: impl CreateInteraction + 'static) -> Self {
        self.interaction = Some(Box::new(interaction));
        self
    }

    pub fn with_pointer_source(mut self, source: impl PointerSource + 'static) -> Self {
        self.pointer_source = Some(Box::new(source));
        self
    }

    /// Adds `listener` after the already registered ones.
    pub fn with_listener(mut self, listener: impl CopyPasteListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Registers an additional descriptor contributor.
    ///
    /// # Errors
    ///
    /// Returns [`CopyPasteError::DuplicateDescriptor`] if a contributor with
    /// the same name is already registered.
    pub fn register_descriptor(
        &mut self,
        contributor: impl DescriptorContributor + 'static,
    ) -> Result<(), CopyPasteError> {
        self.descriptors.register(Box::new(contributor))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn clipboard(&self) -> &dyn ClipboardStore {
        self.clipboard.as_ref()
    }

    /// Copies `selection` to the clipboard.
    ///
    /// Returns `None` for an empty selection, which leaves the clipboard
    /// untouched. Otherwise the built tree is returned; when nothing could
    /// be copied it is empty and the clipboard has been cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected element is not part of `diagram`.
    pub fn copy(&mut self, diagram: &Diagram, selection: &[Id]) -> Result<Option<Tree>, CopyPasteError> {
        if selection.is_empty() {
            return Ok(None);
        }

        let mut tree = self.create_tree(diagram, selection)?;
        assign_deltas(diagram, &mut tree)?;

        for listener in &mut self.listeners {
            listener.elements_copy(&mut tree);
        }

        if tree.is_empty() {
            self.clipboard.clear();
        } else {
            self.clipboard.set(tree.clone());
        }

        for listener in &mut self.listeners {
            listener.elements_copied(&tree);
        }

        info!(selected = selection.len(), copied = tree.len(); "Elements copied");
        Ok(Some(tree))
    }

    /// Pastes the clipboard content.
    ///
    /// With a target and a point in `context`, the elements are centered on
    /// the point and inserted through `modeling`. Otherwise they are handed
    /// to the configured [`CreateInteraction`], starting from the last
    /// pointer event named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored tree references an element that was
    /// never created, or if `modeling` fails.
    pub fn paste(
        &mut self,
        context: &PasteContext,
        modeling: &mut dyn Modeling,
    ) -> Result<PasteOutcome, CopyPasteError> {
        if self.clipboard.is_empty() {
            debug!("Clipboard is empty, nothing to paste");
            return Ok(PasteOutcome::Nothing);
        }
        let Some(tree) = self.clipboard.get() else {
            return Ok(PasteOutcome::Nothing);
        };

        let mut hints = Hints::new();
        for listener in &mut self.listeners {
            listener.elements_paste(&mut hints);
        }

        let elements = self.create_elements(&tree)?;

        if let (Some(target), Some(point)) = (context.target(), context.point()) {
            let ids = place(elements, target, point, &hints, modeling)?;
            info!(created = ids.len(), target:?; "Elements pasted");
            return Ok(PasteOutcome::Created(ids));
        }

        let Some(interaction) = self.interaction.as_mut() else {
            debug!(elements = elements.len(); "No create interaction, returning pasted elements");
            return Ok(PasteOutcome::Pending(elements));
        };

        let event = self
            .pointer_source
            .as_ref()
            .and_then(|source| source.last_event(self.config.paste().pointer_event()));
        debug!(elements = elements.len(), has_event = event.is_some(); "Starting create interaction");
        interaction.start(event, elements, hints);
        Ok(PasteOutcome::Dragging)
    }

    /// Builds the tree for `selection` without touching the clipboard.
    ///
    /// An element is only kept once everything it depends on has been
    /// accepted: both endpoints of a connection, the target of a label and
    /// the host of an attached shape. Attached shapes whose host is not
    /// copied are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected element is not part of `diagram`.
    pub fn create_tree(&self, diagram: &Diagram, selection: &[Id]) -> Result<Tree, CopyPasteError> {
        let entries = closure::collect(diagram, selection)?;
        let context = ClosureContext::new(diagram, &entries);

        let mut candidates: Vec<(ClosureEntry, &Element, Descriptor)> = entries
            .iter()
            .map(|entry| -> Result<_, CopyPasteError> {
                let element = diagram.element(entry.element())?;
                Ok((*entry, element, self.descriptors.describe(element, &context)))
            })
            .collect::<Result<_, CopyPasteError>>()?;

        // stable, so closure order decides between equal priorities
        candidates.sort_by_key(|(_, _, descriptor)| descriptor.priority);

        let elements: Vec<&Element> = candidates.iter().map(|(_, element, _)| *element).collect();

        let mut accepted: HashSet<Id> = HashSet::new();
        let mut tree = Tree::new();

        for (entry, element, descriptor) in candidates {
            if let Some(relation) = missing_relation(element, &accepted) {
                trace!(id:? = element.id(), relation:? = relation; "Dependency not copied, skipping element");
                continue;
            }

            let rule_context = RuleContext {
                element,
                elements: &elements,
                diagram,
            };
            if !self.rules.allowed(RuleAction::ElementCopy, &rule_context) {
                trace!(id:? = element.id(); "Copy not allowed, skipping element");
                continue;
            }

            accepted.insert(element.id());
            tree.push(entry.depth(), descriptor);
        }

        // parents may have been rejected after their children were described
        for (_, branch) in tree.iter_mut() {
            for descriptor in branch.iter_mut() {
                if descriptor.parent.is_some_and(|parent| !accepted.contains(&parent)) {
                    descriptor.parent = None;
                }
            }
        }

        debug!(
            selected = selection.len(),
            closure = entries.len(),
            copied = tree.len();
            "Tree created"
        );
        Ok(tree)
    }

    /// Creates new elements for every descriptor of `tree`.
    ///
    /// Elements are created depth by depth, in priority order within a
    /// depth. References are resolved to the elements created earlier in
    /// the same call; a parent that was not created leaves the element
    /// unparented.
    ///
    /// # Errors
    ///
    /// Returns [`CopyPasteError::UnresolvedReference`] if a connection, label
    /// or attached shape references an element that was not created before
    /// it.
    pub fn create_elements(&mut self, tree: &Tree) -> Result<Elements, CopyPasteError> {
        let mut cache = PasteCache::new();
        let mut elements = Elements::new();

        for (depth, branch) in tree.iter() {
            let mut branch = branch.to_vec();
            branch.sort_by_key(|descriptor| descriptor.priority);
            trace!(depth, descriptors = branch.len(); "Materializing branch");

            for original in branch {
                let mut descriptor = original.clone();
                descriptor.parent = descriptor.parent.and_then(|parent| cache.get(parent));

                for listener in &mut self.listeners {
                    listener.element_paste(&mut descriptor, &mut cache);
                }

                let element = if descriptor.is_connection() {
                    descriptor.source = resolve(&cache, &original, Relation::Source, descriptor.source)?;
                    descriptor.target = resolve(&cache, &original, Relation::Target, descriptor.target)?;
                    self.factory.create_connection(&descriptor)
                } else if descriptor.is_label() {
                    descriptor.label_target =
                        resolve(&cache, &original, Relation::LabelTarget, descriptor.label_target)?;
                    self.factory.create_label(&descriptor)
                } else {
                    descriptor.host = resolve(&cache, &original, Relation::Host, descriptor.host)?;
                    self.factory.create_shape(&descriptor)
                };

                let id = element.id();
                trace!(from:? = original.id, to:? = id; "Element materialized");
                cache.insert(original.id, id);
                elements.add(element);
                elements.link(id);
            }
        }

        Ok(elements)
    }
}

/// Returns the first relation of `element` whose element was not accepted.
fn missing_relation(element: &Element, accepted: &HashSet<Id>) -> Option<Relation> {
    let is_missing = |id: Option<Id>| id.is_none_or(|id| !accepted.contains(&id));

    if element.is_connection() {
        if is_missing(element.source()) {
            return Some(Relation::Source);
        }
        if is_missing(element.target()) {
            return Some(Relation::Target);
        }
    }

    if element.label_target().is_some() && is_missing(element.label_target()) {
        return Some(Relation::LabelTarget);
    }

    if element.host().is_some() && is_missing(element.host()) {
        return Some(Relation::Host);
    }

    None
}

/// Maps `referenced` to the element created for it.
fn resolve(
    cache: &PasteCache,
    descriptor: &Descriptor,
    relation: Relation,
    referenced: Option<Id>,
) -> Result<Option<Id>, CopyPasteError> {
    let Some(referenced) = referenced else {
        return Ok(None);
    };
    cache
        .get(referenced)
        .map(Some)
        .ok_or(CopyPasteError::UnresolvedReference {
            element: descriptor.id,
            relation,
            referenced,
        })
}

/// Records the displacement of every descriptor.
///
/// Shapes and connection waypoints are measured from the center of the
/// copied elements, labels from their label target.
fn assign_deltas(diagram: &Diagram, tree: &mut Tree) -> Result<(), CopyPasteError> {
    let bounds = tree
        .descriptors()
        .map(|descriptor| diagram.element(descriptor.id).map(Element::bounds))
        .collect::<Result<Vec<_>, _>>()?;
    let Some(center) = bounding_box(bounds).map(|bounds| bounds.center()) else {
        return Ok(());
    };

    let deltas: Vec<Delta> = tree
        .descriptors()
        .map(|descriptor| {
            let position = descriptor_position(descriptor);
            if let Some(label_target) = descriptor.label_target {
                let origin = tree
                    .find(label_target)
                    .map(|target| {
                        target
                            .waypoints
                            .as_ref()
                            .and_then(|waypoints| waypoints.first())
                            .map(|waypoint| waypoint.point())
                            .unwrap_or_else(|| descriptor_position(target))
                    })
                    .unwrap_or(center);
                Delta::Point(delta(position, origin))
            } else if descriptor.priority == Priority::Connection {
                Delta::Waypoints(
                    descriptor
                        .waypoints
                        .iter()
                        .flatten()
                        .map(|waypoint| delta(waypoint.point(), center))
                        .collect(),
                )
            } else {
                Delta::Point(delta(position, center))
            }
        })
        .collect();

    let descriptors = tree.iter_mut().flat_map(|(_, branch)| branch.iter_mut());
    for (descriptor, delta) in descriptors.zip(deltas) {
        descriptor.delta = Some(delta);
    }
    Ok(())
}

fn descriptor_position(descriptor: &Descriptor) -> Point {
    Point::new(descriptor.x.unwrap_or(0.0), descriptor.y.unwrap_or(0.0))
}

/// Centers `elements` on the origin and inserts them through `modeling`.
fn place(
    mut elements: Elements,
    target: Id,
    anchor: Point,
    hints: &Hints,
    modeling: &mut dyn Modeling,
) -> Result<Vec<Id>, CopyPasteError> {
    for element in elements.iter_mut() {
        if !element.is_connection() {
            element.set_position(
                Some(element.x().unwrap_or(0.0)),
                Some(element.y().unwrap_or(0.0)),
            );
        }
    }

    if let Some(bounds) = elements.bounds() {
        let offset = bounds.center().scale(-1.0);
        for element in elements.iter_mut() {
            element.translate(offset);
        }
    }

    modeling.create_elements(elements, anchor, target, hints)
}
