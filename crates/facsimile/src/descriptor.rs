//! Element descriptors and the contributors that build them.
//!
//! A [`Descriptor`] is the flat, serializable record an element is copied
//! as. Descriptors are produced by an ordered list of
//! [`DescriptorContributor`]s held in a [`DescriptorRegistry`]. The
//! [`BaseDescriptor`] always runs first and fills in identity, priority,
//! relations and geometry; contributors registered later may add or
//! override anything.

use std::collections::BTreeMap;

use log::trace;
use serde::{Deserialize, Serialize};

use facsimile_core::{AttrValue, Diagram, Element, Id, Waypoint, geometry::Point};

use crate::{closure::ClosureEntry, error::CopyPasteError};

/// Creation order of an element kind.
///
/// Lower priorities are validated and created first: plain shapes before
/// attached shapes, attached shapes before connections, connections before
/// labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    Shape = 1,
    Attacher = 2,
    Connection = 3,
    Label = 4,
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority as u8
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Shape),
            2 => Ok(Self::Attacher),
            3 => Ok(Self::Connection),
            4 => Ok(Self::Label),
            other => Err(format!("invalid descriptor priority {other}")),
        }
    }
}

/// Copy-time displacement of an element.
///
/// Shapes and connections are measured from the center of the copied
/// group; labels from their label target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Delta {
    Point(Point),
    Waypoints(Vec<Point>),
}

/// Serializable projection of one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub id: Id,
    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_target: Option<Id>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoints: Option<Vec<Waypoint>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,

    /// Host specific fields added by contributors.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, AttrValue>,
}

impl Descriptor {
    /// Creates an empty shape descriptor for `id`.
    pub fn new(id: Id) -> Self {
        Self {
            id,
            priority: Priority::Shape,
            parent: None,
            host: None,
            source: None,
            target: None,
            label_target: None,
            x: None,
            y: None,
            width: None,
            height: None,
            waypoints: None,
            delta: None,
            attrs: BTreeMap::new(),
        }
    }

    /// Returns `true` if the descriptor recreates a connection.
    pub fn is_connection(&self) -> bool {
        self.waypoints.is_some()
    }

    /// Returns `true` if the descriptor recreates a label.
    pub fn is_label(&self) -> bool {
        self.label_target.is_some()
    }
}

/// Read-only view of the closure handed to every contributor.
#[derive(Debug, Clone, Copy)]
pub struct ClosureContext<'a> {
    diagram: &'a Diagram,
    entries: &'a [ClosureEntry],
}

impl<'a> ClosureContext<'a> {
    pub fn new(diagram: &'a Diagram, entries: &'a [ClosureEntry]) -> Self {
        Self { diagram, entries }
    }

    pub fn diagram(&self) -> &'a Diagram {
        self.diagram
    }

    pub fn entries(&self) -> &'a [ClosureEntry] {
        self.entries
    }

    /// Returns `true` if `id` is part of the closure being copied.
    pub fn contains(&self, id: Id) -> bool {
        self.entries.iter().any(|entry| entry.element() == id)
    }
}

/// A step of descriptor construction.
///
/// Contributors run in registration order and write into the same
/// descriptor, so later contributors see (and may override) what earlier
/// ones produced.
pub trait DescriptorContributor {
    /// Unique name of the contributor.
    fn name(&self) -> &str;

    /// Adds the fields this contributor is responsible for to `descriptor`.
    fn contribute(&self, element: &Element, descriptor: &mut Descriptor, context: &ClosureContext<'_>);
}

/// Contributor producing the structural fields every element needs.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseDescriptor;

impl BaseDescriptor {
    pub const NAME: &'static str = "base";
}

impl DescriptorContributor for BaseDescriptor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn contribute(&self, element: &Element, descriptor: &mut Descriptor, context: &ClosureContext<'_>) {
        descriptor.priority = Priority::Shape;
        descriptor.id = element.id();

        if let Some(parent) = element.parent() {
            if context.contains(parent) {
                descriptor.parent = Some(parent);
            }
        }

        if let Some(label_target) = element.label_target() {
            descriptor.priority = Priority::Label;
            descriptor.label_target = Some(label_target);
        }

        if let Some(host) = element.host() {
            descriptor.priority = Priority::Attacher;
            descriptor.host = Some(host);
        }

        if let Some(x) = element.x() {
            descriptor.x = Some(x);
            descriptor.y = element.y();
        }

        if let Some(width) = element.width().filter(|width| *width != 0.0) {
            descriptor.width = Some(width);
            descriptor.height = element.height();
        }

        if let Some(waypoints) = element.waypoints() {
            descriptor.priority = Priority::Connection;
            descriptor.waypoints = Some(waypoints.to_vec());
        }

        if let (Some(source), Some(target)) = (element.source(), element.target()) {
            descriptor.source = Some(source);
            descriptor.target = Some(target);
        }

        descriptor.attrs.extend(
            element
                .attrs()
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
    }
}

/// Ordered set of descriptor contributors.
pub struct DescriptorRegistry {
    contributors: Vec<Box<dyn DescriptorContributor>>,
}

impl std::fmt::Debug for DescriptorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorRegistry")
            .field("contributors", &self.names())
            .finish()
    }
}

impl Default for DescriptorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorRegistry {
    /// Creates a registry holding only the [`BaseDescriptor`].
    pub fn new() -> Self {
        Self {
            contributors: vec![Box::new(BaseDescriptor)],
        }
    }

    /// Appends `contributor` to the registry.
    ///
    /// # Errors
    ///
    /// Returns [`CopyPasteError::DuplicateDescriptor`] if a contributor with
    /// the same name is already registered.
    pub fn register(&mut self, contributor: Box<dyn DescriptorContributor>) -> Result<(), CopyPasteError> {
        let name = contributor.name();
        if self.contributors.iter().any(|known| known.name() == name) {
            return Err(CopyPasteError::DuplicateDescriptor(name.to_string()));
        }
        trace!(name; "Registered descriptor contributor");
        self.contributors.push(contributor);
        Ok(())
    }

    /// Names of the registered contributors, in invocation order.
    pub fn names(&self) -> Vec<&str> {
        self.contributors.iter().map(|c| c.name()).collect()
    }

    /// Builds the descriptor of `element` by running every contributor.
    pub fn describe(&self, element: &Element, context: &ClosureContext<'_>) -> Descriptor {
        let mut descriptor = Descriptor::new(element.id());
        for contributor in &self.contributors {
            contributor.contribute(element, &mut descriptor, context);
        }
        descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facsimile_core::geometry::Point;

    fn id(name: &str) -> Id {
        Id::new(name)
    }

    fn diagram() -> Diagram {
        Diagram::from_elements(
            None,
            [
                Element::shape(id("parent"), 0.0, 0.0, 300.0, 300.0),
                Element::shape(id("a"), 10.0, 10.0, 50.0, 50.0)
                    .with_parent(id("parent"))
                    .with_attr("name", AttrValue::Text("Task A".into())),
                Element::shape(id("b"), 200.0, 10.0, 50.0, 50.0).with_parent(id("parent")),
                Element::shape(id("boundary"), 40.0, 40.0, 20.0, 20.0).with_host(id("a")),
                Element::connection(
                    id("flow"),
                    id("a"),
                    id("b"),
                    vec![
                        Waypoint::new(60.0, 35.0).with_original(Point::new(35.0, 35.0)),
                        Waypoint::new(200.0, 35.0),
                    ],
                )
                .with_parent(id("parent")),
                Element::label(id("flow_label"), id("flow")).with_position(120.0, 40.0),
                Element::new(id("marker")).with_position(5.0, 5.0).with_size(0.0, 0.0),
            ],
        )
        .unwrap()
    }

    fn describe(diagram: &Diagram, element: &str, closure: &[&str]) -> Descriptor {
        let entries: Vec<_> = closure.iter().map(|name| ClosureEntry::new(id(name), 0)).collect();
        let context = ClosureContext::new(diagram, &entries);
        DescriptorRegistry::new().describe(diagram.element(id(element)).unwrap(), &context)
    }

    #[test]
    fn test_shape_descriptor() {
        let diagram = diagram();
        let descriptor = describe(&diagram, "a", &["parent", "a"]);

        assert_eq!(descriptor.id, id("a"));
        assert_eq!(descriptor.priority, Priority::Shape);
        assert_eq!(descriptor.parent, Some(id("parent")));
        assert_eq!((descriptor.x, descriptor.y), (Some(10.0), Some(10.0)));
        assert_eq!((descriptor.width, descriptor.height), (Some(50.0), Some(50.0)));
        assert_eq!(
            descriptor.attrs.get("name"),
            Some(&AttrValue::Text("Task A".into()))
        );
    }

    #[test]
    fn test_parent_dropped_when_not_copied() {
        let diagram = diagram();
        let descriptor = describe(&diagram, "a", &["a"]);

        assert_eq!(descriptor.parent, None);
    }

    #[test]
    fn test_attacher_priority() {
        let diagram = diagram();
        let descriptor = describe(&diagram, "boundary", &["a", "boundary"]);

        assert_eq!(descriptor.priority, Priority::Attacher);
        assert_eq!(descriptor.host, Some(id("a")));
    }

    #[test]
    fn test_connection_keeps_waypoint_originals() {
        let diagram = diagram();
        let descriptor = describe(&diagram, "flow", &["a", "b", "flow"]);

        assert_eq!(descriptor.priority, Priority::Connection);
        assert!(descriptor.is_connection());
        assert_eq!(descriptor.source, Some(id("a")));
        assert_eq!(descriptor.target, Some(id("b")));
        let waypoints = descriptor.waypoints.unwrap();
        assert_eq!(waypoints[0].original(), Some(Point::new(35.0, 35.0)));
        assert_eq!(descriptor.x, None);
    }

    #[test]
    fn test_label_priority() {
        let diagram = diagram();
        let descriptor = describe(&diagram, "flow_label", &["flow_label"]);

        assert_eq!(descriptor.priority, Priority::Label);
        assert!(descriptor.is_label());
        assert_eq!(descriptor.label_target, Some(id("flow")));
        assert_eq!(descriptor.width, None);
    }

    #[test]
    fn test_zero_width_is_not_copied() {
        let diagram = diagram();
        let descriptor = describe(&diagram, "marker", &["marker"]);

        assert_eq!(descriptor.x, Some(5.0));
        assert_eq!(descriptor.width, None);
        assert_eq!(descriptor.height, None);
    }

    struct Tagger(&'static str);

    impl DescriptorContributor for Tagger {
        fn name(&self) -> &str {
            self.0
        }

        fn contribute(&self, element: &Element, descriptor: &mut Descriptor, context: &ClosureContext<'_>) {
            descriptor
                .attrs
                .insert("copied_with".into(), AttrValue::Number(context.entries().len() as f64));
            if element.host().is_some() {
                descriptor.priority = Priority::Shape;
            }
        }
    }

    #[test]
    fn test_contributors_run_after_base() {
        let diagram = diagram();
        let mut registry = DescriptorRegistry::new();
        registry.register(Box::new(Tagger("tagger"))).unwrap();

        let entries = [ClosureEntry::new(id("a"), 0), ClosureEntry::new(id("boundary"), 0)];
        let context = ClosureContext::new(&diagram, &entries);
        let descriptor = registry.describe(diagram.element(id("boundary")).unwrap(), &context);

        assert_eq!(registry.names(), vec!["base", "tagger"]);
        assert_eq!(descriptor.priority, Priority::Shape);
        assert_eq!(descriptor.attrs.get("copied_with"), Some(&AttrValue::Number(2.0)));
    }

    #[test]
    fn test_duplicate_contributor_is_rejected() {
        let mut registry = DescriptorRegistry::new();
        registry.register(Box::new(Tagger("tagger"))).unwrap();

        let err = registry.register(Box::new(Tagger("tagger"))).unwrap_err();
        assert!(matches!(err, CopyPasteError::DuplicateDescriptor(name) if name == "tagger"));

        let err = registry.register(Box::new(Tagger("base"))).unwrap_err();
        assert!(matches!(err, CopyPasteError::DuplicateDescriptor(name) if name == "base"));
    }

    #[test]
    fn test_priority_serializes_as_number() {
        let descriptor = Descriptor {
            priority: Priority::Connection,
            ..Descriptor::new(id("flow"))
        };

        let text = toml::to_string(&descriptor).unwrap();
        assert!(text.contains("priority = 3"));

        let parsed: Descriptor = toml::from_str(&text).unwrap();
        assert_eq!(parsed, descriptor);
    }
}
