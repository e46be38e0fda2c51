//! Diagram elements and the relations between them.
//!
//! An [`Element`] is a shape, a connection or a label. Elements reference each
//! other by [`Id`] only:
//!
//! - *Forward* relations ([`Relation`]) are set on the element itself:
//!   `parent`, `host`, `source`, `target` and `label_target`.
//! - *Inverse* relations are kept on the referenced element: `children`,
//!   `attachers`, `outgoing`, `incoming` and `labels`. They are maintained by
//!   the owner of the elements through [`Element::add_dependent`] and
//!   [`Element::remove_dependent`], never set directly.
//!
//! Only `parent` → `children` expresses ownership. Every other relation is a
//! plain reference.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Bounds, Point, Size, bounding_box},
    identifier::Id,
};

/// A connection bend point.
///
/// `original` optionally records the point the user actually docked the
/// connection at, before layouting snapped it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    x: f32,
    y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original: Option<Point>,
}

impl Waypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            original: None,
        }
    }

    /// Returns the waypoint with its original docking point set.
    pub fn with_original(mut self, original: Point) -> Self {
        self.original = Some(original);
        self
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn original(&self) -> Option<Point> {
        self.original
    }

    /// Returns the waypoint position as a [`Point`].
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Free-form business attribute attached to an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// A forward reference from one element to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Parent,
    Host,
    Source,
    Target,
    LabelTarget,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parent => "parent",
            Self::Host => "host",
            Self::Source => "source",
            Self::Target => "target",
            Self::LabelTarget => "label target",
        };
        f.write_str(name)
    }
}

/// Structural kind of an element, derived from the relations it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Shape,
    Connection,
    Label,
}

/// A node of the diagram containment graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    id: Id,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<Id>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    host: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    waypoints: Option<Vec<Waypoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label_target: Option<Id>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: BTreeMap<String, AttrValue>,

    #[serde(skip)]
    children: Vec<Id>,
    #[serde(skip)]
    attachers: Vec<Id>,
    #[serde(skip)]
    labels: Vec<Id>,
    #[serde(skip)]
    incoming: Vec<Id>,
    #[serde(skip)]
    outgoing: Vec<Id>,
}

impl Element {
    /// Creates a bare element without geometry or relations.
    pub fn new(id: Id) -> Self {
        Self {
            id,
            parent: None,
            x: None,
            y: None,
            width: None,
            height: None,
            host: None,
            source: None,
            target: None,
            waypoints: None,
            label_target: None,
            attrs: BTreeMap::new(),
            children: Vec::new(),
            attachers: Vec::new(),
            labels: Vec::new(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Creates a shape with position and size.
    ///
    /// # Examples
    ///
    /// ```
    /// use facsimile_core::{Element, ElementKind, Id};
    ///
    /// let shape = Element::shape(Id::new("task"), 10.0, 20.0, 100.0, 80.0);
    /// assert_eq!(shape.kind(), ElementKind::Shape);
    /// assert_eq!(shape.bounds().center().x(), 60.0);
    /// ```
    pub fn shape(id: Id, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(id).with_position(x, y).with_size(width, height)
    }

    /// Creates a connection between `source` and `target`.
    pub fn connection(id: Id, source: Id, target: Id, waypoints: Vec<Waypoint>) -> Self {
        let mut element = Self::new(id);
        element.source = Some(source);
        element.target = Some(target);
        element.waypoints = Some(waypoints);
        element
    }

    /// Creates a label annotating `label_target`.
    pub fn label(id: Id, label_target: Id) -> Self {
        let mut element = Self::new(id);
        element.label_target = Some(label_target);
        element
    }

    pub fn with_parent(mut self, parent: Id) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_host(mut self, host: Id) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn x(&self) -> Option<f32> {
        self.x
    }

    pub fn y(&self) -> Option<f32> {
        self.y
    }

    pub fn width(&self) -> Option<f32> {
        self.width
    }

    pub fn height(&self) -> Option<f32> {
        self.height
    }

    pub fn host(&self) -> Option<Id> {
        self.host
    }

    pub fn source(&self) -> Option<Id> {
        self.source
    }

    pub fn target(&self) -> Option<Id> {
        self.target
    }

    pub fn waypoints(&self) -> Option<&[Waypoint]> {
        self.waypoints.as_deref()
    }

    pub fn label_target(&self) -> Option<Id> {
        self.label_target
    }

    pub fn attrs(&self) -> &BTreeMap<String, AttrValue> {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    pub fn attrs_mut(&mut self) -> &mut BTreeMap<String, AttrValue> {
        &mut self.attrs
    }

    pub fn children(&self) -> &[Id] {
        &self.children
    }

    pub fn attachers(&self) -> &[Id] {
        &self.attachers
    }

    pub fn labels(&self) -> &[Id] {
        &self.labels
    }

    pub fn incoming(&self) -> &[Id] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[Id] {
        &self.outgoing
    }

    pub fn set_parent(&mut self, parent: Option<Id>) {
        self.parent = parent;
    }

    pub fn set_host(&mut self, host: Option<Id>) {
        self.host = host;
    }

    pub fn set_source(&mut self, source: Option<Id>) {
        self.source = source;
    }

    pub fn set_target(&mut self, target: Option<Id>) {
        self.target = target;
    }

    pub fn set_label_target(&mut self, label_target: Option<Id>) {
        self.label_target = label_target;
    }

    pub fn set_position(&mut self, x: Option<f32>, y: Option<f32>) {
        self.x = x;
        self.y = y;
    }

    pub fn set_size(&mut self, width: Option<f32>, height: Option<f32>) {
        self.width = width;
        self.height = height;
    }

    pub fn set_waypoints(&mut self, waypoints: Option<Vec<Waypoint>>) {
        self.waypoints = waypoints;
    }

    /// Returns the structural kind of the element.
    ///
    /// Waypoints make a connection, a label target makes a label.
    pub fn kind(&self) -> ElementKind {
        if self.waypoints.is_some() {
            ElementKind::Connection
        } else if self.label_target.is_some() {
            ElementKind::Label
        } else {
            ElementKind::Shape
        }
    }

    pub fn is_connection(&self) -> bool {
        self.kind() == ElementKind::Connection
    }

    pub fn is_label(&self) -> bool {
        self.label_target.is_some()
    }

    /// Returns the position, treating a missing coordinate as `0`.
    pub fn position(&self) -> Point {
        Point::new(self.x.unwrap_or(0.0), self.y.unwrap_or(0.0))
    }

    /// Returns every forward relation the element declares.
    pub fn relations(&self) -> Vec<(Relation, Id)> {
        [
            (Relation::Parent, self.parent),
            (Relation::Host, self.host),
            (Relation::Source, self.source),
            (Relation::Target, self.target),
            (Relation::LabelTarget, self.label_target),
        ]
        .into_iter()
        .filter_map(|(relation, id)| id.map(|id| (relation, id)))
        .collect()
    }

    /// Records `dependent` as pointing at this element through `relation`.
    pub fn add_dependent(&mut self, relation: Relation, dependent: Id) {
        let list = self.dependents_mut(relation);
        if !list.contains(&dependent) {
            list.push(dependent);
        }
    }

    /// Forgets `dependent` for `relation`.
    pub fn remove_dependent(&mut self, relation: Relation, dependent: Id) {
        self.dependents_mut(relation).retain(|id| *id != dependent);
    }

    /// Returns `true` if any other element still points at this one.
    pub fn has_dependents(&self) -> bool {
        !(self.children.is_empty()
            && self.attachers.is_empty()
            && self.labels.is_empty()
            && self.incoming.is_empty()
            && self.outgoing.is_empty())
    }

    fn dependents_mut(&mut self, relation: Relation) -> &mut Vec<Id> {
        match relation {
            Relation::Parent => &mut self.children,
            Relation::Host => &mut self.attachers,
            Relation::Source => &mut self.outgoing,
            Relation::Target => &mut self.incoming,
            Relation::LabelTarget => &mut self.labels,
        }
    }

    /// Returns the bounds of the element.
    ///
    /// Connections are measured by their waypoints; everything else by its
    /// position and size, with missing values read as `0`.
    pub fn bounds(&self) -> Bounds {
        if let Some(waypoints) = self.waypoints.as_deref() {
            let points = waypoints.iter().map(|wp| Bounds::from_point(wp.point()));
            if let Some(bounds) = bounding_box(points) {
                return bounds;
            }
        }

        Bounds::new_from_top_left(
            self.position(),
            Size::new(self.width.unwrap_or(0.0), self.height.unwrap_or(0.0)),
        )
    }

    /// Moves the element and all of its waypoints by `offset`.
    ///
    /// Coordinates that are not set stay unset. Waypoints lose their
    /// `original` docking hint.
    pub fn translate(&mut self, offset: Point) {
        if let Some(x) = self.x.as_mut() {
            *x += offset.x();
        }
        if let Some(y) = self.y.as_mut() {
            *y += offset.y();
        }
        if let Some(waypoints) = self.waypoints.as_mut() {
            for waypoint in waypoints.iter_mut() {
                *waypoint = Waypoint::new(waypoint.x + offset.x(), waypoint.y + offset.y());
            }
        }
    }
}
