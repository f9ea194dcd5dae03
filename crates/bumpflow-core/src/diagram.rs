//! Diagram graph store: boxes, connections and stacking links.
//!
//! Boxes live in an arena keyed by [`BoxId`]. Parent/child links are stored
//! as ids, never as references, so removing a box is a plain map removal
//! followed by clearing whichever links pointed at it.

use crate::bumps::{BoxKind, Bump, BumpClass, BumpId, nearest_available_bump};
use crate::config::EditorConfig;
use crate::error::{DiagramError, DiagramResult};
use crate::geometry::{point_segment_distance, rect_contains_inclusive};
use kurbo::{Point, Rect, Size};
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Stable identity of a box. Displayed as `B0`, `B1`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(u64);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

impl Serialize for BoxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Stable identity of a connection. Displayed as `L0`, `L1`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl Serialize for ConnectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A typed box on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramBox {
    id: BoxId,
    /// Top-left corner.
    pub origin: Point,
    pub size: Size,
    pub kind: BoxKind,
    parent: Option<BoxId>,
    child: Option<BoxId>,
}

impl DiagramBox {
    pub fn id(&self) -> BoxId {
        self.id
    }

    /// The box this one is snapped under, if any.
    pub fn parent(&self) -> Option<BoxId> {
        self.parent
    }

    /// The box snapped under this one, if any.
    pub fn child(&self) -> Option<BoxId> {
        self.child
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    pub fn center_x(&self) -> f64 {
        self.origin.x + self.size.width / 2.0
    }

    /// Y coordinate of the bottom edge.
    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.height
    }

    /// All bumps of this box, in declared order.
    pub fn bumps(&self) -> impl Iterator<Item = Bump> {
        self.kind.bumps(self.bounds())
    }

    pub fn bump(&self, id: BumpId) -> Option<Bump> {
        self.kind.bump(id, self.bounds())
    }

    /// Whether a bump of `class` on this box can take a new attachment.
    pub fn accepts_attachment(&self, class: BumpClass) -> bool {
        class.accepts_attachment(self.parent.is_some(), self.child.is_some())
    }

    /// Closest bump to `target` that is free for a new attachment.
    pub fn nearest_available_bump(&self, target: Point) -> Option<Bump> {
        nearest_available_bump(
            self.kind,
            self.bounds(),
            self.parent.is_some(),
            self.child.is_some(),
            target,
        )
    }
}

/// One end of a connection: a bump on a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub box_id: BoxId,
    pub bump: BumpId,
}

impl Endpoint {
    pub fn new(box_id: BoxId, bump: BumpId) -> Self {
        Self { box_id, bump }
    }
}

/// Which end of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionEnd {
    From,
    To,
}

impl ConnectionEnd {
    pub fn opposite(self) -> Self {
        match self {
            ConnectionEnd::From => ConnectionEnd::To,
            ConnectionEnd::To => ConnectionEnd::From,
        }
    }
}

/// A directed line from one bump to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    id: ConnectionId,
    pub from: Endpoint,
    pub to: Endpoint,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn endpoint(&self, end: ConnectionEnd) -> Endpoint {
        match end {
            ConnectionEnd::From => self.from,
            ConnectionEnd::To => self.to,
        }
    }

    /// Whether either end sits on the given box.
    pub fn touches(&self, box_id: BoxId) -> bool {
        self.from.box_id == box_id || self.to.box_id == box_id
    }

    /// Whether this connection occupies a bump of `class` on the given box.
    pub fn occupies(&self, box_id: BoxId, class: BumpClass) -> bool {
        (self.from.box_id == box_id && self.from.bump.class() == class)
            || (self.to.box_id == box_id && self.to.bump.class() == class)
    }
}

/// The diagram graph: every box and connection of the session.
#[derive(Debug, Clone)]
pub struct Diagram {
    boxes: HashMap<BoxId, DiagramBox>,
    /// Creation order of boxes. Later entries are drawn and hit first.
    order: Vec<BoxId>,
    connections: Vec<Connection>,
    next_box: u64,
    next_connection: u64,
    box_size: Size,
    bump_radius: f64,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    /// Create an empty diagram with default box size and bump radius.
    pub fn new() -> Self {
        Self::with_config(&EditorConfig::default())
    }

    /// Create an empty diagram using the sizes from `config`.
    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            boxes: HashMap::new(),
            order: Vec::new(),
            connections: Vec::new(),
            next_box: 0,
            next_connection: 0,
            box_size: config.box_size,
            bump_radius: config.bump_radius,
        }
    }

    pub fn bump_radius(&self) -> f64 {
        self.bump_radius
    }

    /// Place a new box centered on `center`.
    pub fn create_box(&mut self, center: Point, kind: BoxKind) -> BoxId {
        let id = BoxId(self.next_box);
        self.next_box += 1;

        let origin = Point::new(
            center.x - self.box_size.width / 2.0,
            center.y - self.box_size.height / 2.0,
        );
        self.boxes.insert(
            id,
            DiagramBox {
                id,
                origin,
                size: self.box_size,
                kind,
                parent: None,
                child: None,
            },
        );
        self.order.push(id);
        log::debug!("created box {id} ({kind:?}) at {origin:?}");
        id
    }

    /// Record a connection between two bumps.
    ///
    /// No availability check happens here; callers validate first.
    pub fn create_connection(&mut self, from: Endpoint, to: Endpoint) -> ConnectionId {
        let id = ConnectionId(self.next_connection);
        self.next_connection += 1;
        self.connections.push(Connection { id, from, to });
        log::debug!(
            "created connection {id}: {}.{} -> {}.{}",
            from.box_id,
            from.bump,
            to.box_id,
            to.bump
        );
        id
    }

    /// Remove a connection. Absent ids are ignored.
    pub fn delete_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let index = self.connections.iter().position(|c| c.id == id)?;
        log::debug!("deleted connection {id}");
        Some(self.connections.remove(index))
    }

    /// Point one end of a connection at a different bump.
    /// Returns false if the connection does not exist.
    pub fn set_connection_end(
        &mut self,
        id: ConnectionId,
        end: ConnectionEnd,
        endpoint: Endpoint,
    ) -> bool {
        let Some(connection) = self.connections.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        match end {
            ConnectionEnd::From => connection.from = endpoint,
            ConnectionEnd::To => connection.to = endpoint,
        }
        log::debug!(
            "relinked {end:?} end of {id} to {}.{}",
            endpoint.box_id,
            endpoint.bump
        );
        true
    }

    pub fn get_box(&self, id: BoxId) -> Option<&DiagramBox> {
        self.boxes.get(&id)
    }

    pub(crate) fn get_box_mut(&mut self, id: BoxId) -> Option<&mut DiagramBox> {
        self.boxes.get_mut(&id)
    }

    pub fn get_connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Boxes in creation order.
    pub fn boxes(&self) -> impl Iterator<Item = &DiagramBox> {
        self.order.iter().filter_map(|id| self.boxes.get(id))
    }

    /// Connections in creation order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Topmost box whose bounds, grown by `margin`, contain `point`.
    /// Newer boxes win where boxes overlap.
    pub fn box_at(&self, point: Point, margin: f64) -> Option<BoxId> {
        self.order.iter().rev().copied().find(|id| {
            self.boxes
                .get(id)
                .is_some_and(|b| rect_contains_inclusive(b.bounds().inflate(margin, margin), point))
        })
    }

    /// Whether any connection uses a bump of `class` on this box.
    pub fn has_connection_on(&self, box_id: BoxId, class: BumpClass) -> bool {
        self.connections.iter().any(|c| c.occupies(box_id, class))
    }

    /// Whether `endpoint` names an existing bump that can take a new attachment.
    pub fn is_bump_available(&self, endpoint: Endpoint) -> bool {
        self.boxes.get(&endpoint.box_id).is_some_and(|b| {
            b.kind.has_bump(endpoint.bump) && b.accepts_attachment(endpoint.bump.class())
        })
    }

    /// Closest free bump on a box to `target`.
    pub fn nearest_available_bump(&self, box_id: BoxId, target: Point) -> Option<Bump> {
        self.boxes.get(&box_id)?.nearest_available_bump(target)
    }

    /// Tip position of a bump, where lines attach.
    pub fn bump_tip(&self, endpoint: Endpoint) -> Option<Point> {
        let bump = self.boxes.get(&endpoint.box_id)?.bump(endpoint.bump)?;
        Some(bump.tip(self.bump_radius))
    }

    /// Start and end tips of a connection. `None` if either box is gone.
    pub fn connection_segment(&self, id: ConnectionId) -> Option<(Point, Point)> {
        self.segment_of(self.get_connection(id)?)
    }

    fn segment_of(&self, connection: &Connection) -> Option<(Point, Point)> {
        Some((self.bump_tip(connection.from)?, self.bump_tip(connection.to)?))
    }

    /// First connection whose segment passes within `tolerance` of `point`.
    pub fn connection_at(&self, point: Point, tolerance: f64) -> Option<ConnectionId> {
        self.connections.iter().find_map(|c| {
            let (start, end) = self.segment_of(c)?;
            (point_segment_distance(point, start, end) < tolerance).then_some(c.id)
        })
    }

    /// First connection with an end tip within `radius` of `point`.
    /// The `from` tip is checked before the `to` tip of the same connection.
    pub fn connection_end_at(
        &self,
        point: Point,
        radius: f64,
    ) -> Option<(ConnectionId, ConnectionEnd)> {
        self.connections.iter().find_map(|c| {
            let (start, end) = self.segment_of(c)?;
            if point.distance(start) < radius {
                Some((c.id, ConnectionEnd::From))
            } else if point.distance(end) < radius {
                Some((c.id, ConnectionEnd::To))
            } else {
                None
            }
        })
    }

    /// The full stack containing `id`, ordered top to bottom.
    /// Empty if the box does not exist.
    pub fn stack_of(&self, id: BoxId) -> Vec<BoxId> {
        let Some(mut top) = self.boxes.get(&id) else {
            return Vec::new();
        };
        while let Some(parent) = top.parent.and_then(|p| self.boxes.get(&p)) {
            top = parent;
        }

        let mut stack = vec![top.id];
        let mut current = top;
        while let Some(child) = current.child.and_then(|c| self.boxes.get(&c)) {
            stack.push(child.id);
            current = child;
        }
        stack
    }

    /// `id` followed by every box below it in its stack.
    pub fn chain_from(&self, id: BoxId) -> Vec<BoxId> {
        let mut chain = Vec::new();
        let mut current = self.boxes.get(&id);
        while let Some(b) = current {
            chain.push(b.id);
            current = b.child.and_then(|c| self.boxes.get(&c));
        }
        chain
    }

    pub(crate) fn set_link(&mut self, parent: BoxId, child: BoxId) {
        if let Some(p) = self.boxes.get_mut(&parent) {
            p.child = Some(child);
        }
        if let Some(c) = self.boxes.get_mut(&child) {
            c.parent = Some(parent);
        }
    }

    /// Cut the link between `parent` and its child, on both sides.
    pub(crate) fn cut_below(&mut self, parent: BoxId) {
        let child = self.boxes.get_mut(&parent).and_then(|p| p.child.take());
        if let Some(c) = child.and_then(|c| self.boxes.get_mut(&c)) {
            c.parent = None;
        }
    }

    /// Remove a box record and every connection touching it.
    /// Links on neighbouring boxes must already be cleared.
    pub(crate) fn remove_box(&mut self, id: BoxId) -> Option<DiagramBox> {
        let removed = self.boxes.remove(&id)?;
        self.order.retain(|&b| b != id);
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(id));
        log::debug!(
            "removed box {id}, pruned {} connection(s)",
            before - self.connections.len()
        );
        Some(removed)
    }

    /// Verify link symmetry, acyclicity and that connections only
    /// reference existing boxes.
    pub fn check_integrity(&self) -> DiagramResult<()> {
        for b in self.boxes() {
            if let Some(child_id) = b.child {
                let child = self.boxes.get(&child_id).ok_or(DiagramError::DanglingLink {
                    from: b.id,
                    missing: child_id,
                })?;
                if child.parent != Some(b.id) {
                    return Err(DiagramError::AsymmetricLink {
                        parent: b.id,
                        child: child_id,
                    });
                }
            }
            if let Some(parent_id) = b.parent {
                let parent = self.boxes.get(&parent_id).ok_or(DiagramError::DanglingLink {
                    from: b.id,
                    missing: parent_id,
                })?;
                if parent.child != Some(b.id) {
                    return Err(DiagramError::AsymmetricLink {
                        parent: parent_id,
                        child: b.id,
                    });
                }
            }

            // Walk upwards; revisiting a box means a loop.
            let mut seen = HashSet::from([b.id]);
            let mut current = b.parent;
            while let Some(id) = current {
                if !seen.insert(id) {
                    return Err(DiagramError::Cycle(b.id));
                }
                current = self.boxes.get(&id).and_then(|p| p.parent);
            }
        }

        for c in &self.connections {
            for endpoint in [c.from, c.to] {
                if !self.boxes.contains_key(&endpoint.box_id) {
                    return Err(DiagramError::DanglingConnection {
                        connection: c.id,
                        missing: endpoint.box_id,
                    });
                }
            }
        }
        Ok(())
    }
}
