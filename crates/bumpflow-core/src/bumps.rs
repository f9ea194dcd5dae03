//! Bump layout per box kind, and the rules for attaching to bumps.
//!
//! Bumps are never stored. They are derived from a box's kind and bounds
//! every time they are needed, so they always follow the box around.

use crate::geometry::nearest_by_distance;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of box kinds. The kind decides which bumps a box has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BoxKind {
    /// Two top bumps and one bottom bump. Can never be stacked under another box.
    T1,
    /// One top bump and one bottom bump.
    T2,
    /// One top bump, one bottom bump and a right-hand bump for side connections.
    T3,
}

impl BoxKind {
    /// All kinds, in toolbar order.
    pub const ALL: [BoxKind; 3] = [BoxKind::T1, BoxKind::T2, BoxKind::T3];

    /// Toolbar number of this kind (1, 2 or 3).
    pub fn number(self) -> u8 {
        match self {
            BoxKind::T1 => 1,
            BoxKind::T2 => 2,
            BoxKind::T3 => 3,
        }
    }

    /// Look up a kind by its toolbar number.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(BoxKind::T1),
            2 => Some(BoxKind::T2),
            3 => Some(BoxKind::T3),
            _ => None,
        }
    }

    /// The declared bump layout for this kind, in tie-break order.
    pub fn bump_slots(self) -> &'static [BumpSlot] {
        match self {
            BoxKind::T1 => T1_BUMPS,
            BoxKind::T2 => T2_BUMPS,
            BoxKind::T3 => T3_BUMPS,
        }
    }

    /// Whether a box of this kind may ever gain a parent link.
    ///
    /// Only kinds with exactly one top bump can be snapped under another box.
    pub fn accepts_parent(self) -> bool {
        self.bump_slots()
            .iter()
            .filter(|slot| slot.id.class() == BumpClass::Top)
            .count()
            == 1
    }

    /// Whether this kind declares the given bump.
    pub fn has_bump(self, id: BumpId) -> bool {
        self.bump_slots().iter().any(|slot| slot.id == id)
    }

    /// Resolve every bump of this kind against concrete box bounds.
    pub fn bumps(self, bounds: Rect) -> impl Iterator<Item = Bump> {
        self.bump_slots().iter().map(move |slot| slot.resolve(bounds))
    }

    /// Resolve a single bump, if this kind declares it.
    pub fn bump(self, id: BumpId, bounds: Rect) -> Option<Bump> {
        self.bump_slots()
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| slot.resolve(bounds))
    }
}

impl TryFrom<u8> for BoxKind {
    type Error = String;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        BoxKind::from_number(number).ok_or_else(|| format!("unknown box type {number}"))
    }
}

impl From<BoxKind> for u8 {
    fn from(kind: BoxKind) -> Self {
        kind.number()
    }
}

/// Classification of a bump. Decides its outward direction and availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BumpClass {
    Top,
    Bottom,
    Right,
}

impl BumpClass {
    /// Unit vector pointing away from the box.
    pub fn normal(self) -> Vec2 {
        match self {
            BumpClass::Top => Vec2::new(0.0, -1.0),
            BumpClass::Bottom => Vec2::new(0.0, 1.0),
            BumpClass::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Whether a bump of this class can take a new attachment, given the
    /// owning box's current stacking links.
    pub fn accepts_attachment(self, has_parent: bool, has_child: bool) -> bool {
        match self {
            BumpClass::Top => !has_parent,
            BumpClass::Bottom => !has_child,
            BumpClass::Right => true,
        }
    }
}

/// Name of a bump slot. Each name belongs to exactly one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BumpId {
    TopLeft,
    TopRight,
    Top,
    Bottom,
    Right,
}

impl BumpId {
    pub fn class(self) -> BumpClass {
        match self {
            BumpId::TopLeft | BumpId::TopRight | BumpId::Top => BumpClass::Top,
            BumpId::Bottom => BumpClass::Bottom,
            BumpId::Right => BumpClass::Right,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BumpId::TopLeft => "top-left",
            BumpId::TopRight => "top-right",
            BumpId::Top => "top",
            BumpId::Bottom => "bottom",
            BumpId::Right => "right",
        }
    }
}

impl fmt::Display for BumpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of a bump: its name and where it sits on the box,
/// as fractions of width and height from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BumpSlot {
    pub id: BumpId,
    pub anchor: (f64, f64),
}

impl BumpSlot {
    const fn new(id: BumpId, fx: f64, fy: f64) -> Self {
        Self {
            id,
            anchor: (fx, fy),
        }
    }

    fn resolve(&self, bounds: Rect) -> Bump {
        let (fx, fy) = self.anchor;
        Bump {
            id: self.id,
            class: self.id.class(),
            anchor: Point::new(
                bounds.x0 + bounds.width() * fx,
                bounds.y0 + bounds.height() * fy,
            ),
        }
    }
}

const T1_BUMPS: &[BumpSlot] = &[
    BumpSlot::new(BumpId::TopLeft, 0.3, 0.0),
    BumpSlot::new(BumpId::TopRight, 0.7, 0.0),
    BumpSlot::new(BumpId::Bottom, 0.5, 1.0),
];

const T2_BUMPS: &[BumpSlot] = &[
    BumpSlot::new(BumpId::Top, 0.5, 0.0),
    BumpSlot::new(BumpId::Bottom, 0.5, 1.0),
];

const T3_BUMPS: &[BumpSlot] = &[
    BumpSlot::new(BumpId::Top, 0.5, 0.0),
    BumpSlot::new(BumpId::Bottom, 0.5, 1.0),
    BumpSlot::new(BumpId::Right, 1.0, 0.5),
];

/// A bump resolved against a concrete box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bump {
    pub id: BumpId,
    pub class: BumpClass,
    /// Point on the box edge the bump is centered on.
    pub anchor: Point,
}

impl Bump {
    /// The outer tip of the bump, where connection lines attach.
    pub fn tip(&self, radius: f64) -> Point {
        self.anchor + self.class.normal() * radius
    }
}

/// Closest bump to `target` that can take a new attachment.
///
/// Returns `None` when every bump of the box is occupied.
pub fn nearest_available_bump(
    kind: BoxKind,
    bounds: Rect,
    has_parent: bool,
    has_child: bool,
    target: Point,
) -> Option<Bump> {
    let available: Vec<Bump> = kind
        .bumps(bounds)
        .filter(|bump| bump.class.accepts_attachment(has_parent, has_child))
        .collect();
    nearest_by_distance(target, available.iter().map(|bump| bump.anchor)).map(|i| available[i])
}
