//! Stacking engine: drag grouping, snap-on-release and structural deletes.
//!
//! A stack is a chain of boxes joined by parent/child links. Links are only
//! created here (by a snap) and only removed here (by a drag split or a
//! delete), which keeps every stack a simple top-to-bottom chain.

use crate::bumps::BumpClass;
use crate::config::EditorConfig;
use crate::diagram::{BoxId, Diagram};
use kurbo::{Point, Vec2};

/// The boxes that move together during one drag, ordered top to bottom.
///
/// Only [`Diagram::begin_drag`] creates one, so the first box never has a
/// parent and the last box never has a child.
#[derive(Debug, Clone, PartialEq)]
pub struct DragUnit {
    boxes: Vec<BoxId>,
}

impl DragUnit {
    pub fn boxes(&self) -> &[BoxId] {
        &self.boxes
    }

    pub fn top(&self) -> BoxId {
        self.boxes[0]
    }

    pub fn bottom(&self) -> BoxId {
        self.boxes[self.boxes.len() - 1]
    }

    pub fn contains(&self, id: BoxId) -> bool {
        self.boxes.contains(&id)
    }
}

/// Which edge of the dragged unit a snap attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapEdge {
    /// The unit's top box went under a resting box.
    Top,
    /// A resting box went under the unit's bottom box.
    Bottom,
}

/// A committed (or proposed) stacking link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snap {
    pub parent: BoxId,
    pub child: BoxId,
    pub edge: SnapEdge,
}

/// How much of a stack a delete removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    /// Remove only the box; its parent and child are spliced together.
    BoxOnly,
    /// Remove the box and everything stacked below it.
    BoxAndBelow,
}

impl Diagram {
    /// Work out what moves when `clicked` is grabbed.
    ///
    /// Grabbing the top of a stack drags the whole stack. Grabbing any other
    /// box splits the stack right above it, permanently, and drags the lower
    /// part.
    pub fn begin_drag(&mut self, clicked: BoxId) -> Option<DragUnit> {
        let stack = self.stack_of(clicked);
        let index = stack.iter().position(|&id| id == clicked)?;
        if index > 0 {
            self.cut_below(stack[index - 1]);
            log::debug!("split stack between {} and {clicked}", stack[index - 1]);
        }
        Some(DragUnit {
            boxes: stack[index..].to_vec(),
        })
    }

    /// Move every box of the unit by the same offset.
    pub fn translate(&mut self, unit: &DragUnit, delta: Vec2) {
        for &id in &unit.boxes {
            if let Some(b) = self.get_box_mut(id) {
                b.origin += delta;
            }
        }
    }

    /// Move the unit rigidly so that its top box sits at `top_origin`.
    pub fn move_unit_to(&mut self, unit: &DragUnit, top_origin: Point) {
        let Some(top) = self.get_box(unit.top()) else {
            return;
        };
        let delta = top_origin - top.origin;
        self.translate(unit, delta);
    }

    /// Find the snap a release would commit, without changing anything.
    ///
    /// Candidates are scanned in creation order and the first geometric
    /// match wins, even if a later candidate is closer.
    pub fn find_snap(&self, unit: &DragUnit, config: &EditorConfig) -> Option<Snap> {
        let within = |gap: f64, offset: f64| {
            gap.abs() < config.snap_distance && offset.abs() < config.align_tolerance
        };

        let top = self.get_box(unit.top())?;
        if top.kind.accepts_parent()
            && top.parent().is_none()
            && !self.has_connection_on(top.id(), BumpClass::Top)
        {
            let found = self.boxes().find(|candidate| {
                !unit.contains(candidate.id())
                    && candidate.child().is_none()
                    && !self.has_connection_on(candidate.id(), BumpClass::Bottom)
                    && within(
                        candidate.bottom() - top.origin.y,
                        candidate.center_x() - top.center_x(),
                    )
            });
            if let Some(candidate) = found {
                return Some(Snap {
                    parent: candidate.id(),
                    child: top.id(),
                    edge: SnapEdge::Top,
                });
            }
        }

        // Only kinds that can be stacked themselves start a snap from below.
        let bottom = self.get_box(unit.bottom())?;
        if bottom.kind.accepts_parent()
            && bottom.child().is_none()
            && !self.has_connection_on(bottom.id(), BumpClass::Bottom)
        {
            let found = self.boxes().find(|candidate| {
                !unit.contains(candidate.id())
                    && candidate.parent().is_none()
                    && candidate.kind.accepts_parent()
                    && !self.has_connection_on(candidate.id(), BumpClass::Top)
                    && within(
                        bottom.bottom() - candidate.origin.y,
                        bottom.center_x() - candidate.center_x(),
                    )
            });
            if let Some(candidate) = found {
                return Some(Snap {
                    parent: bottom.id(),
                    child: candidate.id(),
                    edge: SnapEdge::Bottom,
                });
            }
        }

        None
    }

    /// Attempt at most one snap for a released unit. Nothing moves when no
    /// candidate qualifies.
    pub fn try_snap(&mut self, unit: &DragUnit, config: &EditorConfig) -> Option<Snap> {
        let snap = self.find_snap(unit, config)?;
        self.attach(snap.parent, snap.child);
        log::debug!(
            "snapped {} under {} ({:?} edge)",
            snap.child,
            snap.parent,
            snap.edge
        );
        Some(snap)
    }

    /// Link `child` under `parent` and pull the child's chain into place.
    fn attach(&mut self, parent: BoxId, child: BoxId) {
        self.set_link(parent, child);
        self.align_below(parent);
    }

    /// Re-seat every box below `parent`: horizontally centered on the box
    /// above, top edge flush with its bottom edge.
    pub(crate) fn align_below(&mut self, parent: BoxId) {
        let mut current = parent;
        loop {
            let Some(above) = self.get_box(current) else {
                return;
            };
            let Some(child_id) = above.child() else {
                return;
            };
            let (x, width, bottom) = (above.origin.x, above.size.width, above.bottom());
            let Some(child) = self.get_box_mut(child_id) else {
                return;
            };
            child.origin = Point::new(x + (width - child.size.width) / 2.0, bottom);
            current = child_id;
        }
    }

    /// Delete a box according to `scope`, pruning every connection that
    /// touched a removed box. Returns the removed ids, top to bottom.
    pub fn delete_box(&mut self, id: BoxId, scope: DeleteScope) -> Vec<BoxId> {
        let Some(target) = self.get_box(id) else {
            return Vec::new();
        };
        let (parent, child) = (target.parent(), target.child());

        let doomed = match scope {
            DeleteScope::BoxAndBelow => {
                let chain = self.chain_from(id);
                if let Some(parent) = parent {
                    self.cut_below(parent);
                }
                chain
            }
            DeleteScope::BoxOnly => {
                match (parent, child) {
                    (Some(parent), Some(child)) => {
                        self.set_link(parent, child);
                        self.align_below(parent);
                    }
                    _ => {
                        if let Some(parent) = parent {
                            self.cut_below(parent);
                        }
                        if child.is_some() {
                            self.cut_below(id);
                        }
                    }
                }
                vec![id]
            }
        };

        for &doomed_id in &doomed {
            self.remove_box(doomed_id);
        }
        log::debug!("deleted {} box(es) starting at {id} ({scope:?})", doomed.len());
        doomed
    }
}
