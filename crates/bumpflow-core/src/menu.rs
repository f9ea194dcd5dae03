//! Context menu model: what was right-clicked and which actions it offers.

use crate::diagram::{BoxId, ConnectionId, Diagram};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// The entity a context menu was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    Box(BoxId),
    Line(ConnectionId),
}

/// A context menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    DeleteLine,
    DeleteBox,
    DeleteBoxAndBelow,
}

impl MenuAction {
    pub fn label(self) -> &'static str {
        match self {
            MenuAction::DeleteLine => "Delete line",
            MenuAction::DeleteBox => "Delete box",
            MenuAction::DeleteBoxAndBelow => "Delete box and below",
        }
    }
}

/// An open context menu.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    target: MenuTarget,
    position: Point,
    items: Vec<MenuAction>,
}

impl ContextMenu {
    /// Resolve the menu for a right-click at `point`.
    ///
    /// Lines are hit before boxes. Returns `None` over empty canvas.
    pub fn resolve(diagram: &Diagram, point: Point, line_tolerance: f64) -> Option<Self> {
        if let Some(line) = diagram.connection_at(point, line_tolerance) {
            return Some(Self {
                target: MenuTarget::Line(line),
                position: point,
                items: vec![MenuAction::DeleteLine],
            });
        }

        let box_id = diagram.box_at(point, 0.0)?;
        let items = if diagram.stack_of(box_id).len() > 1 {
            vec![MenuAction::DeleteBox, MenuAction::DeleteBoxAndBelow]
        } else {
            vec![MenuAction::DeleteBox]
        };
        Some(Self {
            target: MenuTarget::Box(box_id),
            position: point,
            items,
        })
    }

    pub fn target(&self) -> MenuTarget {
        self.target
    }

    /// Where the menu was opened, in canvas coordinates.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn items(&self) -> &[MenuAction] {
        &self.items
    }

    pub fn offers(&self, action: MenuAction) -> bool {
        self.items.contains(&action)
    }
}
