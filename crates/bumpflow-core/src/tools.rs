//! Toolbar tools.

use crate::bumps::BoxKind;
use serde::{Deserialize, Serialize};

/// A tool that can be armed from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Place one box of the given kind on the next press.
    PlaceBox(BoxKind),
    /// Draw a connection from bump to bump.
    Line,
}

impl ToolKind {
    /// Toolbar label.
    pub fn label(self) -> &'static str {
        match self {
            ToolKind::PlaceBox(BoxKind::T1) => "Box (type 1)",
            ToolKind::PlaceBox(BoxKind::T2) => "Box (type 2)",
            ToolKind::PlaceBox(BoxKind::T3) => "Box (type 3)",
            ToolKind::Line => "Line",
        }
    }

    /// Every tool in toolbar order.
    pub fn all() -> impl Iterator<Item = ToolKind> {
        BoxKind::ALL
            .into_iter()
            .map(ToolKind::PlaceBox)
            .chain(std::iter::once(ToolKind::Line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolbar_order() {
        let tools: Vec<ToolKind> = ToolKind::all().collect();
        assert_eq!(tools.len(), 4);
        assert_eq!(tools[0], ToolKind::PlaceBox(BoxKind::T1));
        assert_eq!(tools[3], ToolKind::Line);
        assert_eq!(tools[2].label(), "Box (type 3)");
    }
}
