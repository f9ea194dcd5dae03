//! Structural snapshot of a diagram, for display and debugging.

use crate::bumps::{BoxKind, BumpId};
use crate::diagram::{BoxId, ConnectionId, Diagram};
use crate::error::DiagramResult;
use serde::Serialize;

/// One box as it appears in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxRecord {
    pub id: BoxId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "type")]
    pub kind: BoxKind,
    pub parent_box: Option<BoxId>,
    pub child_box: Option<BoxId>,
}

/// One connection as it appears in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub id: ConnectionId,
    pub from: BoxId,
    pub from_bump: BumpId,
    pub to: BoxId,
    pub to_bump: BumpId,
}

/// Every box and connection, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagramSnapshot {
    pub boxes: Vec<BoxRecord>,
    pub connections: Vec<ConnectionRecord>,
}

impl DiagramSnapshot {
    pub fn to_json(&self) -> DiagramResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> DiagramResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Diagram {
    /// Capture the current structure.
    pub fn snapshot(&self) -> DiagramSnapshot {
        let boxes = self
            .boxes()
            .map(|b| BoxRecord {
                id: b.id(),
                x: b.origin.x,
                y: b.origin.y,
                width: b.size.width,
                height: b.size.height,
                kind: b.kind,
                parent_box: b.parent(),
                child_box: b.child(),
            })
            .collect();

        let connections = self
            .connections()
            .map(|c| ConnectionRecord {
                id: c.id(),
                from: c.from.box_id,
                from_bump: c.from.bump,
                to: c.to.box_id,
                to_bump: c.to.bump,
            })
            .collect();

        DiagramSnapshot { boxes, connections }
    }
}
