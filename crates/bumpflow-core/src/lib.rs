//! Bumpflow Core Library
//!
//! Data model and interaction logic for the bumpflow dataflow-diagram editor:
//! typed boxes with bumps, stacks built by snapping, and bump-to-bump
//! connections. Platform-agnostic and free of I/O.

pub mod bumps;
pub mod config;
pub mod diagram;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod menu;
pub mod stacking;
pub mod tools;

pub use bumps::{BoxKind, Bump, BumpClass, BumpId};
pub use config::EditorConfig;
pub use diagram::{BoxId, Connection, ConnectionEnd, ConnectionId, Diagram, DiagramBox, Endpoint};
pub use error::{DiagramError, DiagramResult};
pub use export::{BoxRecord, ConnectionRecord, DiagramSnapshot};
pub use input::{MouseButton, PointerEvent};
pub use interaction::{CursorHint, Editor, InteractionState, TransientLine};
pub use menu::{ContextMenu, MenuAction, MenuTarget};
pub use stacking::{DeleteScope, DragUnit, Snap, SnapEdge};
pub use tools::ToolKind;
