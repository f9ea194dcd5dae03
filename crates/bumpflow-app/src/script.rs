//! Session scripts: recorded toolbar, pointer and menu commands.

use bumpflow_core::{BoxKind, DiagramSnapshot, Editor, MenuAction, MouseButton, PointerEvent};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Script loading errors.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid session script: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One command of a session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Arm the box tool for a kind (1, 2 or 3).
    SelectBoxTool { kind: BoxKind },
    SelectLineTool,
    Press { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Release { x: f64, y: f64 },
    /// Press, move and release in one step.
    Drag { from: [f64; 2], to: [f64; 2] },
    /// Right-click, opening the context menu for whatever is there.
    ContextMenu { x: f64, y: f64 },
    /// Pick an entry from the open context menu.
    Menu { action: MenuAction },
    /// Dismiss the open context menu without picking anything.
    CloseMenu,
    /// Record a snapshot of the diagram as it is now.
    Export,
}

/// Outcome of a replayed session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Snapshots taken by `export` steps, in order.
    pub exports: Vec<DiagramSnapshot>,
    /// The diagram after the last step.
    #[serde(rename = "final")]
    pub final_snapshot: DiagramSnapshot,
}

/// Parse a JSON array of steps.
pub fn parse_script(json: &str) -> Result<Vec<Step>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

/// Apply every step to the editor in order.
pub fn replay(editor: &mut Editor, steps: &[Step]) -> SessionReport {
    let mut exports = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        log::trace!("step {index}: {step:?}");
        match *step {
            Step::SelectBoxTool { kind } => editor.select_box_tool(kind),
            Step::SelectLineTool => editor.select_line_tool(),
            Step::Press { x, y } => {
                editor.handle_pointer_event(PointerEvent::press(Point::new(x, y)))
            }
            Step::Move { x, y } => editor.handle_pointer_event(PointerEvent::Move {
                position: Point::new(x, y),
            }),
            Step::Release { x, y } => {
                editor.handle_pointer_event(PointerEvent::release(Point::new(x, y)))
            }
            Step::Drag { from, to } => {
                let (from, to) = (Point::new(from[0], from[1]), Point::new(to[0], to[1]));
                editor.handle_pointer_event(PointerEvent::press(from));
                editor.handle_pointer_event(PointerEvent::Move { position: to });
                editor.handle_pointer_event(PointerEvent::release(to));
            }
            Step::ContextMenu { x, y } => {
                editor.handle_pointer_event(PointerEvent::Down {
                    position: Point::new(x, y),
                    button: MouseButton::Right,
                });
                match editor.context_menu() {
                    Some(menu) => {
                        let labels: Vec<&str> =
                            menu.items().iter().map(|item| item.label()).collect();
                        log::debug!(
                            "step {index}: menu for {:?} at {:?}: {labels:?}",
                            menu.target(),
                            menu.position()
                        );
                    }
                    None => {
                        log::warn!("step {index}: nothing to open a context menu on at ({x}, {y})")
                    }
                }
            }
            Step::Menu { action } => {
                if !editor.apply_menu_action(action) {
                    log::warn!("step {index}: '{}' had no effect", action.label());
                }
            }
            Step::CloseMenu => editor.close_context_menu(),
            Step::Export => exports.push(editor.export()),
        }
    }

    SessionReport {
        exports,
        final_snapshot: editor.export(),
    }
}
