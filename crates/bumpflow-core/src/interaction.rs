//! Interaction state machine: turns pointer events and toolbar/menu commands
//! into diagram mutations.
//!
//! Exactly one [`InteractionState`] is active at a time. Every gesture that
//! starts on press ends on release, and release always returns to idle.

use crate::bumps::BoxKind;
use crate::config::EditorConfig;
use crate::diagram::{BoxId, ConnectionEnd, ConnectionId, Diagram, Endpoint};
use crate::export::DiagramSnapshot;
use crate::input::{MouseButton, PointerEvent};
use crate::menu::{ContextMenu, MenuAction, MenuTarget};
use crate::stacking::{DeleteScope, DragUnit};
use crate::tools::ToolKind;
use kurbo::{Point, Vec2};

/// Cursor the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Crosshair,
    Move,
    Pointer,
}

/// The single active interaction mode.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// A tool is selected and waiting for a press.
    ToolArmed(ToolKind),
    /// A stack (or the lower part of a split stack) follows the pointer.
    DraggingStack {
        unit: DragUnit,
        /// Pointer position relative to the unit's top box origin.
        grab_offset: Vec2,
    },
    /// One end of an existing connection follows the pointer.
    DraggingEndpoint {
        connection: ConnectionId,
        end: ConnectionEnd,
        pointer: Point,
    },
    /// A new connection has a start bump and follows the pointer.
    PendingConnection { from: Endpoint, pointer: Point },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Whether a press started a gesture that is still in progress.
    pub fn is_gesture(&self) -> bool {
        matches!(
            self,
            InteractionState::DraggingStack { .. }
                | InteractionState::DraggingEndpoint { .. }
                | InteractionState::PendingConnection { .. }
        )
    }
}

/// A line that is being drawn or re-routed, for render adapters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransientLine {
    pub start: Point,
    pub end: Point,
    /// Set when an existing connection's endpoint is being dragged.
    pub connection: Option<ConnectionId>,
}

/// The editor session: the diagram plus the interaction around it.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    diagram: Diagram,
    config: EditorConfig,
    state: InteractionState,
    context_menu: Option<ContextMenu>,
    /// Last known pointer position, for hover cursors.
    pointer: Option<Point>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            diagram: Diagram::with_config(&config),
            config,
            state: InteractionState::Idle,
            context_menu: None,
            pointer: None,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    /// Arm a toolbar tool, replacing whatever mode was active.
    pub fn select_tool(&mut self, tool: ToolKind) {
        log::trace!("tool armed: {tool:?}");
        self.context_menu = None;
        self.state = InteractionState::ToolArmed(tool);
    }

    pub fn select_box_tool(&mut self, kind: BoxKind) {
        self.select_tool(ToolKind::PlaceBox(kind));
    }

    pub fn select_line_tool(&mut self) {
        self.select_tool(ToolKind::Line);
    }

    /// Currently armed tool, if any.
    pub fn active_tool(&self) -> Option<ToolKind> {
        match self.state {
            InteractionState::ToolArmed(tool) => Some(tool),
            _ => None,
        }
    }

    /// Dispatch a raw pointer event. Right-button presses open the context
    /// menu; middle-button events are ignored.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => self.press(position),
            PointerEvent::Down {
                position,
                button: MouseButton::Right,
            } => {
                self.open_context_menu(position);
            }
            PointerEvent::Up {
                position,
                button: MouseButton::Left,
            } => self.release(position),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Down { .. } | PointerEvent::Up { .. } => {}
        }
    }

    /// Primary-button press.
    pub fn press(&mut self, point: Point) {
        self.pointer = Some(point);
        self.context_menu = None;

        match self.state {
            InteractionState::ToolArmed(ToolKind::PlaceBox(kind)) => {
                self.diagram.create_box(point, kind);
                self.state = InteractionState::Idle;
            }
            InteractionState::ToolArmed(ToolKind::Line) => {
                if let Some(from) = self.endpoint_under(point) {
                    log::trace!("pending connection from {}.{}", from.box_id, from.bump);
                    self.state = InteractionState::PendingConnection {
                        from,
                        pointer: point,
                    };
                }
            }
            InteractionState::Idle => self.begin_idle_press(point),
            // A press while a gesture is running has nothing to start.
            _ => {}
        }
    }

    fn begin_idle_press(&mut self, point: Point) {
        if let Some((connection, end)) = self
            .diagram
            .connection_end_at(point, self.config.endpoint_grab_radius)
        {
            log::trace!("dragging {end:?} end of {connection}");
            self.state = InteractionState::DraggingEndpoint {
                connection,
                end,
                pointer: point,
            };
            return;
        }

        let Some(clicked) = self.diagram.box_at(point, 0.0) else {
            return;
        };
        let Some(unit) = self.diagram.begin_drag(clicked) else {
            return;
        };
        let Some(top) = self.diagram.get_box(unit.top()) else {
            return;
        };
        let grab_offset = point - top.origin;
        log::trace!("dragging {} box(es) from {clicked}", unit.boxes().len());
        self.state = InteractionState::DraggingStack { unit, grab_offset };
    }

    /// Pointer motion, with or without a button held.
    pub fn pointer_move(&mut self, point: Point) {
        self.pointer = Some(point);
        match &mut self.state {
            InteractionState::DraggingStack { unit, grab_offset } => {
                self.diagram.move_unit_to(unit, point - *grab_offset);
            }
            InteractionState::DraggingEndpoint { pointer, .. }
            | InteractionState::PendingConnection { pointer, .. } => {
                *pointer = point;
            }
            InteractionState::Idle | InteractionState::ToolArmed(_) => {}
        }
    }

    /// Primary-button release. Ends any gesture and returns to idle.
    pub fn release(&mut self, point: Point) {
        self.pointer = Some(point);
        match std::mem::take(&mut self.state) {
            InteractionState::DraggingStack { unit, .. } => {
                self.diagram.try_snap(&unit, &self.config);
            }
            InteractionState::DraggingEndpoint {
                connection, end, ..
            } => self.relink_endpoint(connection, end, point),
            InteractionState::PendingConnection { from, .. } => {
                if let Some(to) = self.endpoint_under(point) {
                    self.connect(from, to);
                }
            }
            resting => self.state = resting,
        }
    }

    /// The free bump nearest to `point` on the box under it, if any.
    fn endpoint_under(&self, point: Point) -> Option<Endpoint> {
        let box_id = self.diagram.box_at(point, self.diagram.bump_radius())?;
        let bump = self.diagram.nearest_available_bump(box_id, point)?;
        Some(Endpoint::new(box_id, bump.id))
    }

    fn relink_endpoint(&mut self, connection: ConnectionId, end: ConnectionEnd, point: Point) {
        let Some(fixed) = self
            .diagram
            .get_connection(connection)
            .map(|c| c.endpoint(end.opposite()))
        else {
            return;
        };
        let Some(target) = self.endpoint_under(point) else {
            return;
        };
        if target.box_id == fixed.box_id {
            log::trace!("refusing to attach both ends of {connection} to {}", fixed.box_id);
            return;
        }
        self.diagram.set_connection_end(connection, end, target);
    }

    /// Create a connection between two bumps after validating both.
    ///
    /// Rejects connections from a box to itself and bumps that cannot take
    /// a new attachment. Returns `None` on rejection.
    pub fn connect(&mut self, from: Endpoint, to: Endpoint) -> Option<ConnectionId> {
        if from.box_id == to.box_id {
            log::trace!("rejected connection from {} to itself", from.box_id);
            return None;
        }
        if !self.diagram.is_bump_available(from) || !self.diagram.is_bump_available(to) {
            log::trace!(
                "rejected connection {}.{} -> {}.{}: bump unavailable",
                from.box_id,
                from.bump,
                to.box_id,
                to.bump
            );
            return None;
        }
        Some(self.diagram.create_connection(from, to))
    }

    /// Open the context menu for whatever is under `point`.
    /// Over empty canvas the menu is closed instead.
    pub fn open_context_menu(&mut self, point: Point) -> Option<&ContextMenu> {
        self.pointer = Some(point);
        self.context_menu =
            ContextMenu::resolve(&self.diagram, point, self.config.line_hit_tolerance);
        self.context_menu.as_ref()
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// Run a context menu action. The menu closes either way; actions the
    /// open menu does not offer do nothing. Returns whether anything changed.
    pub fn apply_menu_action(&mut self, action: MenuAction) -> bool {
        let Some(menu) = self.context_menu.take() else {
            return false;
        };
        if !menu.offers(action) {
            log::trace!("menu action {action:?} not offered for {:?}", menu.target());
            return false;
        }

        match (menu.target(), action) {
            (MenuTarget::Line(id), MenuAction::DeleteLine) => {
                self.diagram.delete_connection(id).is_some()
            }
            (MenuTarget::Box(id), MenuAction::DeleteBox) => {
                self.delete_box(id, DeleteScope::BoxOnly)
            }
            (MenuTarget::Box(id), MenuAction::DeleteBoxAndBelow) => {
                self.delete_box(id, DeleteScope::BoxAndBelow)
            }
            _ => false,
        }
    }

    fn delete_box(&mut self, id: BoxId, scope: DeleteScope) -> bool {
        !self.diagram.delete_box(id, scope).is_empty()
    }

    /// Cursor for the current mode and hover position.
    pub fn cursor(&self) -> CursorHint {
        match &self.state {
            InteractionState::ToolArmed(ToolKind::PlaceBox(_)) => CursorHint::Crosshair,
            InteractionState::ToolArmed(ToolKind::Line)
            | InteractionState::PendingConnection { .. } => CursorHint::Default,
            InteractionState::DraggingStack { .. } | InteractionState::DraggingEndpoint { .. } => {
                CursorHint::Move
            }
            InteractionState::Idle => {
                let Some(point) = self.pointer else {
                    return CursorHint::Default;
                };
                if self
                    .diagram
                    .connection_end_at(point, self.config.endpoint_grab_radius)
                    .is_some()
                {
                    CursorHint::Pointer
                } else if self.diagram.box_at(point, 0.0).is_some() {
                    CursorHint::Move
                } else {
                    CursorHint::Default
                }
            }
        }
    }

    /// The line being drawn or re-routed, if any.
    pub fn transient_line(&self) -> Option<TransientLine> {
        match self.state {
            InteractionState::PendingConnection { from, pointer } => Some(TransientLine {
                start: self.diagram.bump_tip(from)?,
                end: pointer,
                connection: None,
            }),
            InteractionState::DraggingEndpoint {
                connection,
                end,
                pointer,
            } => {
                let fixed = self.diagram.get_connection(connection)?.endpoint(end.opposite());
                let anchor = self.diagram.bump_tip(fixed)?;
                let (start, end) = match end {
                    ConnectionEnd::From => (pointer, anchor),
                    ConnectionEnd::To => (anchor, pointer),
                };
                Some(TransientLine {
                    start,
                    end,
                    connection: Some(connection),
                })
            }
            _ => None,
        }
    }

    /// Structural snapshot of the current diagram.
    pub fn export(&self) -> DiagramSnapshot {
        self.diagram.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bumps::BumpId;

    fn place(editor: &mut Editor, kind: BoxKind, x: f64, y: f64) -> BoxId {
        editor.select_box_tool(kind);
        editor.press(Point::new(x, y));
        editor.release(Point::new(x, y));
        editor.diagram().boxes().last().unwrap().id()
    }

    fn drag(editor: &mut Editor, from: Point, to: Point) {
        editor.press(from);
        editor.pointer_move(to);
        editor.release(to);
    }

    #[test]
    fn test_placing_box_disarms_tool() {
        let mut editor = Editor::new();
        editor.select_box_tool(BoxKind::T2);
        assert_eq!(editor.cursor(), CursorHint::Crosshair);

        editor.press(Point::new(100.0, 100.0));
        assert!(editor.state().is_idle());
        assert_eq!(editor.diagram().box_count(), 1);

        // A second press with no tool does not place another box.
        editor.release(Point::new(100.0, 100.0));
        editor.press(Point::new(400.0, 400.0));
        editor.release(Point::new(400.0, 400.0));
        assert_eq!(editor.diagram().box_count(), 1);
    }

    #[test]
    fn test_line_tool_connects_nearest_bumps() {
        let mut editor = Editor::new();
        let a = place(&mut editor, BoxKind::T3, 100.0, 100.0);
        let b = place(&mut editor, BoxKind::T2, 400.0, 100.0);

        editor.select_line_tool();
        editor.press(Point::new(150.0, 100.0));
        assert!(matches!(
            editor.state(),
            InteractionState::PendingConnection { .. }
        ));

        editor.pointer_move(Point::new(300.0, 90.0));
        let line = editor.transient_line().unwrap();
        assert_eq!(line.start, Point::new(156.0, 100.0));
        assert_eq!(line.end, Point::new(300.0, 90.0));
        assert_eq!(line.connection, None);

        editor.release(Point::new(400.0, 72.0));
        assert!(editor.state().is_idle());
        assert_eq!(editor.active_tool(), None);

        let conn = editor.diagram().connections().next().unwrap();
        assert_eq!(conn.from, Endpoint::new(a, BumpId::Right));
        assert_eq!(conn.to, Endpoint::new(b, BumpId::Top));
    }

    #[test]
    fn test_line_to_same_box_is_rejected() {
        let mut editor = Editor::new();
        place(&mut editor, BoxKind::T3, 100.0, 100.0);

        editor.select_line_tool();
        editor.press(Point::new(150.0, 100.0));
        editor.release(Point::new(100.0, 100.0));

        assert_eq!(editor.diagram().connection_count(), 0);
        assert!(editor.state().is_idle());
    }

    #[test]
    fn test_line_press_on_empty_canvas_keeps_tool() {
        let mut editor = Editor::new();
        editor.select_line_tool();
        editor.press(Point::new(10.0, 10.0));
        editor.release(Point::new(10.0, 10.0));
        assert_eq!(editor.active_tool(), Some(ToolKind::Line));
    }

    #[test]
    fn test_connect_rejects_stack_linked_bumps() {
        let mut editor = Editor::new();
        let a = place(&mut editor, BoxKind::T2, 100.0, 100.0);
        let b = place(&mut editor, BoxKind::T2, 100.0, 300.0);

        // B's origin is (50, 270); grab at its center and drop 10 under A.
        drag(&mut editor, Point::new(100.0, 300.0), Point::new(112.0, 170.0));
        assert_eq!(editor.diagram().get_box(b).unwrap().parent(), Some(a));

        let made = editor.connect(
            Endpoint::new(a, BumpId::Bottom),
            Endpoint::new(b, BumpId::Top),
        );
        assert_eq!(made, None);
        assert_eq!(editor.diagram().connection_count(), 0);
    }

    #[test]
    fn test_drag_snaps_and_recenters() {
        let mut editor = Editor::new();
        let a = place(&mut editor, BoxKind::T2, 100.0, 100.0);
        let b = place(&mut editor, BoxKind::T2, 100.0, 300.0);

        editor.press(Point::new(100.0, 300.0));
        assert_eq!(editor.cursor(), CursorHint::Move);
        editor.pointer_move(Point::new(112.0, 170.0));
        assert_eq!(
            editor.diagram().get_box(b).unwrap().origin,
            Point::new(62.0, 140.0)
        );
        editor.release(Point::new(112.0, 170.0));

        let (ba, bb) = (
            editor.diagram().get_box(a).unwrap(),
            editor.diagram().get_box(b).unwrap(),
        );
        assert_eq!(ba.child(), Some(b));
        assert_eq!(bb.origin, Point::new(ba.origin.x, ba.origin.y + ba.size.height));
        assert!(editor.state().is_idle());
    }

    #[test]
    fn test_endpoint_drag_relinks() {
        let mut editor = Editor::new();
        let a = place(&mut editor, BoxKind::T3, 100.0, 100.0);
        let b = place(&mut editor, BoxKind::T2, 400.0, 100.0);
        let c = place(&mut editor, BoxKind::T2, 400.0, 300.0);
        let id = editor
            .connect(Endpoint::new(a, BumpId::Right), Endpoint::new(b, BumpId::Top))
            .unwrap();

        // B's top tip is at (400, 64).
        editor.press(Point::new(400.0, 66.0));
        assert!(matches!(
            editor.state(),
            InteractionState::DraggingEndpoint { end: ConnectionEnd::To, .. }
        ));

        editor.pointer_move(Point::new(400.0, 275.0));
        let line = editor.transient_line().unwrap();
        assert_eq!(line.start, Point::new(156.0, 100.0));
        assert_eq!(line.end, Point::new(400.0, 275.0));
        assert_eq!(line.connection, Some(id));

        editor.release(Point::new(400.0, 272.0));
        let conn = editor.diagram().get_connection(id).unwrap();
        assert_eq!(conn.to, Endpoint::new(c, BumpId::Top));
        assert_eq!(conn.from, Endpoint::new(a, BumpId::Right));
    }

    #[test]
    fn test_endpoint_drag_onto_fixed_box_is_ignored() {
        let mut editor = Editor::new();
        let a = place(&mut editor, BoxKind::T3, 100.0, 100.0);
        let b = place(&mut editor, BoxKind::T2, 400.0, 100.0);
        let id = editor
            .connect(Endpoint::new(a, BumpId::Right), Endpoint::new(b, BumpId::Top))
            .unwrap();

        drag(&mut editor, Point::new(400.0, 64.0), Point::new(100.0, 100.0));
        let conn = editor.diagram().get_connection(id).unwrap();
        assert_eq!(conn.to, Endpoint::new(b, BumpId::Top));
        assert!(editor.state().is_idle());
    }

    #[test]
    fn test_endpoint_drop_on_full_box_is_ignored() {
        let mut editor = Editor::new();
        let a = place(&mut editor, BoxKind::T2, 100.0, 100.0);
        let b = place(&mut editor, BoxKind::T2, 100.0, 300.0);
        let c = place(&mut editor, BoxKind::T2, 100.0, 500.0);
        drag(&mut editor, Point::new(100.0, 300.0), Point::new(112.0, 170.0));
        drag(&mut editor, Point::new(100.0, 500.0), Point::new(100.0, 230.0));
        assert_eq!(editor.diagram().stack_of(a), vec![a, b, c]);

        let side = place(&mut editor, BoxKind::T3, 400.0, 400.0);
        let x = place(&mut editor, BoxKind::T2, 700.0, 100.0);
        let id = editor
            .connect(Endpoint::new(side, BumpId::Right), Endpoint::new(x, BumpId::Top))
            .unwrap();

        // B sits mid-stack: both of its bumps are taken by stack links.
        drag(&mut editor, Point::new(700.0, 64.0), Point::new(100.0, 160.0));
        let conn = editor.diagram().get_connection(id).unwrap();
        assert_eq!(conn.to, Endpoint::new(x, BumpId::Top));
        assert_eq!(conn.from, Endpoint::new(side, BumpId::Right));
        assert!(editor.state().is_idle());
    }

    #[test]
    fn test_endpoint_drop_on_empty_canvas_is_ignored() {
        let mut editor = Editor::new();
        let a = place(&mut editor, BoxKind::T3, 100.0, 100.0);
        let b = place(&mut editor, BoxKind::T2, 400.0, 100.0);
        let id = editor
            .connect(Endpoint::new(a, BumpId::Right), Endpoint::new(b, BumpId::Top))
            .unwrap();

        drag(&mut editor, Point::new(400.0, 64.0), Point::new(600.0, 600.0));
        let conn = editor.diagram().get_connection(id).unwrap();
        assert_eq!(conn.to, Endpoint::new(b, BumpId::Top));
        assert!(editor.state().is_idle());
        assert!(editor.transient_line().is_none());
    }

    #[test]
    fn test_hover_cursor() {
        let mut editor = Editor::new();
        let a = place(&mut editor, BoxKind::T3, 100.0, 100.0);
        let b = place(&mut editor, BoxKind::T2, 400.0, 100.0);
        editor.connect(Endpoint::new(a, BumpId::Right), Endpoint::new(b, BumpId::Top));

        editor.pointer_move(Point::new(157.0, 100.0));
        assert_eq!(editor.cursor(), CursorHint::Pointer);
        editor.pointer_move(Point::new(80.0, 90.0));
        assert_eq!(editor.cursor(), CursorHint::Move);
        editor.pointer_move(Point::new(700.0, 700.0));
        assert_eq!(editor.cursor(), CursorHint::Default);
    }

    #[test]
    fn test_context_menu_delete_and_below() {
        let mut editor = Editor::new();
        let a = place(&mut editor, BoxKind::T2, 100.0, 100.0);
        let b = place(&mut editor, BoxKind::T2, 100.0, 300.0);
        drag(&mut editor, Point::new(100.0, 300.0), Point::new(112.0, 170.0));

        editor.handle_pointer_event(PointerEvent::Down {
            position: Point::new(100.0, 160.0),
            button: MouseButton::Right,
        });
        let menu = editor.context_menu().unwrap();
        assert_eq!(menu.target(), MenuTarget::Box(b));
        assert_eq!(
            menu.items(),
            &[MenuAction::DeleteBox, MenuAction::DeleteBoxAndBelow]
        );

        assert!(editor.apply_menu_action(MenuAction::DeleteBoxAndBelow));
        assert!(editor.context_menu().is_none());
        assert!(editor.diagram().get_box(b).is_none());
        assert_eq!(editor.diagram().get_box(a).unwrap().child(), None);

        // Menu is closed now, so nothing else happens.
        assert!(!editor.apply_menu_action(MenuAction::DeleteBox));
        assert_eq!(editor.diagram().box_count(), 1);
    }

    #[test]
    fn test_unoffered_action_is_noop() {
        let mut editor = Editor::new();
        let a = place(&mut editor, BoxKind::T1, 100.0, 100.0);

        editor.open_context_menu(Point::new(100.0, 100.0));
        assert!(!editor.apply_menu_action(MenuAction::DeleteLine));
        assert!(editor.diagram().get_box(a).is_some());
        assert!(editor.context_menu().is_none());
    }

    #[test]
    fn test_press_closes_menu() {
        let mut editor = Editor::new();
        place(&mut editor, BoxKind::T1, 100.0, 100.0);
        assert!(editor.open_context_menu(Point::new(100.0, 100.0)).is_some());

        editor.press(Point::new(600.0, 600.0));
        assert!(editor.context_menu().is_none());
        assert!(editor.open_context_menu(Point::new(600.0, 600.0)).is_none());
    }
}
