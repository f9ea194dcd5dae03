//! Integration tests: stacking, splitting and deleting driven through pointer
//! events, the way a host application feeds the editor.

use bumpflow_core::{
    BoxId, BoxKind, BumpId, Editor, Endpoint, MenuAction, MouseButton, PointerEvent,
};
use kurbo::Point;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn place(editor: &mut Editor, kind: BoxKind, center: Point) -> BoxId {
    editor.select_box_tool(kind);
    editor.handle_pointer_event(PointerEvent::press(center));
    editor.handle_pointer_event(PointerEvent::release(center));
    editor
        .diagram()
        .box_at(center, 0.0)
        .expect("box placed under the pointer")
}

fn drag(editor: &mut Editor, from: Point, to: Point) {
    editor.handle_pointer_event(PointerEvent::press(from));
    editor.handle_pointer_event(PointerEvent::Move { position: to });
    editor.handle_pointer_event(PointerEvent::release(to));
}

fn right_click(editor: &mut Editor, at: Point) {
    editor.handle_pointer_event(PointerEvent::Down {
        position: at,
        button: MouseButton::Right,
    });
}

fn assert_consistent(editor: &Editor) {
    if let Err(err) = editor.diagram().check_integrity() {
        panic!("diagram is inconsistent: {err}");
    }
}

/// A over B over C, all T2, stacked at x = 50.
fn stack_of_three(editor: &mut Editor) -> (BoxId, BoxId, BoxId) {
    let a = place(editor, BoxKind::T2, pt(100.0, 100.0));
    let b = place(editor, BoxKind::T2, pt(100.0, 300.0));
    let c = place(editor, BoxKind::T2, pt(100.0, 500.0));
    drag(editor, pt(100.0, 300.0), pt(100.0, 170.0));
    drag(editor, pt(100.0, 500.0), pt(100.0, 230.0));
    assert_eq!(editor.diagram().stack_of(a), vec![a, b, c]);
    (a, b, c)
}

// ─── Snapping ───────────────────────────────────────────────────────────

#[test]
fn snap_under_box_recenters_child() {
    let mut editor = Editor::new();
    let a = place(&mut editor, BoxKind::T2, pt(100.0, 100.0));
    let b = place(&mut editor, BoxKind::T2, pt(100.0, 300.0));

    // Top edge 10 below A's bottom, 12 right of center.
    drag(&mut editor, pt(100.0, 300.0), pt(112.0, 170.0));

    let diagram = editor.diagram();
    let (ba, bb) = (diagram.get_box(a).unwrap(), diagram.get_box(b).unwrap());
    assert_eq!(bb.parent(), Some(a));
    assert_eq!(ba.child(), Some(b));
    assert_eq!(bb.origin.x, ba.origin.x);
    assert_eq!(bb.origin.y, ba.origin.y + ba.size.height);
    assert_consistent(&editor);
}

#[test]
fn stack_moves_rigidly_from_its_top() {
    let mut editor = Editor::new();
    let (a, b, c) = stack_of_three(&mut editor);

    drag(&mut editor, pt(100.0, 100.0), pt(400.0, 250.0));

    let diagram = editor.diagram();
    let top = diagram.get_box(a).unwrap();
    assert_eq!(top.origin, pt(350.0, 220.0));
    for (upper, lower) in [(a, b), (b, c)] {
        let (u, l) = (diagram.get_box(upper).unwrap(), diagram.get_box(lower).unwrap());
        assert_eq!(l.center_x(), u.center_x());
        assert_eq!(l.origin.y, u.bottom());
    }
    assert_consistent(&editor);
}

#[test]
fn t1_never_gains_a_parent() {
    let mut editor = Editor::new();
    let a = place(&mut editor, BoxKind::T2, pt(100.0, 100.0));
    let x = place(&mut editor, BoxKind::T1, pt(100.0, 300.0));

    // T1 dropped right under A.
    drag(&mut editor, pt(100.0, 300.0), pt(100.0, 165.0));
    assert_eq!(editor.diagram().get_box(x).unwrap().parent(), None);

    // A dropped right on top of the T1.
    drag(&mut editor, pt(100.0, 90.0), pt(100.0, 95.0));
    assert_eq!(editor.diagram().get_box(x).unwrap().parent(), None);
    assert_eq!(editor.diagram().get_box(a).unwrap().child(), None);
    assert_consistent(&editor);
}

// ─── Bumps shared between stacks and lines ──────────────────────────────

#[test]
fn line_on_bottom_bump_blocks_snap() {
    let mut editor = Editor::new();
    let a = place(&mut editor, BoxKind::T2, pt(100.0, 100.0));
    let other = place(&mut editor, BoxKind::T3, pt(400.0, 100.0));
    let b = place(&mut editor, BoxKind::T2, pt(100.0, 300.0));

    editor.select_line_tool();
    editor.handle_pointer_event(PointerEvent::press(pt(100.0, 128.0)));
    editor.handle_pointer_event(PointerEvent::release(pt(400.0, 72.0)));
    let line = editor.diagram().connections().next().unwrap();
    assert_eq!(line.from, Endpoint::new(a, BumpId::Bottom));
    assert_eq!(line.to, Endpoint::new(other, BumpId::Top));

    drag(&mut editor, pt(100.0, 300.0), pt(112.0, 170.0));
    assert_eq!(editor.diagram().get_box(b).unwrap().parent(), None);
    assert_eq!(editor.diagram().get_box(a).unwrap().child(), None);
}

#[test]
fn stack_link_blocks_line_on_same_bumps() {
    let mut editor = Editor::new();
    let a = place(&mut editor, BoxKind::T2, pt(100.0, 100.0));
    let b = place(&mut editor, BoxKind::T2, pt(100.0, 300.0));
    drag(&mut editor, pt(100.0, 300.0), pt(112.0, 170.0));

    let made = editor.connect(
        Endpoint::new(a, BumpId::Bottom),
        Endpoint::new(b, BumpId::Top),
    );
    assert!(made.is_none());
    assert_eq!(editor.diagram().connection_count(), 0);
}

// ─── Splitting ──────────────────────────────────────────────────────────

#[test]
fn split_from_middle_leaves_two_stacks() {
    let mut editor = Editor::new();
    let (a, b, c) = stack_of_three(&mut editor);
    let offset_before = {
        let d = editor.diagram();
        d.get_box(c).unwrap().origin - d.get_box(b).unwrap().origin
    };

    // B's center is (100, 160); carry it into open space.
    drag(&mut editor, pt(100.0, 160.0), pt(500.0, 460.0));

    let diagram = editor.diagram();
    assert_eq!(diagram.stack_of(a), vec![a]);
    assert_eq!(diagram.stack_of(b), vec![b, c]);
    assert_eq!(diagram.get_box(a).unwrap().child(), None);
    assert_eq!(diagram.get_box(b).unwrap().parent(), None);
    assert_eq!(
        diagram.get_box(c).unwrap().origin - diagram.get_box(b).unwrap().origin,
        offset_before
    );
    assert_consistent(&editor);
}

// ─── Deleting ───────────────────────────────────────────────────────────

#[test]
fn delete_middle_box_only_keeps_chain() {
    let mut editor = Editor::new();
    let (a, b, c) = stack_of_three(&mut editor);

    right_click(&mut editor, pt(100.0, 160.0));
    assert!(editor.apply_menu_action(MenuAction::DeleteBox));

    let diagram = editor.diagram();
    assert!(diagram.get_box(b).is_none());
    let (ba, bc) = (diagram.get_box(a).unwrap(), diagram.get_box(c).unwrap());
    assert_eq!(ba.child(), Some(c));
    assert_eq!(bc.parent(), Some(a));
    assert_eq!(bc.origin, pt(ba.origin.x, ba.bottom()));
    assert_consistent(&editor);
}

#[test]
fn delete_middle_and_below_truncates() {
    let mut editor = Editor::new();
    let (a, b, c) = stack_of_three(&mut editor);
    let side = place(&mut editor, BoxKind::T3, pt(400.0, 220.0));
    let kept = editor
        .connect(Endpoint::new(side, BumpId::Right), Endpoint::new(a, BumpId::Top))
        .unwrap();
    editor
        .connect(Endpoint::new(c, BumpId::Bottom), Endpoint::new(side, BumpId::Top))
        .unwrap();

    right_click(&mut editor, pt(100.0, 160.0));
    assert!(editor.apply_menu_action(MenuAction::DeleteBoxAndBelow));

    let diagram = editor.diagram();
    assert!(diagram.get_box(b).is_none());
    assert!(diagram.get_box(c).is_none());
    assert_eq!(diagram.get_box(a).unwrap().child(), None);
    assert!(diagram.connections().all(|conn| !conn.touches(b) && !conn.touches(c)));
    assert_eq!(diagram.connection_count(), 1);
    assert!(diagram.get_connection(kept).is_some());
    assert_consistent(&editor);
}

#[test]
fn snapshot_reflects_session() {
    let mut editor = Editor::new();
    stack_of_three(&mut editor);

    let json = editor.export().to_json_pretty().unwrap();
    assert!(json.contains("\"parentBox\": \"B0\""));
    assert!(json.contains("\"childBox\": \"B2\""));
    assert!(json.contains("\"type\": 2"));
}
