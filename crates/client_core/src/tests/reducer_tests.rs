use super::*;
use shared::domain::IDLE_COMMAND;

fn view(command: &str, lines: &[&str]) -> LogView {
    LogView {
        command: command.to_string(),
        lines: lines.iter().map(|line| line.to_string()).collect(),
    }
}

fn delta(line: &str) -> InboundMessage {
    InboundMessage::Delta(line.to_string())
}

fn snapshot(entries: &[&str]) -> InboundMessage {
    InboundMessage::Snapshot(entries.iter().map(|entry| entry.to_string()).collect())
}

#[test]
fn starts_idle() {
    let reducer = LogStreamReducer::new();
    assert_eq!(reducer.view(), &view(IDLE_COMMAND, &[]));
    assert!(reducer.view().is_idle());
}

#[test]
fn output_deltas_append_in_order_without_touching_command() {
    let mut state = view("$ ffmpeg -i in.mkv out.mkv", &[]);
    let lines = ["frame=1", "frame=2", "frame=2", "DONE"];

    for (idx, line) in lines.iter().enumerate() {
        state = reduce(state, delta(line));
        assert_eq!(state.command, "$ ffmpeg -i in.mkv out.mkv");
        assert_eq!(state.lines.len(), idx + 1);
    }
    assert_eq!(state.lines, lines);
}

#[test]
fn output_deltas_append_while_idle() {
    let state = reduce(LogView::idle(), delta("stray output"));
    assert_eq!(state, view(IDLE_COMMAND, &["stray output"]));
}

#[test]
fn command_delta_replaces_command_and_clears_lines() {
    for prior in [
        LogView::idle(),
        view("$ build", &["line1", "line2"]),
        view("$ ls -la", &["total 0"]),
    ] {
        let state = reduce(prior, delta("$ ls -la"));
        assert_eq!(state, view("$ ls -la", &[]));
    }
}

#[test]
fn empty_snapshot_resets_to_idle() {
    let state = reduce(view("$ build", &["line1"]), snapshot(&[]));
    assert_eq!(state, view(IDLE_COMMAND, &[]));
}

#[test]
fn snapshot_splits_command_from_lines() {
    let state = reduce(
        view("$ old", &["stale"]),
        snapshot(&["$ build", "line1", "line2"]),
    );
    assert_eq!(state, view("$ build", &["line1", "line2"]));
}

#[test]
fn snapshot_with_only_command_has_no_lines() {
    let state = reduce(LogView::idle(), snapshot(&["$ build"]));
    assert_eq!(state, view("$ build", &[]));
}

#[test]
fn snapshot_is_idempotent() {
    let message = snapshot(&["$ build", "line1", "line2"]);
    let once = reduce(view("$ x", &["y"]), message.clone());
    let twice = reduce(once.clone(), message);
    assert_eq!(once, twice);
}

#[test]
fn malformed_frames_leave_view_unchanged() {
    let mut reducer = LogStreamReducer::new();
    reducer
        .apply_frame(r#"{"type":"log","data":["$ build","line1"]}"#)
        .expect("valid frame");
    let before = reducer.view().clone();

    for raw in [
        "",
        "not json",
        r#"{"type":"update"}"#,
        r#"{"type":"update","data":42}"#,
        r#"{"type":"log","data":"$ nope"}"#,
        r#"{"type":"heartbeat","data":null}"#,
    ] {
        assert!(reducer.apply_frame(raw).is_err(), "{raw:?} should be rejected");
        assert_eq!(reducer.view(), &before);
    }
}

#[test]
fn echo_scenario_from_idle_back_to_idle() {
    let mut reducer = LogStreamReducer::new();
    assert_eq!(reducer.view(), &view(IDLE_COMMAND, &[]));

    reducer.apply(delta("$ echo hi"));
    assert_eq!(reducer.view(), &view("$ echo hi", &[]));

    reducer.apply(delta("hi"));
    assert_eq!(reducer.view(), &view("$ echo hi", &["hi"]));

    reducer.apply(snapshot(&[]));
    assert_eq!(reducer.view(), &view(IDLE_COMMAND, &[]));
}

#[test]
fn reset_returns_to_idle() {
    let mut reducer = LogStreamReducer::new();
    reducer.apply(snapshot(&["$ build", "line1"]));
    reducer.reset();
    assert!(reducer.view().is_idle());
}
