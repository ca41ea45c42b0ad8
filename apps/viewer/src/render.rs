//! Terminal rendering of session snapshots.

use client_core::SessionSnapshot;
use shared::domain::{ConnectionStatus, LogView};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub fn status_line(snapshot: &SessionSnapshot) -> String {
    let mut line = match &snapshot.status {
        ConnectionStatus::Connecting => "[connecting]".to_string(),
        ConnectionStatus::Connected => "[connected]".to_string(),
        ConnectionStatus::Disconnected { reason: None } => "[disconnected]".to_string(),
        ConnectionStatus::Disconnected {
            reason: Some(reason),
        } => format!("[disconnected: {reason}]"),
    };
    if snapshot.rejected_frames > 0 {
        line.push_str(&format!(
            " ({} frame(s) ignored)",
            snapshot.rejected_frames
        ));
    }
    line
}

/// Turns successive snapshots into terminal output.
///
/// With `clear_screen` every snapshot redraws the whole screen. Without it the
/// output is append-only: the status line is printed when it changes, a new
/// command is printed with its lines, and otherwise only lines not yet
/// printed are written.
pub struct Renderer {
    clear_screen: bool,
    last_status: Option<String>,
    last_view: Option<LogView>,
}

impl Renderer {
    pub fn new(clear_screen: bool) -> Self {
        Self {
            clear_screen,
            last_status: None,
            last_view: None,
        }
    }

    pub fn render(&mut self, snapshot: &SessionSnapshot) -> String {
        let status = status_line(snapshot);
        let view = &snapshot.view;
        let mut out = String::new();

        if self.clear_screen {
            out.push_str(CLEAR_SCREEN);
            push_line(&mut out, &status);
            push_view(&mut out, view);
        } else {
            if self.last_status.as_deref() != Some(status.as_str()) {
                push_line(&mut out, &status);
            }
            match &self.last_view {
                Some(previous) if previous == view => {}
                Some(previous)
                    if previous.command == view.command
                        && view.lines.starts_with(&previous.lines) =>
                {
                    for line in &view.lines[previous.lines.len()..] {
                        push_line(&mut out, line);
                    }
                }
                _ => push_view(&mut out, view),
            }
        }

        self.last_status = Some(status);
        self.last_view = Some(view.clone());
        out
    }
}

fn push_view(out: &mut String, view: &LogView) {
    push_line(out, &view.command);
    for line in &view.lines {
        push_line(out, line);
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
