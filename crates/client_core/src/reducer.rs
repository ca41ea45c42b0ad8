use shared::{
    domain::LogView,
    error::ProtocolError,
    protocol::{decode, is_command_marker, InboundMessage},
};

/// Pure transition from one view to the next.
pub fn reduce(mut state: LogView, message: InboundMessage) -> LogView {
    match message {
        InboundMessage::Snapshot(entries) => {
            let mut entries = entries.into_iter();
            match entries.next() {
                Some(command) => LogView {
                    command,
                    lines: entries.collect(),
                },
                None => LogView::idle(),
            }
        }
        InboundMessage::Delta(line) if is_command_marker(&line) => LogView {
            command: line,
            lines: Vec::new(),
        },
        InboundMessage::Delta(line) => {
            state.lines.push(line);
            state
        }
    }
}

/// Holds the view of one session and folds inbound messages into it.
#[derive(Debug, Clone, Default)]
pub struct LogStreamReducer {
    view: LogView,
}

impl LogStreamReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &LogView {
        &self.view
    }

    pub fn apply(&mut self, message: InboundMessage) -> &LogView {
        let current = std::mem::take(&mut self.view);
        self.view = reduce(current, message);
        &self.view
    }

    /// Decodes and applies one text frame. The view is untouched on error.
    pub fn apply_frame(&mut self, raw: &str) -> Result<&LogView, ProtocolError> {
        let message = decode(raw)?;
        Ok(self.apply(message))
    }

    pub fn reset(&mut self) {
        self.view = LogView::idle();
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
