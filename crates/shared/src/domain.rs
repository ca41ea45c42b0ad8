/// Placeholder shown in place of a command while the worker is idle.
pub const IDLE_COMMAND: &str = "no command being run";

/// The displayable state of one log stream: the active command and the
/// output it has produced so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogView {
    pub command: String,
    pub lines: Vec<String>,
}

impl LogView {
    pub fn idle() -> Self {
        Self {
            command: IDLE_COMMAND.to_string(),
            lines: Vec::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.command == IDLE_COMMAND && self.lines.is_empty()
    }
}

impl Default for LogView {
    fn default() -> Self {
        Self::idle()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected {
        reason: Option<String>,
    },
}

impl ConnectionStatus {
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}
