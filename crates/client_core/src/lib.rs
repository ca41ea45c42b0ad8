//! Client side of the command-log stream: transport, session lifecycle, and
//! the reducer that turns inbound frames into a displayable view.

pub mod error;
pub mod reducer;
pub mod session;
pub mod transport;

pub use error::{ClientError, ConnectionError};
pub use reducer::{reduce, LogStreamReducer};
pub use session::{run_session, LogStreamClient, SessionHandle, SessionOutcome, SessionSnapshot};
pub use transport::{Connector, Frame, FrameSource, WebSocketConnector};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
