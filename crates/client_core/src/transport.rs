//! Transport seam between the session loop and the socket.

use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};
use url::Url;

use crate::error::ConnectionError;

/// A data frame as delivered by the transport, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

/// A receive-only source of frames for one connection.
#[async_trait]
pub trait FrameSource: Send {
    /// Next data frame. Control frames are not surfaced. `None` once the peer
    /// has closed the connection.
    async fn next_frame(&mut self) -> Option<Result<Frame, ConnectionError>>;

    /// Releases the connection. Calling it more than once is a no-op.
    async fn close(&mut self);
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &Url) -> Result<Box<dyn FrameSource>, ConnectionError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn FrameSource>, ConnectionError> {
        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|err| ConnectionError::Connect {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
        info!(%url, "log stream: websocket connected");
        Ok(Box::new(WebSocketSource {
            stream,
            closed: false,
        }))
    }
}

pub struct WebSocketSource {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    closed: bool,
}

#[async_trait]
impl FrameSource for WebSocketSource {
    async fn next_frame(&mut self) -> Option<Result<Frame, ConnectionError>> {
        if self.closed {
            return None;
        }
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(Frame::Text(text))),
                Some(Ok(Message::Binary(bytes))) => return Some(Ok(Frame::Binary(bytes))),
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "log stream: server closed websocket");
                    self.closed = true;
                    return None;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    self.closed = true;
                    return Some(Err(ConnectionError::Receive(err.to_string())));
                }
                None => {
                    self.closed = true;
                    return None;
                }
            }
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.stream.close(None).await {
            debug!(%err, "log stream: websocket close handshake failed");
        }
    }
}
