use std::sync::Arc;

use shared::{
    domain::{ConnectionStatus, LogView},
    error::ProtocolError,
    protocol::decode,
};
use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
};
use tokio_stream::wrappers::WatchStream;
use tracing::{info, warn};
use url::Url;

use crate::{
    error::{ClientError, ConnectionError},
    reducer::reduce,
    transport::{Connector, Frame, FrameSource},
};

/// Everything a renderer needs, republished after every processed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: ConnectionStatus,
    pub view: LogView,
    /// Frames this session could not decode or did not recognize.
    pub rejected_frames: u64,
}

impl SessionSnapshot {
    pub fn connecting() -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            view: LogView::idle(),
            rejected_frames: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The owning handle asked for the session to end.
    Closed,
    /// The server closed the connection.
    Ended,
    Failed(ConnectionError),
}

impl SessionOutcome {
    fn disconnect_reason(&self) -> Option<String> {
        match self {
            Self::Closed => None,
            Self::Ended => Some("server closed the connection".to_string()),
            Self::Failed(err) => Some(err.to_string()),
        }
    }
}

/// Drives one connected session until the peer closes it, the transport
/// fails, or `shutdown` fires (or its sender is dropped).
///
/// Frames are handled one at a time: decoded, reduced, then published. A
/// frame that fails to decode, or arrives as binary, is logged and counted,
/// and leaves the view as it was. Whatever the outcome, the source is closed
/// and the final snapshot is disconnected with an idle view.
///
/// The view is reduced in place inside the watch channel, so an appended
/// line costs O(1) here; readers pay for their own clones.
pub async fn run_session(
    mut source: Box<dyn FrameSource>,
    publisher: &watch::Sender<SessionSnapshot>,
    mut shutdown: oneshot::Receiver<()>,
) -> SessionOutcome {
    publisher.send_replace(SessionSnapshot {
        status: ConnectionStatus::Connected,
        view: LogView::idle(),
        rejected_frames: 0,
    });

    let outcome = loop {
        tokio::select! {
            _ = &mut shutdown => break SessionOutcome::Closed,
            frame = source.next_frame() => match frame {
                Some(Ok(frame)) => {
                    let decoded = match frame {
                        Frame::Text(raw) => decode(&raw),
                        Frame::Binary(bytes) => Err(ProtocolError::binary(&bytes)),
                    };
                    match decoded {
                        Ok(message) => publisher.send_modify(|snapshot| {
                            let view = std::mem::take(&mut snapshot.view);
                            snapshot.view = reduce(view, message);
                        }),
                        Err(err) => {
                            warn!(raw = %err.raw(), error = %err, "log stream: ignoring frame");
                            publisher.send_modify(|snapshot| snapshot.rejected_frames += 1);
                        }
                    }
                }
                Some(Err(err)) => {
                    warn!(error = %err, "log stream: connection lost");
                    break SessionOutcome::Failed(err);
                }
                None => break SessionOutcome::Ended,
            },
        }
    };

    source.close().await;
    let reason = outcome.disconnect_reason();
    let mut rejected_frames = 0;
    publisher.send_modify(|snapshot| {
        snapshot.status = ConnectionStatus::Disconnected { reason };
        snapshot.view = LogView::idle();
        rejected_frames = snapshot.rejected_frames;
    });
    info!(?outcome, rejected_frames, "log stream: session finished");
    outcome
}

pub struct LogStreamClient<C> {
    connector: Arc<C>,
}

impl<C> LogStreamClient<C>
where
    C: Connector + 'static,
{
    pub fn new(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
        }
    }

    /// Spawns a session against `url`. Nothing reconnects once it ends.
    pub fn open(&self, url: Url) -> SessionHandle {
        let (publisher, state) = watch::channel(SessionSnapshot::connecting());
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let connector = Arc::clone(&self.connector);

        let task = tokio::spawn(async move {
            info!(%url, "log stream: opening session");
            let connected = tokio::select! {
                _ = &mut shutdown_rx => None,
                connected = connector.connect(&url) => Some(connected),
            };

            let outcome = match connected {
                Some(Ok(source)) => return run_session(source, &publisher, shutdown_rx).await,
                Some(Err(err)) => {
                    warn!(%url, error = %err, "log stream: connect failed");
                    SessionOutcome::Failed(err)
                }
                None => SessionOutcome::Closed,
            };
            publisher.send_replace(SessionSnapshot {
                status: ConnectionStatus::Disconnected {
                    reason: outcome.disconnect_reason(),
                },
                view: LogView::idle(),
                rejected_frames: 0,
            });
            outcome
        });

        SessionHandle {
            state,
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

/// Owner side of a running session. Dropping it closes the connection.
pub struct SessionHandle {
    state: watch::Receiver<SessionSnapshot>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.clone()
    }

    /// Current snapshot first, then each new one. Intermediate snapshots may
    /// be skipped by a slow consumer.
    pub fn updates(&self) -> WatchStream<SessionSnapshot> {
        WatchStream::new(self.state.clone())
    }

    pub async fn close(self) -> Result<SessionOutcome, ClientError> {
        let SessionHandle { shutdown, task, .. } = self;
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(());
        }
        Ok(task.await?)
    }

    /// Waits for the server side to end the session.
    pub async fn wait(self) -> Result<SessionOutcome, ClientError> {
        let SessionHandle { shutdown, task, .. } = self;
        let outcome = task.await?;
        drop(shutdown);
        Ok(outcome)
    }
}
