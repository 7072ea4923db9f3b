//! The connection pump: one read task, one write task, one cancellation
//! signal.
//!
//! ```text
//!              ┌──────────── read task ────────────┐
//! socket ────→ │ decode → Dispatcher → actions     │──→ joined callback
//!              └──────────────┬────────────────────┘      (own task)
//!                             │ Send(..)        ▲
//!                             ▼                 │ SessionHandle commands
//!                      outbound queue ◀─────────┘
//!                             │
//!              ┌──────────── write task ───────────┐
//! socket ◀──── │ encode(user id) → send            │
//!              └───────────────────────────────────┘
//! ```
//!
//! Any fatal condition in either task cancels the shared token, which stops
//! the other task at its next wake-up.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use futures_util::future::BoxFuture;
use jigsaw_protocol::{Inbound, Outbound, ProtocolError};
use jigsaw_transport::{Connection, Frame, TransportError, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::dispatch::{Action, Dispatcher};
use crate::{SessionError, SessionHandle, SessionOptions, SessionState};

type JoinedCallback =
    Box<dyn FnOnce(SessionHandle, Arc<SessionState>) -> BoxFuture<'static, ()> + Send>;

/// A connected client session that has not started pumping yet.
///
/// Create one with [`Session::connect`], grab a [`SessionHandle`] or
/// register an [`on_joined`](Session::on_joined) callback, then drive it
/// with [`run`](Session::run).
///
/// ```rust,no_run
/// use jigsaw_session::{Session, SessionOptions};
///
/// # async fn demo() -> Result<(), jigsaw_session::SessionError> {
/// let session = Session::connect(SessionOptions::new("abcd"))
///     .await?
///     .on_joined(|handle, state| async move {
///         tracing::info!(user_id = state.user_id, "ready");
///         handle.exit();
///     });
/// session.run().await
/// # }
/// ```
pub struct Session<C = WebSocketConnection> {
    conn: C,
    dispatcher: Dispatcher,
    handle: SessionHandle,
    outbound: mpsc::UnboundedReceiver<Outbound>,
    cancel: CancellationToken,
    on_joined: Option<JoinedCallback>,
}

impl Session<WebSocketConnection> {
    /// Dials the configured gateway.
    ///
    /// # Errors
    /// [`SessionError::Connect`] if the socket can't be opened. No session
    /// exists in that case.
    pub async fn connect(options: SessionOptions) -> Result<Self, SessionError> {
        tracing::info!(
            url = %options.gateway_url,
            room = %options.room,
            "connecting to puzzle server"
        );
        let conn =
            WebSocketConnection::connect(&options.gateway_url, &options.user_agent)
                .await
                .map_err(SessionError::Connect)?;
        Ok(Self::new(conn, options))
    }
}

impl<C> Session<C>
where
    C: Connection<Error = TransportError>,
{
    /// Wraps an already open connection.
    pub fn new(conn: C, options: SessionOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        Self {
            conn,
            dispatcher: Dispatcher::new(options),
            handle: SessionHandle::new(tx, cancel.clone()),
            outbound: rx,
            cancel,
            on_joined: None,
        }
    }

    /// A handle for issuing commands. Commands queued before
    /// [`run`](Self::run) are written once the pump starts.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Registers the callback to run once the join sequence completes.
    ///
    /// It runs on its own task, so it may issue commands and sleep freely
    /// without stalling the read loop. It fires at most once per session.
    pub fn on_joined<F, Fut>(mut self, callback: F) -> Self
    where
        F: FnOnce(SessionHandle, Arc<SessionState>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_joined = Some(Box::new(move |handle, state| {
            Box::pin(callback(handle, state))
        }));
        self
    }

    /// Pumps the connection until the session ends.
    ///
    /// Returns `Ok(())` after an explicit [`SessionHandle::exit`], or the
    /// first fatal error otherwise. A server-side close is reported as
    /// [`TransportError::ConnectionClosed`].
    pub async fn run(self) -> Result<(), SessionError> {
        let Self {
            conn,
            dispatcher,
            handle,
            outbound,
            cancel,
            on_joined,
        } = self;

        let conn = Arc::new(conn);
        let user_id = Arc::new(AtomicU16::new(0));
        let debug = dispatcher.options().debug;
        let id = conn.id();
        tracing::debug!(%id, "session started");

        let reader = tokio::spawn(read_loop(
            Arc::clone(&conn),
            dispatcher,
            handle,
            cancel.clone(),
            Arc::clone(&user_id),
            on_joined,
        ));
        let writer = tokio::spawn(write_loop(
            Arc::clone(&conn),
            outbound,
            cancel.clone(),
            user_id,
            debug,
        ));

        let (read_result, write_result) = tokio::join!(reader, writer);
        cancel.cancel();

        if let Err(e) = conn.close().await {
            tracing::debug!(%id, error = %e, "error closing connection");
        }
        tracing::debug!(%id, "session ended");

        task_result(read_result).and(task_result(write_result))
    }
}

fn task_result(
    result: Result<Result<(), SessionError>, JoinError>,
) -> Result<(), SessionError> {
    result.map_err(|e| SessionError::Task(e.to_string()))?
}

// ---------------------------------------------------------------------------
// Read task
// ---------------------------------------------------------------------------

async fn read_loop<C>(
    conn: Arc<C>,
    mut dispatcher: Dispatcher,
    handle: SessionHandle,
    cancel: CancellationToken,
    user_id: Arc<AtomicU16>,
    mut on_joined: Option<JoinedCallback>,
) -> Result<(), SessionError>
where
    C: Connection<Error = TransportError>,
{
    let debug = dispatcher.options().debug;

    let result = loop {
        let received = tokio::select! {
            biased;
            _ = cancel.cancelled() => break Ok(()),
            received = conn.recv() => received,
        };

        let frame = match received {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                break Err(TransportError::ConnectionClosed(
                    "server closed the connection".into(),
                )
                .into());
            }
            Err(e) => break Err(e.into()),
        };

        if debug {
            trace_frame("recv", &frame);
        }

        let actions = match decode(&frame).and_then(|msg| dispatcher.handle(msg)) {
            Ok(actions) => actions,
            Err(e) => break Err(e.into()),
        };
        user_id.store(dispatcher.user_id(), Ordering::Release);

        for action in actions {
            match action {
                Action::Send(msg) => {
                    // Only fails once the session is already closing.
                    let _ = handle.enqueue(msg);
                }
                Action::Joined(state) => {
                    if let Some(callback) = on_joined.take() {
                        tokio::spawn(callback(handle.clone(), state));
                    }
                }
            }
        }
    };

    dispatcher.close();
    if let Err(ref e) = result {
        tracing::error!(error = %e, "session read failed");
    }
    cancel.cancel();
    result
}

fn decode(frame: &Frame) -> Result<Inbound, ProtocolError> {
    match frame {
        Frame::Text(text) => Inbound::decode_json(text),
        Frame::Binary(data) => Inbound::decode_binary(data),
    }
}

// ---------------------------------------------------------------------------
// Write task
// ---------------------------------------------------------------------------

async fn write_loop<C>(
    conn: Arc<C>,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    cancel: CancellationToken,
    user_id: Arc<AtomicU16>,
    debug: bool,
) -> Result<(), SessionError>
where
    C: Connection<Error = TransportError>,
{
    let result = loop {
        let msg = tokio::select! {
            biased;
            _ = cancel.cancelled() => break Ok(()),
            msg = outbound.recv() => match msg {
                Some(msg) => msg,
                None => break Ok(()),
            },
        };

        let frame = match msg.encode(user_id.load(Ordering::Acquire)) {
            Ok(frame) => frame,
            Err(e) => break Err(e.into()),
        };

        if cancel.is_cancelled() {
            break Ok(());
        }
        if debug {
            tracing::debug!(message = msg.name(), "send");
            trace_frame("send", &frame);
        }
        if let Err(e) = conn.send(frame).await {
            break Err(e.into());
        }
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "session write failed");
        cancel.cancel();
    }
    result
}

fn trace_frame(direction: &str, frame: &Frame) {
    match frame {
        Frame::Text(text) => tracing::debug!("{direction} text {text}"),
        Frame::Binary(data) => tracing::debug!("{direction} binary {data:02X?}"),
    }
}
