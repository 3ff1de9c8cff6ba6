//! Live event channel for one [`Activity`](crate::models::Activity).
//!
//! [`ActivityStream::listen`] opens the channel, pushes every event to a
//! caller-supplied handler and returns once the channel is closed. It is a
//! foreground, run-to-completion call: spawn it on its own task if the
//! caller has other work to do.
//!
//! Lifecycle: `Idle -> Connecting -> Open -> Closed`. The handler sees
//! exactly one `Connected` before any `Message`, messages in arrival
//! order, and exactly one `Closed` at the end. Server close and transport
//! failure after the channel is open are indistinguishable to the handler:
//! both end in `Closed`.
//!
//! # Example
//!
//! ```rust,ignore
//! use vcloud_api::activity::{ActivityEvent, ListenOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let options = ListenOptions::default().with_cancel(cancel.clone());
//!
//! client
//!     .activity()
//!     .listen_with(activity.id, options, |event| match event {
//!         ActivityEvent::Connected => println!("-- connected"),
//!         ActivityEvent::Message(text) => println!("{text}"),
//!         ActivityEvent::Closed => println!("-- done"),
//!     })
//!     .await?;
//! ```

use std::future::pending;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::endpoints::Endpoints;
use crate::error::Error;

// ── Events & state ───────────────────────────────────────────────────

/// One element of the activity channel, as delivered to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    Connected,
    Message(String),
    Closed,
}

/// Channel lifecycle. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Idle,
    Connecting,
    Open,
    Closed,
}

/// Why `listen` returned.
///
/// `Closed` covers both a server close and a transport failure; the other
/// two are local decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    Closed,
    Cancelled,
    TimedOut,
}

/// Optional local bounds on a `listen` call.
#[derive(Debug, Clone, Default)]
pub struct ListenOptions {
    /// Force-close the channel when this token is cancelled.
    pub cancel: Option<CancellationToken>,
    /// Force-close the channel this long after `listen` starts.
    pub timeout: Option<Duration>,
}

impl ListenOptions {
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ── Lifecycle bookkeeping ────────────────────────────────────────────

/// Tracks the state machine and guarantees the handler contract.
struct Lifecycle<F> {
    state: StreamState,
    activity_id: Uuid,
    handler: F,
}

impl<F: FnMut(ActivityEvent)> Lifecycle<F> {
    fn new(activity_id: Uuid, handler: F) -> Self {
        Self {
            state: StreamState::Idle,
            activity_id,
            handler,
        }
    }

    fn connecting(&mut self) {
        debug_assert_eq!(self.state, StreamState::Idle);
        self.state = StreamState::Connecting;
        debug!(activity_id = %self.activity_id, "activity channel connecting");
    }

    fn open(&mut self) {
        debug_assert_eq!(self.state, StreamState::Connecting);
        self.state = StreamState::Open;
        info!(activity_id = %self.activity_id, "activity channel open");
        (self.handler)(ActivityEvent::Connected);
    }

    fn message(&mut self, text: String) {
        if self.state == StreamState::Open {
            (self.handler)(ActivityEvent::Message(text));
        }
    }

    /// Deliver `Closed` once; later calls are no-ops.
    fn close(&mut self) {
        if self.state == StreamState::Closed {
            return;
        }
        self.state = StreamState::Closed;
        info!(activity_id = %self.activity_id, "activity channel closed");
        (self.handler)(ActivityEvent::Closed);
    }
}

// ── ActivityStream ───────────────────────────────────────────────────

/// Opens and consumes activity channels.
#[derive(Debug, Clone)]
pub struct ActivityStream {
    endpoints: Endpoints,
}

impl ActivityStream {
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    /// Stream `activity_id` until the server closes the channel.
    ///
    /// Handshake failures are returned as errors (the handler sees nothing).
    /// A binary frame delivers `Closed`, then fails with
    /// [`Error::StreamProtocolViolation`].
    pub async fn listen<F>(&self, activity_id: Uuid, handler: F) -> Result<StreamEnd, Error>
    where
        F: FnMut(ActivityEvent),
    {
        self.listen_with(activity_id, ListenOptions::default(), handler)
            .await
    }

    /// [`listen`](Self::listen) with a cancellation token and/or timeout.
    ///
    /// On cancel or timeout the connection is closed from this side and the
    /// handler still receives `Closed`.
    pub async fn listen_with<F>(
        &self,
        activity_id: Uuid,
        options: ListenOptions,
        handler: F,
    ) -> Result<StreamEnd, Error>
    where
        F: FnMut(ActivityEvent),
    {
        let url = self.endpoints.activity_channel(activity_id)?;
        let uri: tungstenite::http::Uri = url.as_str().parse().map_err(
            |e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()),
        )?;

        let mut lifecycle = Lifecycle::new(activity_id, handler);

        let cancelled = wait_cancelled(options.cancel.as_ref());
        let deadline = wait_deadline(options.timeout);
        tokio::pin!(cancelled, deadline);

        lifecycle.connecting();
        info!(url = %url, "connecting to activity channel");

        let connect = tokio_tungstenite::connect_async(ClientRequestBuilder::new(uri));
        let ws_stream = tokio::select! {
            biased;
            () = &mut cancelled => {
                lifecycle.close();
                return Ok(StreamEnd::Cancelled);
            }
            () = &mut deadline => {
                lifecycle.close();
                return Ok(StreamEnd::TimedOut);
            }
            result = connect => {
                let (ws_stream, _response) =
                    result.map_err(|e| Error::WebSocketConnect(e.to_string()))?;
                ws_stream
            }
        };

        lifecycle.open();

        let (mut write, mut read) = ws_stream.split();
        let mut violation = None;

        let end = loop {
            tokio::select! {
                biased;
                () = &mut cancelled => break StreamEnd::Cancelled,
                () = &mut deadline => break StreamEnd::TimedOut,
                frame = read.next() => match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        lifecycle.message(text.as_str().to_owned());
                    }
                    Some(Ok(tungstenite::Message::Binary(bytes))) => {
                        violation = Some(Error::StreamProtocolViolation {
                            detail: format!("unexpected binary frame ({} bytes)", bytes.len()),
                        });
                        break StreamEnd::Closed;
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            info!(code = %cf.code, reason = %cf.reason, "activity close frame received");
                        } else {
                            info!("activity close frame received (no payload)");
                        }
                        break StreamEnd::Closed;
                    }
                    Some(Ok(other)) => {
                        // Ping/Pong: tungstenite answers pings itself.
                        trace!(?other, "activity control frame");
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "activity channel transport error");
                        break StreamEnd::Closed;
                    }
                    None => {
                        info!("activity stream ended");
                        break StreamEnd::Closed;
                    }
                }
            }
        };

        if let Err(e) = write.close().await {
            debug!(error = %e, "activity channel already closed");
        }
        drop(read);
        lifecycle.close();

        match violation {
            Some(err) => Err(err),
            None => Ok(end),
        }
    }
}

async fn wait_cancelled(cancel: Option<&CancellationToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => pending().await,
    }
}

async fn wait_deadline(timeout: Option<Duration>) {
    match timeout {
        Some(after) => tokio::time::sleep(after).await,
        None => pending().await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_delivers_closed_once() {
        let mut seen = Vec::new();
        {
            let mut lifecycle = Lifecycle::new(Uuid::nil(), |event| seen.push(event));
            lifecycle.connecting();
            lifecycle.open();
            lifecycle.message("building".into());
            lifecycle.close();
            lifecycle.close();
            lifecycle.message("late".into());
        }
        assert_eq!(
            seen,
            vec![
                ActivityEvent::Connected,
                ActivityEvent::Message("building".into()),
                ActivityEvent::Closed,
            ]
        );
    }

    #[test]
    fn messages_before_open_are_not_delivered() {
        let mut seen = Vec::new();
        {
            let mut lifecycle = Lifecycle::new(Uuid::nil(), |event| seen.push(event));
            lifecycle.connecting();
            lifecycle.message("too early".into());
            lifecycle.close();
        }
        assert_eq!(seen, vec![ActivityEvent::Closed]);
    }

    #[test]
    fn listen_options_builders() {
        let token = CancellationToken::new();
        let options = ListenOptions::default()
            .with_cancel(token.clone())
            .with_timeout(Duration::from_secs(5));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert!(options.cancel.is_some());
    }

    #[tokio::test]
    async fn refused_handshake_fails_before_handler_runs() {
        let endpoints = Endpoints::parse("http://127.0.0.1:1/", "ws://127.0.0.1:1/").unwrap();
        let stream = ActivityStream::new(endpoints);
        let mut seen = Vec::new();

        let result = stream
            .listen(Uuid::new_v4(), |event| seen.push(event))
            .await;

        assert!(matches!(result, Err(Error::WebSocketConnect(_))));
        assert!(seen.is_empty());
    }
}
