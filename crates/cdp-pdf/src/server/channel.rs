// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Channel - typed command proxy for one DevTools target
//
// A page-level endpoint has no session id. A page attached through the
// browser endpoint is addressed by the sessionId returned from
// Target.attachToTarget, and every command and event for it carries it.

use crate::error::{Error, Result};
use crate::server::connection::ConnectionLike;
use crate::server::events::{EventSubscription, EventWaiter};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Channel provides typed command traffic for one target.
///
/// Handles serialization of parameters, routing by session id, waiting for
/// the correlated response and deserialization of the result.
///
/// # Example
///
/// ```ignore
/// use cdp_pdf::server::channel::Channel;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct NavigateResult {
///     frame_id: String,
/// }
///
/// async fn example(channel: &Channel) -> Result<(), Box<dyn std::error::Error>> {
///     let result: NavigateResult = channel
///         .send("Page.navigate", json!({ "url": "https://example.com" }))
///         .await?;
///     println!("Main frame: {}", result.frame_id);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Channel {
    session_id: Option<Arc<str>>,
    connection: Arc<dyn ConnectionLike>,
}

impl Channel {
    /// Creates a channel addressing `session_id`, or the endpoint's own
    /// target when `None`.
    pub fn new(session_id: Option<Arc<str>>, connection: Arc<dyn ConnectionLike>) -> Self {
        Self {
            session_id,
            connection,
        }
    }

    /// Sends a command and awaits the response.
    pub async fn send<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R> {
        let params_value = serde_json::to_value(params)?;

        let response = self
            .connection
            .send_message(self.session_id.as_deref(), method, params_value)
            .await?;

        serde_json::from_value(response).map_err(Into::into)
    }

    /// Sends a command, giving up after `timeout` when one is set.
    ///
    /// On elapse the pending response is abandoned and a `Timeout` error
    /// naming `method` is returned.
    pub async fn send_with_timeout<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
        timeout: Option<Duration>,
    ) -> Result<R> {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.send(method, params))
                .await
                .map_err(|_| Error::timeout(method, limit))?,
            None => self.send(method, params).await,
        }
    }

    /// Sends a command whose result carries nothing of interest.
    pub async fn send_no_result<P: Serialize>(&self, method: &str, params: P) -> Result<()> {
        let _: Value = self.send(method, params).await?;
        Ok(())
    }

    /// Arms a one-shot listener for `method` on this channel's target.
    pub fn once(&self, method: &str) -> EventWaiter {
        self.connection
            .listeners()
            .once(self.session_id.as_deref(), method)
    }

    /// Registers a persistent listener for `method` on this channel's target.
    pub fn subscribe(&self, method: &str) -> EventSubscription {
        self.connection
            .listeners()
            .subscribe(self.session_id.as_deref(), method)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("session_id", &self.session_id)
            .finish()
    }
}
