// In-process stand-in for a browser connection, for unit tests.
//
// Handlers run synchronously inside send_message and may dispatch events
// before returning their result, which reproduces a browser that fires the
// load event before the navigate response arrives.

use crate::error::{Error, Result};
use crate::server::connection::ConnectionLike;
use crate::server::events::EventListeners;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

type Handler = Arc<dyn Fn(&Value, &EventListeners) -> Result<Value> + Send + Sync>;

#[derive(Clone)]
enum Script {
    Handler(Handler),
    Stall,
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub session_id: Option<String>,
    pub method: String,
    pub params: Value,
}

#[derive(Default)]
pub(crate) struct ScriptedConnection {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<RecordedCall>>,
    listeners: Arc<EventListeners>,
    closed: AtomicBool,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `method` with a fixed result.
    pub fn respond(&self, method: &str, result: Value) {
        self.handle(method, move |_, _| Ok(result.clone()));
    }

    /// Answers `method` by running `handler`.
    pub fn handle<F>(&self, method: &str, handler: F)
    where
        F: Fn(&Value, &EventListeners) -> Result<Value> + Send + Sync + 'static,
    {
        self.scripts
            .lock()
            .insert(method.to_string(), Script::Handler(Arc::new(handler)));
    }

    /// Never answers `method`.
    pub fn stall(&self, method: &str) {
        self.scripts.lock().insert(method.to_string(), Script::Stall);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.method.clone()).collect()
    }

    /// Fires an event as if it came off the wire.
    pub fn emit(&self, session_id: Option<&str>, method: &str, params: Value) -> usize {
        self.listeners.dispatch(session_id, method, &params)
    }
}

impl ConnectionLike for ScriptedConnection {
    fn send_message(
        &self,
        session_id: Option<&str>,
        method: &str,
        params: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>> {
        if self.closed.load(Ordering::SeqCst) {
            return Box::pin(async { Err(Error::ChannelClosed) });
        }

        self.calls.lock().push(RecordedCall {
            session_id: session_id.map(str::to_string),
            method: method.to_string(),
            params: params.clone(),
        });

        let script = self.scripts.lock().get(method).cloned();
        match script {
            Some(Script::Handler(handler)) => {
                let result = handler(&params, &self.listeners);
                Box::pin(async move { result })
            }
            Some(Script::Stall) => Box::pin(std::future::pending()),
            None => {
                let message = format!("'{}' wasn't found (code -32601)", method);
                Box::pin(async move { Err(Error::ProtocolError(message)) })
            }
        }
    }

    fn listeners(&self) -> &Arc<EventListeners> {
        &self.listeners
    }

    fn close(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.shutdown();
        Box::pin(async {})
    }

    fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.listeners.close();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
