use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    alert::AlertSink,
    client::ClientSession,
    config::Config,
    connect::ConnectionManager,
    domain::{MessageId, Whitelist},
    errlog::ErrorLog,
    registry::AccountRegistry,
};

/// Shared state for one monitoring run, owned by the supervisor and passed
/// explicitly to each component.
///
/// The whitelist is filled before this context is built and read-only after.
/// The session cache and cursor map are written by the scanner (the group
/// monitor only inserts its own session once at startup), but the shutdown
/// path drains the cache from a different task, hence the mutexes.
pub struct AppContext {
    pub cfg: Arc<Config>,
    pub registry: AccountRegistry,
    pub connect: ConnectionManager,
    pub errlog: Arc<ErrorLog>,
    pub sink: Arc<dyn AlertSink>,
    pub whitelist: Whitelist,

    /// Open sessions keyed by account key. Sole owner of the handles; the
    /// supervisor disconnects them at shutdown.
    pub sessions: Mutex<HashMap<String, Arc<dyn ClientSession>>>,
    /// Last alerted message id per account key. Monotonically non-decreasing.
    pub cursors: Mutex<HashMap<String, MessageId>>,

    /// Run state: cancelled exactly once, during shutdown. Background loops
    /// observe it and terminate within one polling interval.
    pub cancel: CancellationToken,
}

impl AppContext {
    pub async fn cursor(&self, key: &str) -> MessageId {
        self.cursors
            .lock()
            .await
            .get(key)
            .copied()
            .unwrap_or(MessageId(0))
    }

    pub async fn advance_cursor(&self, key: &str, id: MessageId) {
        self.cursors.lock().await.insert(key.to_string(), id);
    }

    pub async fn cached_session(&self, key: &str) -> Option<Arc<dyn ClientSession>> {
        self.sessions.lock().await.get(key).cloned()
    }

    pub async fn cache_session(&self, key: &str, session: Arc<dyn ClientSession>) {
        self.sessions.lock().await.insert(key.to_string(), session);
    }
}
