//! Scripted test doubles for the client ports, plus small fixture helpers.
//! Compiled for tests only.

use std::{
    collections::{HashMap, VecDeque},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex as StdMutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    alert::{AlertClass, AlertSink},
    client::{
        ChatInfo, ClientConnector, ClientSession, EventHandler, Identity, InboundMessage,
        SenderInfo,
    },
    config::Config,
    connect::ConnectionManager,
    context::AppContext,
    domain::{MessageId, UserId, Whitelist},
    errlog::ErrorLog,
    registry::{Account, AccountRegistry},
    Error, Result,
};

pub fn tmp_log(prefix: &str) -> PathBuf {
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let pid = std::process::id();
    PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}.log"))
}

pub fn account(key: &str) -> Account {
    Account {
        key: key.to_string(),
        session: format!("{key}.session"),
        api_id: 12345,
        api_hash: "abcdef".to_string(),
        phone: "+10000000000".to_string(),
        user_id: None,
    }
}

pub fn test_config() -> Config {
    Config {
        accounts_file: PathBuf::from("/dev/null"),
        monitor_account: "main".to_string(),
        poll_interval: Duration::from_millis(50),
        scan_window: 10,
        max_connect_attempts: 3,
        connect_backoff: Duration::from_millis(5),
        log_file: tmp_log("vigil-test-cfg"),
    }
}

pub fn private_msg(id: i64, sender: i64, text: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(id),
        sender: Some(sender_info(sender)),
        private: true,
        outgoing: false,
        text: text.to_string(),
        chat: ChatInfo {
            id: sender,
            title: None,
            username: None,
        },
    }
}

pub fn outgoing_msg(id: i64, sender: i64, text: &str) -> InboundMessage {
    let mut msg = private_msg(id, sender, text);
    msg.outgoing = true;
    msg
}

pub fn group_msg(id: i64, sender: i64, title: &str, text: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(id),
        sender: Some(sender_info(sender)),
        private: false,
        outgoing: false,
        text: text.to_string(),
        chat: ChatInfo {
            id: -1000,
            title: Some(title.to_string()),
            username: None,
        },
    }
}

fn sender_info(id: i64) -> SenderInfo {
    SenderInfo {
        id: UserId(id),
        first_name: format!("User{id}"),
        last_name: None,
        username: None,
    }
}

/// Builds an [`AppContext`] with a recording sink and a scratch error log.
pub fn test_context(
    accounts: Vec<Account>,
    connector: Arc<MockConnector>,
    whitelist_ids: &[i64],
) -> (Arc<AppContext>, Arc<RecordingSink>) {
    let cfg = Arc::new(test_config());
    let errlog = Arc::new(ErrorLog::new(tmp_log("vigil-ctx-test")));
    let sink = Arc::new(RecordingSink::default());
    let registry = AccountRegistry::from_accounts(accounts).unwrap();
    let connect = ConnectionManager::new(
        connector,
        errlog.clone(),
        cfg.max_connect_attempts,
        cfg.connect_backoff,
    );
    let whitelist: Whitelist = whitelist_ids.iter().map(|id| UserId(*id)).collect();

    let ctx = Arc::new(AppContext {
        cfg,
        registry,
        connect,
        errlog,
        sink: sink.clone(),
        whitelist,
        sessions: tokio::sync::Mutex::new(HashMap::new()),
        cursors: tokio::sync::Mutex::new(HashMap::new()),
        cancel: CancellationToken::new(),
    });
    (ctx, sink)
}

#[derive(Default)]
pub struct RecordingSink {
    alerts: StdMutex<Vec<(AlertClass, String)>>,
}

impl RecordingSink {
    pub fn alerts(&self) -> Vec<(AlertClass, String)> {
        self.alerts.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingSink {
    fn alert(&self, class: AlertClass, text: &str) {
        self.alerts.lock().unwrap().push((class, text.to_string()));
    }
}

enum ConnectScript {
    Session(Arc<ScriptedSession>),
    Transient,
    Permanent,
}

/// Connector whose outcomes are scripted per account key. Unscripted
/// accounts fail transiently, so retry exhaustion needs no setup.
#[derive(Default)]
pub struct MockConnector {
    scripts: StdMutex<HashMap<String, VecDeque<ConnectScript>>>,
    attempts: StdMutex<HashMap<String, usize>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_session(&self, key: &str, session: Arc<ScriptedSession>) {
        self.push(key, ConnectScript::Session(session));
    }

    pub fn script_transient(&self, key: &str) {
        self.push(key, ConnectScript::Transient);
    }

    pub fn script_permanent(&self, key: &str) {
        self.push(key, ConnectScript::Permanent);
    }

    pub fn attempts_for(&self, key: &str) -> usize {
        self.attempts.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    fn push(&self, key: &str, script: ConnectScript) {
        self.scripts
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(script);
    }
}

#[async_trait]
impl ClientConnector for MockConnector {
    async fn connect(&self, acc: &Account) -> Result<Arc<dyn ClientSession>> {
        *self
            .attempts
            .lock()
            .unwrap()
            .entry(acc.key.clone())
            .or_insert(0) += 1;

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&acc.key)
            .and_then(VecDeque::pop_front);
        match script {
            Some(ConnectScript::Session(s)) => Ok(s),
            Some(ConnectScript::Permanent) => Err(Error::Client("auth rejected".to_string())),
            Some(ConnectScript::Transient) | None => {
                Err(Error::Transient("connect timed out".to_string()))
            }
        }
    }
}

enum ListScript {
    Batch(Vec<InboundMessage>),
    Transient,
    Fail,
}

/// Session whose listings and event stream are scripted. Listing scripts are
/// consumed in order; once exhausted, further calls return empty batches.
pub struct ScriptedSession {
    identity: Option<Identity>,
    batches: StdMutex<VecDeque<ListScript>>,
    events: StdMutex<Vec<InboundMessage>>,
    list_count: AtomicUsize,
    disconnected: AtomicBool,
}

impl ScriptedSession {
    pub fn with_identity(id: i64) -> Arc<Self> {
        Self::new(Some(Identity {
            id: UserId(id),
            username: Some(format!("user{id}")),
        }))
    }

    /// A session whose identity resolution fails.
    pub fn without_identity() -> Arc<Self> {
        Self::new(None)
    }

    fn new(identity: Option<Identity>) -> Arc<Self> {
        Arc::new(Self {
            identity,
            batches: StdMutex::new(VecDeque::new()),
            events: StdMutex::new(Vec::new()),
            list_count: AtomicUsize::new(0),
            disconnected: AtomicBool::new(false),
        })
    }

    pub fn push_batch(&self, msgs: Vec<InboundMessage>) {
        self.batches.lock().unwrap().push_back(ListScript::Batch(msgs));
    }

    pub fn push_transient_listing_error(&self) {
        self.batches.lock().unwrap().push_back(ListScript::Transient);
    }

    pub fn push_listing_error(&self) {
        self.batches.lock().unwrap().push_back(ListScript::Fail);
    }

    pub fn push_events(&self, msgs: Vec<InboundMessage>) {
        self.events.lock().unwrap().extend(msgs);
    }

    pub fn list_calls(&self) -> usize {
        self.list_count.load(Ordering::SeqCst)
    }

    pub fn was_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientSession for ScriptedSession {
    async fn resolve_self(&self) -> Result<Identity> {
        self.identity
            .clone()
            .ok_or_else(|| Error::Client("cannot resolve own identity".to_string()))
    }

    async fn recent_messages(&self, _limit: usize) -> Result<Vec<InboundMessage>> {
        self.list_count.fetch_add(1, Ordering::SeqCst);
        match self.batches.lock().unwrap().pop_front() {
            None => Ok(Vec::new()),
            Some(ListScript::Batch(v)) => Ok(v),
            Some(ListScript::Transient) => Err(Error::Transient("listing timed out".to_string())),
            Some(ListScript::Fail) => Err(Error::Client("listing failed".to_string())),
        }
    }

    async fn run_updates(
        &self,
        handler: EventHandler<'_>,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        let events: Vec<_> = self.events.lock().unwrap().drain(..).collect();
        for msg in events {
            handler(msg);
        }
        // Stream "drops" once the scripted events are delivered.
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnected.store(true, Ordering::SeqCst);
        Ok(())
    }
}
