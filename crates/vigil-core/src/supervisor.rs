use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    alert::AlertSink,
    client::ClientConnector,
    config::Config,
    connect::ConnectionManager,
    context::AppContext,
    errlog::ErrorLog,
    errors::Error,
    monitor::GroupEventMonitor,
    registry::AccountRegistry,
    scanner::DirectMessageScanner,
    whitelist::WhitelistBuilder,
    Result,
};

/// Lifecycle of one monitoring run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunPhase {
    Init,
    WhitelistBuilt,
    Running,
    ShuttingDown,
    Stopped,
}

/// Orchestrates startup order and ordered shutdown.
///
/// Whitelist construction runs to completion first, then the direct-message
/// scanner is spawned in the background and the group monitor runs in the
/// foreground. The run ends when the monitor returns or the process is
/// interrupted, whichever comes first; shutdown clears the run state,
/// disconnects every cached session and aborts the scanner as a backstop.
pub struct Supervisor {
    cfg: Arc<Config>,
    connector: Arc<dyn ClientConnector>,
    sink: Arc<dyn AlertSink>,
    errlog: Arc<ErrorLog>,
}

impl Supervisor {
    pub fn new(
        cfg: Arc<Config>,
        connector: Arc<dyn ClientConnector>,
        sink: Arc<dyn AlertSink>,
        errlog: Arc<ErrorLog>,
    ) -> Self {
        Self {
            cfg,
            connector,
            sink,
            errlog,
        }
    }

    pub async fn run(&self, mut registry: AccountRegistry) -> Result<()> {
        let mut phase = RunPhase::Init;
        tracing::debug!(?phase, "supervisor starting");

        let designated = registry
            .get(&self.cfg.monitor_account)
            .cloned()
            .ok_or_else(|| {
                Error::Config(format!(
                    "monitor account {} is not in the registry",
                    self.cfg.monitor_account
                ))
            })?;

        let connect = ConnectionManager::new(
            self.connector.clone(),
            self.errlog.clone(),
            self.cfg.max_connect_attempts,
            self.cfg.connect_backoff,
        );

        // Must complete fully before any scanner reads the whitelist.
        let whitelist = WhitelistBuilder::new(connect.clone(), self.errlog.clone())
            .build(&mut registry)
            .await;
        phase = RunPhase::WhitelistBuilt;
        tracing::debug!(?phase, accounts = whitelist.len(), "whitelist ready");

        let ctx = Arc::new(AppContext {
            cfg: self.cfg.clone(),
            registry,
            connect,
            errlog: self.errlog.clone(),
            sink: self.sink.clone(),
            whitelist,
            sessions: Mutex::new(HashMap::new()),
            cursors: Mutex::new(HashMap::new()),
            cancel: CancellationToken::new(),
        });

        phase = RunPhase::Running;
        tracing::debug!(?phase, "scanner + monitor starting");

        let scanner = DirectMessageScanner::new(ctx.clone());
        let scan_task = tokio::spawn(async move { scanner.run().await });

        let monitor = GroupEventMonitor::new(ctx.clone());
        tokio::select! {
          _ = monitor.run(&designated) => {}
          _ = tokio::signal::ctrl_c() => {
            println!("\nInterrupted by operator.");
          }
        }

        phase = RunPhase::ShuttingDown;
        tracing::debug!(?phase, "shutting down");

        ctx.cancel.cancel();
        self.disconnect_all(&ctx).await;
        scan_task.abort();

        phase = RunPhase::Stopped;
        tracing::debug!(?phase, "supervisor stopped");
        Ok(())
    }

    async fn disconnect_all(&self, ctx: &AppContext) {
        println!("Disconnecting all clients...");
        let sessions: Vec<_> = ctx.sessions.lock().await.drain().collect();
        for (key, session) in sessions {
            if let Err(e) = session.disconnect().await {
                self.errlog
                    .record(&format!("Error disconnecting client {key}: {e}"));
            }
        }
        println!("All clients disconnected.");
    }
}
