use std::sync::Arc;

use tokio::time::sleep;

use crate::{
    alert::{preview, AlertClass},
    context::AppContext,
    registry::Account,
};

/// Background recurring scanner for direct messages from strangers.
///
/// Each pass walks every account in registry order, lists a bounded window of
/// recent items and alerts on private messages whose sender is not on the
/// whitelist. A per-account cursor on the message id suppresses re-alerting.
/// Passes never overlap; the fixed interval runs pass-to-pass.
pub struct DirectMessageScanner {
    ctx: Arc<AppContext>,
}

impl DirectMessageScanner {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    /// Loop until the run token is cancelled. Cancellation is observed at the
    /// top of each pass and during the inter-pass sleep, so the loop ends
    /// within one polling interval of shutdown.
    pub async fn run(&self) {
        loop {
            if self.ctx.cancel.is_cancelled() {
                break;
            }
            self.pass().await;
            tokio::select! {
              _ = self.ctx.cancel.cancelled() => break,
              _ = sleep(self.ctx.cfg.poll_interval) => {}
            }
        }
    }

    /// One full pass over all registered accounts, in registry order.
    async fn pass(&self) {
        for account in self.ctx.registry.accounts() {
            self.scan_account(account).await;
        }
    }

    async fn scan_account(&self, account: &Account) {
        let session = match self.ctx.cached_session(&account.key).await {
            Some(s) => s,
            None => {
                let Some(s) = self.ctx.connect.connect(account).await else {
                    // Unavailable this pass; retried on the next one.
                    return;
                };
                self.ctx.cache_session(&account.key, s.clone()).await;
                s
            }
        };

        let messages = match session.recent_messages(self.ctx.cfg.scan_window).await {
            Ok(v) => v,
            Err(e) if e.is_transient() => return,
            Err(e) => {
                self.ctx
                    .errlog
                    .record(&format!("Error checking PMs for {}: {e}", account.key));
                return;
            }
        };

        for msg in messages {
            if !msg.private || msg.outgoing {
                continue;
            }
            let Some(sender) = &msg.sender else {
                continue;
            };
            if self.ctx.whitelist.contains(&sender.id) {
                continue;
            }
            if msg.id <= self.ctx.cursor(&account.key).await {
                continue;
            }

            let text = format!(
                "{} got message from stranger {} ({}) - Msg: {}",
                account.key,
                sender.display_name(),
                sender.id.0,
                preview(&msg.text),
            );
            self.ctx.sink.alert(AlertClass::Private, &text);
            self.ctx.advance_cursor(&account.key, msg.id).await;
        }
    }
}
