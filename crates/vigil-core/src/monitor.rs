use std::sync::Arc;

use crate::{
    alert::{preview, AlertClass},
    client::InboundMessage,
    context::AppContext,
    registry::Account,
    Result,
};

/// Event-driven monitor for group/channel traffic on one designated account.
///
/// This is the long-lived foreground task: it subscribes to the account's
/// inbound event stream and blocks until the stream drops or the run token is
/// cancelled. Every incoming event from a sender outside the whitelist is
/// alerted, tagged distinctly from private-message alerts.
pub struct GroupEventMonitor {
    ctx: Arc<AppContext>,
}

impl GroupEventMonitor {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    pub async fn run(&self, account: &Account) {
        let Some(session) = self.ctx.connect.connect(account).await else {
            eprintln!("Cannot start group monitor for {}: no connection.", account.key);
            return;
        };
        // Into the shared cache, so shutdown disconnects it with the rest.
        self.ctx.cache_session(&account.key, session.clone()).await;

        println!("Starting group monitor with account: {}", account.key);

        let ctx = self.ctx.clone();
        let handler = move |msg: InboundMessage| {
            // One bad event must never terminate the subscription.
            if let Err(e) = handle_event(&ctx, &msg) {
                ctx.errlog.record(&format!("Error in group handler: {e}"));
            }
        };

        if let Err(e) = session.run_updates(&handler, &self.ctx.cancel).await {
            self.ctx.errlog.record(&format!(
                "Group monitor stream for {} ended: {e}",
                account.key
            ));
        }
    }
}

fn handle_event(ctx: &AppContext, msg: &InboundMessage) -> Result<()> {
    let Some(sender) = &msg.sender else {
        return Ok(());
    };
    if ctx.whitelist.contains(&sender.id) {
        return Ok(());
    }

    let text = format!(
        "{} ({}) - Stranger: {} ({}) - Msg: {}",
        msg.chat.display_name(),
        msg.chat.id,
        sender.display_name(),
        sender.id.0,
        preview(&msg.text),
    );
    ctx.sink.alert(AlertClass::Group, &text);
    Ok(())
}
