use std::sync::Arc;

use crate::{connect::ConnectionManager, domain::Whitelist, errlog::ErrorLog, registry::AccountRegistry};

/// Builds the whitelist of the operator's own account ids.
///
/// Runs once, sequentially, before any scanner starts. Each registered
/// account is connected, its own identity resolved and written back onto the
/// registry entry, and the session closed again; whitelist building keeps no
/// sessions open. Per-account failures are logged and skipped; a partial
/// whitelist is acceptable.
pub struct WhitelistBuilder {
    connect: ConnectionManager,
    errlog: Arc<ErrorLog>,
}

impl WhitelistBuilder {
    pub fn new(connect: ConnectionManager, errlog: Arc<ErrorLog>) -> Self {
        Self { connect, errlog }
    }

    pub async fn build(&self, registry: &mut AccountRegistry) -> Whitelist {
        println!("Building whitelist of registered accounts...");
        let mut whitelist = Whitelist::new();

        for account in registry.accounts_mut() {
            let Some(session) = self.connect.connect(account).await else {
                continue;
            };
            match session.resolve_self().await {
                Ok(me) => {
                    account.user_id = Some(me.id);
                    whitelist.insert(me.id);
                    println!(
                        "  ok {} => user_id {} ({})",
                        account.key,
                        me.id.0,
                        me.username.as_deref().unwrap_or("-")
                    );
                }
                Err(e) => {
                    eprintln!("  {} error: {e}", account.key);
                    self.errlog
                        .record(&format!("Whitelist build failed for {}: {e}", account.key));
                }
            }
            let _ = session.disconnect().await;
        }

        println!("Whitelist built: {} account(s).\n", whitelist.len());
        whitelist
    }
}
