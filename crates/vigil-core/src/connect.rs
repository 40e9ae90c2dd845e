use std::{sync::Arc, time::Duration};

use tokio::time::sleep;

use crate::{
    client::{ClientConnector, ClientSession},
    errlog::ErrorLog,
    registry::Account,
};

/// Bounded-retry connection policy around a [`ClientConnector`].
///
/// Transient failures (timeouts, transport errors) are retried up to the
/// configured bound with a fixed backoff; anything else aborts immediately
/// and goes to the error log. A `None` return means the account is
/// unavailable for now; callers skip it and continue.
#[derive(Clone)]
pub struct ConnectionManager {
    connector: Arc<dyn ClientConnector>,
    errlog: Arc<ErrorLog>,
    max_attempts: u32,
    backoff: Duration,
}

impl ConnectionManager {
    pub fn new(
        connector: Arc<dyn ClientConnector>,
        errlog: Arc<ErrorLog>,
        max_attempts: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            connector,
            errlog,
            max_attempts,
            backoff,
        }
    }

    pub async fn connect(&self, account: &Account) -> Option<Arc<dyn ClientSession>> {
        let mut attempt = 0;
        while attempt < self.max_attempts {
            match self.connector.connect(account).await {
                Ok(session) => return Some(session),
                Err(e) if e.is_transient() => {
                    attempt += 1;
                    // Retry progress is echoed to the console for operator visibility.
                    println!("Attempt {attempt} at connecting {} failed.", account.key);
                    if attempt < self.max_attempts {
                        sleep(self.backoff).await;
                    }
                }
                Err(e) => {
                    self.errlog
                        .record(&format!("Unexpected error starting {}: {e}", account.key));
                    break;
                }
            }
        }
        eprintln!("Skipping {}: could not connect.", account.key);
        None
    }
}
