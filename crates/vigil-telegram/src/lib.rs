//! Telegram adapter for the vigil client ports, built on the Bot API via
//! `teloxide` long polling.
//!
//! Credentials map straight onto Bot API tokens: a token is literally
//! `<api_id>:<api_hash>`. The registry's `session` and `phone` fields are
//! carried for adapters that need a persisted session; the Bot API is
//! stateless, so this adapter ignores them and "disconnect" is a no-op.

use std::sync::{
    atomic::{AtomicI32, Ordering},
    Arc,
};
use std::time::Duration;

use async_trait::async_trait;
use teloxide::{
    payloads::GetUpdatesSetters,
    requests::{Request, Requester},
    types::{Message, UpdateKind},
    ApiError, Bot, RequestError,
};
use tokio_util::sync::CancellationToken;

use vigil_core::{
    client::{
        ChatInfo, ClientConnector, ClientSession, EventHandler, Identity, InboundMessage,
        SenderInfo,
    },
    domain::{MessageId, UserId},
    registry::Account,
    Error, Result,
};

/// Seconds the event stream blocks server-side per poll.
const LONG_POLL_SECS: u32 = 25;
/// Pause before re-polling after a transient stream failure.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(2);
/// Bot API caps `get_updates` batches at 100.
const MAX_BATCH: usize = 100;

pub struct TelegramConnector;

#[async_trait]
impl ClientConnector for TelegramConnector {
    async fn connect(&self, account: &Account) -> Result<Arc<dyn ClientSession>> {
        let bot = Bot::new(bot_token(account));
        // `get_me` doubles as the auth check; a bad token fails here.
        let me = bot.get_me().send().await.map_err(map_request_error)?;
        let identity = Identity {
            id: UserId(me.user.id.0 as i64),
            username: me.user.username.clone(),
        };
        tracing::debug!(account = %account.key, id = identity.id.0, "session opened");
        Ok(Arc::new(TelegramSession {
            bot,
            identity,
            offset: AtomicI32::new(0),
        }))
    }
}

fn bot_token(account: &Account) -> String {
    format!("{}:{}", account.api_id, account.api_hash)
}

fn map_request_error(e: RequestError) -> Error {
    match e {
        RequestError::Network(_) | RequestError::Io(_) | RequestError::RetryAfter(_) => {
            Error::Transient(e.to_string())
        }
        // Another poller owns this token's update stream right now; the
        // scanner and the group monitor can legitimately share an account.
        RequestError::Api(ApiError::TerminatedByOtherGetUpdates) => {
            Error::Transient("update stream taken by another poller".to_string())
        }
        other => Error::Client(other.to_string()),
    }
}

pub struct TelegramSession {
    bot: Bot,
    /// Resolved at connect time; `resolve_self` answers from here.
    identity: Identity,
    /// Highest update id seen on this session; the next poll starts past it.
    offset: AtomicI32,
}

impl TelegramSession {
    async fn poll(&self, limit: usize, timeout: u32) -> Result<Vec<InboundMessage>> {
        let offset = self.offset.load(Ordering::SeqCst);
        let updates = self
            .bot
            .get_updates()
            .offset(offset + 1)
            .limit(limit.min(MAX_BATCH) as u8)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_request_error)?;

        let mut out = Vec::new();
        for update in updates {
            self.offset.fetch_max(update.id, Ordering::SeqCst);
            match update.kind {
                UpdateKind::Message(msg) | UpdateKind::ChannelPost(msg) => {
                    out.push(self.to_inbound(msg));
                }
                _ => {}
            }
        }
        Ok(out)
    }

    fn to_inbound(&self, msg: Message) -> InboundMessage {
        let sender = msg.from().map(|u| SenderInfo {
            id: UserId(u.id.0 as i64),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            username: u.username.clone(),
        });
        // Bots are normally not shown their own traffic, but keep the flag
        // honest for the scanner's self-authored filter.
        let outgoing = sender
            .as_ref()
            .map(|s| s.id == self.identity.id)
            .unwrap_or(false);

        InboundMessage {
            id: MessageId(i64::from(msg.id.0)),
            private: msg.chat.is_private(),
            outgoing,
            text: msg.text().unwrap_or_default().to_string(),
            chat: ChatInfo {
                id: msg.chat.id.0,
                title: msg.chat.title().map(str::to_owned),
                username: msg.chat.username().map(str::to_owned),
            },
            sender,
        }
    }
}

#[async_trait]
impl ClientSession for TelegramSession {
    async fn resolve_self(&self) -> Result<Identity> {
        Ok(self.identity.clone())
    }

    async fn recent_messages(&self, limit: usize) -> Result<Vec<InboundMessage>> {
        self.poll(limit, 0).await
    }

    async fn run_updates(
        &self,
        handler: EventHandler<'_>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        loop {
            let batch = tokio::select! {
              _ = cancel.cancelled() => return Ok(()),
              res = self.poll(MAX_BATCH, LONG_POLL_SECS) => match res {
                Ok(batch) => batch,
                Err(e) if e.is_transient() => {
                  tracing::warn!("update poll failed, retrying: {e}");
                  tokio::time::sleep(POLL_RETRY_DELAY).await;
                  continue;
                }
                Err(e) => return Err(e),
              }
            };
            for msg in batch {
                if msg.outgoing {
                    continue;
                }
                handler(msg);
            }
        }
    }

    async fn disconnect(&self) -> Result<()> {
        // Nothing to tear down for Bot API long polling.
        Ok(())
    }
}
