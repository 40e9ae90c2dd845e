//! Ports for the messaging platform.
//!
//! Telegram is the first implementation; the shape is kept narrow so other
//! platforms can fit behind the same interface. Connection retry policy does
//! NOT live here: [`ClientConnector::connect`] is a single attempt, and
//! `ConnectionManager` wraps it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{MessageId, UserId},
    registry::Account,
    Result,
};

/// Identity of the connected account itself.
#[derive(Clone, Debug)]
pub struct Identity {
    pub id: UserId,
    pub username: Option<String>,
}

/// Sender detail attached to an inbound message.
#[derive(Clone, Debug)]
pub struct SenderInfo {
    pub id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl SenderInfo {
    /// "First Last", trimmed; either component may be missing.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name.as_deref().unwrap_or(""))
            .trim()
            .to_string()
    }
}

/// Originating conversation of an inbound message.
#[derive(Clone, Debug)]
pub struct ChatInfo {
    pub id: i64,
    pub title: Option<String>,
    pub username: Option<String>,
}

impl ChatInfo {
    /// Display name with a fixed fallback order: title, then handle, then the
    /// numeric id.
    pub fn display_name(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// One inbound message, as seen by both the scanner and the group monitor.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub id: MessageId,
    pub sender: Option<SenderInfo>,
    /// Private (direct) conversation, as opposed to a group/channel.
    pub private: bool,
    /// Authored by the connected account itself.
    pub outgoing: bool,
    pub text: String,
    pub chat: ChatInfo,
}

/// Callback invoked once per incoming message event.
pub type EventHandler<'a> = &'a (dyn Fn(InboundMessage) + Send + Sync);

/// Opens a session for an account. One attempt per call.
#[async_trait]
pub trait ClientConnector: Send + Sync {
    async fn connect(&self, account: &Account) -> Result<Arc<dyn ClientSession>>;
}

/// An authenticated platform session for one account.
#[async_trait]
pub trait ClientSession: Send + Sync {
    /// Resolve the identity of the account this session belongs to.
    async fn resolve_self(&self) -> Result<Identity>;

    /// The most recent inbound items across the account's conversations,
    /// bounded by `limit`. The scanner filters for private strangers; order
    /// is whatever the platform returns.
    async fn recent_messages(&self, limit: usize) -> Result<Vec<InboundMessage>>;

    /// Deliver incoming message events to `handler` until the stream drops or
    /// `cancel` fires. Outgoing messages are not delivered.
    async fn run_updates(&self, handler: EventHandler<'_>, cancel: &CancellationToken)
        -> Result<()>;

    /// Close the session. Best-effort; callers log failures and move on.
    async fn disconnect(&self) -> Result<()>;
}
