/// Core error type for the monitor.
///
/// Adapter crates map their platform errors into this type so the engine can
/// decide between "retry / skip this account for now" and "give up on this
/// account" consistently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Timeouts and transport-level failures. Connect attempts retry on
    /// these; a scan pass skips the account silently.
    #[error("transient client error: {0}")]
    Transient(String),

    /// Any other platform failure. Never retried.
    #[error("client error: {0}")]
    Client(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the failure class is worth retrying (connect) or silently
    /// skipping (scan pass).
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
