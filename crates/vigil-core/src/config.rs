use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// Typed configuration for the monitor, loaded from the environment (with
/// optional `.env` file).
#[derive(Clone, Debug)]
pub struct Config {
    /// Path to the JSON account registry.
    pub accounts_file: PathBuf,
    /// Key of the account that runs the group/channel monitor.
    pub monitor_account: String,

    /// Time between full direct-message scan passes.
    pub poll_interval: Duration,
    /// How many recent items to list per account per pass.
    pub scan_window: usize,

    /// Connect retry bound for transient failures.
    pub max_connect_attempts: u32,
    /// Fixed wait between connect attempts.
    pub connect_backoff: Duration,

    /// Append-only error log.
    pub log_file: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let accounts_file = env_path("VIGIL_ACCOUNTS").ok_or_else(|| {
            Error::Config("VIGIL_ACCOUNTS environment variable is required".to_string())
        })?;
        let monitor_account = env_str("VIGIL_MONITOR_ACCOUNT")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("VIGIL_MONITOR_ACCOUNT environment variable is required".to_string())
            })?;

        let poll_interval = Duration::from_secs(env_u64("POLL_INTERVAL_SECS").unwrap_or(10));
        let scan_window = env_u64("SCAN_WINDOW").unwrap_or(10) as usize;
        let max_connect_attempts = env_u64("MAX_CONNECT_ATTEMPTS").unwrap_or(3) as u32;
        let connect_backoff = Duration::from_secs(env_u64("CONNECT_BACKOFF_SECS").unwrap_or(2));
        let log_file = env_path("LOG_FILE").unwrap_or_else(|| PathBuf::from("monitor_log.txt"));

        Ok(Self {
            accounts_file,
            monitor_account,
            poll_interval,
            scan_window,
            max_connect_attempts,
            connect_backoff,
            log_file,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
