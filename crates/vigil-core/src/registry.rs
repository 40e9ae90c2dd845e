use std::{collections::HashSet, fs, path::Path};

use serde::Deserialize;

use crate::{domain::UserId, errors::Error, Result};

/// One operator-controlled account.
///
/// Loaded from the accounts file. `user_id` is not part of the file: the
/// whitelist builder writes it exactly once after resolving the account's own
/// identity, and it is immutable afterwards.
#[derive(Clone, Debug, Deserialize)]
pub struct Account {
    /// Unique label. Used as the key for the session cache, the dedup cursor
    /// map and console output.
    pub key: String,
    /// Session reference handed to the platform adapter (file stem or opaque
    /// handle; adapter-specific).
    pub session: String,
    pub api_id: i64,
    pub api_hash: String,
    pub phone: String,
    #[serde(skip)]
    pub user_id: Option<UserId>,
}

/// Ordered account registry. File order is scan order.
#[derive(Clone, Debug)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
}

impl AccountRegistry {
    /// Load the registry from a JSON array of account records.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read accounts file {}: {e}", path.display()))
        })?;
        let accounts: Vec<Account> = serde_json::from_str(&raw)?;
        Self::from_accounts(accounts)
    }

    pub fn from_accounts(accounts: Vec<Account>) -> Result<Self> {
        if accounts.is_empty() {
            return Err(Error::Config("account registry is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for acc in &accounts {
            if !seen.insert(acc.key.as_str()) {
                return Err(Error::Config(format!("duplicate account key: {}", acc.key)));
            }
        }
        Ok(Self { accounts })
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn accounts_mut(&mut self) -> &mut [Account] {
        &mut self.accounts
    }

    pub fn get(&self, key: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.key == key)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
