use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{AccountLoader, ConfigError};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// One credentialed account. Immutable for the life of the process.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub email: String,
    pub user_token: String,
    pub node_id: String,
    pub node_token: String,
}

// Tokens stay out of logs and panic messages.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("email", &self.email)
            .field("node_id", &self.node_id)
            .finish_non_exhaustive()
    }
}

impl Account {
    pub fn new(
        email: impl Into<String>,
        user_token: impl Into<String>,
        node_id: impl Into<String>,
        node_token: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            user_token: user_token.into(),
            node_id: node_id.into(),
            node_token: node_token.into(),
        }
    }

    fn missing_field(&self) -> Option<&'static str> {
        [
            ("email", &self.email),
            ("userToken", &self.user_token),
            ("nodeId", &self.node_id),
            ("nodeToken", &self.node_token),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Reads the ordered account list from a JSON array file.
#[derive(Debug, Clone)]
pub struct JsonAccountLoader {
    path: PathBuf,
}

impl JsonAccountLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AccountLoader for JsonAccountLoader {
    type Account = Account;

    async fn load_accounts(&self) -> Result<Vec<Account>> {
        if !self.path.exists() {
            return Err(ConfigError::FileNotFound {
                path: self.path.display().to_string(),
            }
            .into());
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let accounts: Vec<Account> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid account list in {}", self.path.display()))?;

        if accounts.is_empty() {
            return Err(ConfigError::MissingField {
                field: "accounts".to_string(),
            }
            .into());
        }

        for (index, account) in accounts.iter().enumerate() {
            if let Some(field) = account.missing_field() {
                return Err(ConfigError::InvalidValue {
                    field: format!("accounts[{}].{}", index, field),
                    reason: "must not be empty".to_string(),
                }
                .into());
            }
        }

        info!("Loaded {} accounts from {}", accounts.len(), self.path.display());
        Ok(accounts)
    }
}
