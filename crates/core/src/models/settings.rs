use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::CoreError;

/// Default fixed delay between reconnect attempts.
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 5_000;

/// Default number of rows in the recent transactions view.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Dashboard configuration. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Fixed delay before re-subscribing a failed stream (no backoff growth).
    pub retry_interval_ms: u64,

    /// How many expenses the "recent transactions" view holds.
    pub recent_transactions_limit: usize,

    /// Display hint forwarded to presentation.
    pub currency_symbol: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            recent_transactions_limit: DEFAULT_RECENT_LIMIT,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a (possibly partial) JSON document and validate them.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.retry_interval_ms == 0 {
            return Err(CoreError::InvalidSettings(
                "retryIntervalMs must be greater than zero".into(),
            ));
        }
        if self.recent_transactions_limit == 0 {
            return Err(CoreError::InvalidSettings(
                "recentTransactionsLimit must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}
