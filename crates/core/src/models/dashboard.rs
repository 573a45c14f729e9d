use serde::{Deserialize, Serialize};

use super::collection::Collection;
use super::expense::ExpenseRecord;
use super::metrics::DerivedMetrics;

/// Connection lifecycle of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Subscribed, waiting for the first snapshot
    Connecting,
    /// Receiving snapshots
    Live,
    /// Feed failed; a retry is scheduled (`attempt` counts from 1)
    Reconnecting { attempt: u32 },
    /// Could not be set up at all; terminal
    Failed,
    /// Closed by the owner or ended by the source; terminal
    Closed,
}

impl ConnectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Failed | ConnectionState::Closed)
    }
}

/// What presentation may know about one stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamStatus {
    pub collection: Collection,
    pub phase: ConnectionState,

    /// At least one snapshot has been applied
    pub loaded: bool,

    /// Showing stale (or no) data because the stream is in trouble
    pub degraded: bool,

    /// Last problem reported for this stream
    pub message: Option<String>,
}

impl StreamStatus {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            phase: ConnectionState::Connecting,
            loaded: false,
            degraded: false,
            message: None,
        }
    }

    /// Settled streams no longer hold the dashboard in its loading state.
    pub fn is_settled(&self) -> bool {
        self.loaded || self.phase == ConnectionState::Failed
    }
}

/// The observable dashboard: loading flags, per-stream health and metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    /// True until every stream has delivered once (or failed for good)
    pub loading: bool,

    pub expenses: StreamStatus,
    pub subscriptions: StreamStatus,
    pub investments: StreamStatus,

    pub metrics: DerivedMetrics,

    /// Newest expenses first, truncated to the configured limit
    pub recent_expenses: Vec<ExpenseRecord>,

    pub currency_symbol: String,
}

impl DashboardState {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            loading: true,
            expenses: StreamStatus::new(Collection::Expenses),
            subscriptions: StreamStatus::new(Collection::Subscriptions),
            investments: StreamStatus::new(Collection::Investments),
            metrics: DerivedMetrics::default(),
            recent_expenses: Vec::new(),
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn stream(&self, collection: Collection) -> &StreamStatus {
        match collection {
            Collection::Expenses => &self.expenses,
            Collection::Subscriptions => &self.subscriptions,
            Collection::Investments => &self.investments,
        }
    }

    pub fn stream_mut(&mut self, collection: Collection) -> &mut StreamStatus {
        match collection {
            Collection::Expenses => &mut self.expenses,
            Collection::Subscriptions => &mut self.subscriptions,
            Collection::Investments => &mut self.investments,
        }
    }

    pub fn is_degraded(&self) -> bool {
        Collection::ALL.iter().any(|c| self.stream(*c).degraded)
    }

    /// Once false, stays false: later trouble shows as degraded, not as a reload.
    pub(crate) fn refresh_loading(&mut self) {
        if self.loading {
            self.loading = !Collection::ALL.iter().all(|c| self.stream(*c).is_settled());
        }
    }
}
