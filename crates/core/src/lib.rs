pub mod errors;
pub mod log;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use models::{
    collection::{Collection, Notification},
    dashboard::{ConnectionState, DashboardState},
    expense::ExpenseRecord,
    investment::InvestmentRecord,
    metrics::DerivedMetrics,
    settings::Settings,
    subscription::SubscriptionRecord,
};
use providers::traits::{ChangeSource, IdentityProvider};
use services::{
    aggregation_service::{recent_expenses, AggregationService},
    resilient_subscription::ResilientSubscription,
    stream_subscription::StreamSubscription,
    StreamUpdate,
};
use storage::record_store::RecordStore;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use errors::CoreError;

/// Main entry point for the finance dashboard core library.
///
/// Owns the three per-user streams, their record stores and the derived
/// state. Everything runs on the caller's task: each update is applied and
/// the metrics recomputed within one `process_next` turn, so no locking is
/// needed. Only the subscriptions stream reconnects on failure; expenses and
/// investments surface errors as degraded state without retrying.
#[must_use]
pub struct FinanceDashboard {
    user_id: String,
    settings: Settings,
    aggregation: AggregationService,
    expenses_stream: Option<StreamSubscription>,
    subscriptions_stream: ResilientSubscription,
    investments_stream: Option<StreamSubscription>,
    expenses: RecordStore<ExpenseRecord>,
    subscriptions: RecordStore<SubscriptionRecord>,
    investments: RecordStore<InvestmentRecord>,
    /// Streams that will not deliver anything more
    finished: HashSet<Collection>,
    state: DashboardState,
    publisher: watch::Sender<DashboardState>,
    closed: bool,
}

impl std::fmt::Debug for FinanceDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinanceDashboard")
            .field("user_id", &self.user_id)
            .field("expenses", &self.expenses.len())
            .field("subscriptions", &self.subscriptions.len())
            .field("investments", &self.investments.len())
            .field("loading", &self.state.loading)
            .field("closed", &self.closed)
            .finish()
    }
}

impl FinanceDashboard {
    /// Open all three streams for the authenticated user.
    ///
    /// Fails with `IdentityUnavailable`, opening nothing, when no user is
    /// signed in. A stream that cannot be set up does not fail the
    /// dashboard: it is reported as failed and the other two carry on.
    pub async fn open(
        identity: &dyn IdentityProvider,
        source: Arc<dyn ChangeSource>,
        settings: Settings,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let user_id = identity
            .current_user_id()
            .ok_or(CoreError::IdentityUnavailable)?;

        let mut state = DashboardState::new(settings.currency_symbol.clone());
        let mut finished = HashSet::new();

        let expenses_stream =
            Self::open_plain(&source, Collection::Expenses, &user_id, &mut state, &mut finished)
                .await;
        let subscriptions_stream = ResilientSubscription::open(
            Arc::clone(&source),
            Collection::Subscriptions,
            &user_id,
            settings.retry_interval(),
        )
        .await;
        state.subscriptions.phase = subscriptions_stream.state();
        if let Some(message) = subscriptions_stream.setup_failure() {
            state.subscriptions.degraded = true;
            state.subscriptions.message = Some(message.to_string());
        }
        let investments_stream = Self::open_plain(
            &source,
            Collection::Investments,
            &user_id,
            &mut state,
            &mut finished,
        )
        .await;

        state.refresh_loading();
        let (publisher, _) = watch::channel(state.clone());
        info!(user = %user_id, source = source.name(), "Dashboard opened");

        Ok(Self {
            user_id,
            settings,
            aggregation: AggregationService::new(),
            expenses_stream,
            subscriptions_stream,
            investments_stream,
            expenses: RecordStore::new(),
            subscriptions: RecordStore::new(),
            investments: RecordStore::new(),
            finished,
            state,
            publisher,
            closed: false,
        })
    }

    async fn open_plain(
        source: &Arc<dyn ChangeSource>,
        collection: Collection,
        user_id: &str,
        state: &mut DashboardState,
        finished: &mut HashSet<Collection>,
    ) -> Option<StreamSubscription> {
        match StreamSubscription::open(Arc::clone(source), collection, user_id).await {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!(%collection, error = %e, "Stream unavailable");
                let status = state.stream_mut(collection);
                status.phase = ConnectionState::Failed;
                status.degraded = true;
                status.message = Some(e.to_string());
                finished.insert(collection);
                None
            }
        }
    }

    // ── Event loop ──────────────────────────────────────────────────

    /// Wait for the next update from any stream, apply it and publish.
    ///
    /// Returns `false` once the dashboard is closed or no stream can
    /// deliver anything more. Cancel-safe.
    pub async fn process_next(&mut self) -> bool {
        if self.closed {
            return false;
        }

        let (collection, update) = {
            let Self {
                expenses_stream,
                subscriptions_stream,
                investments_stream,
                finished,
                ..
            } = self;

            tokio::select! {
                update = next_plain(expenses_stream), if !finished.contains(&Collection::Expenses) => {
                    (Collection::Expenses, update)
                }
                update = subscriptions_stream.next_update(), if !finished.contains(&Collection::Subscriptions) => {
                    (Collection::Subscriptions, update)
                }
                update = next_plain(investments_stream), if !finished.contains(&Collection::Investments) => {
                    (Collection::Investments, update)
                }
                else => return false,
            }
        };

        self.apply(collection, update);
        true
    }

    /// Process updates until `shutdown` resolves or every stream has ended,
    /// then close.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                more = self.process_next() => {
                    if !more {
                        break;
                    }
                }
            }
        }
        self.close();
    }

    fn apply(&mut self, collection: Collection, update: Option<StreamUpdate>) {
        match update {
            None => {
                self.finished.insert(collection);
                let status = self.state.stream_mut(collection);
                if !status.phase.is_terminal() {
                    status.phase = ConnectionState::Closed;
                }
                info!(%collection, "Stream ended");
            }
            Some(StreamUpdate::Snapshot(snapshot)) => {
                let applied = match collection {
                    Collection::Expenses => self.expenses.apply_snapshot(&snapshot),
                    Collection::Subscriptions => self.subscriptions.apply_snapshot(&snapshot),
                    Collection::Investments => self.investments.apply_snapshot(&snapshot),
                };
                let phase = self.phase_of(collection);
                let status = self.state.stream_mut(collection);
                status.phase = phase;
                match applied {
                    Ok(()) => {
                        status.loaded = true;
                        status.degraded = false;
                        status.message = None;
                        self.recompute();
                    }
                    Err(e) => {
                        warn!(%collection, error = %e, "Rejected snapshot");
                        status.degraded = true;
                        status.message = Some(e.to_string());
                    }
                }
            }
            Some(StreamUpdate::Degraded(message)) => {
                let phase = self.phase_of(collection);
                let status = self.state.stream_mut(collection);
                status.phase = phase;
                status.degraded = true;
                status.message = Some(message);
            }
            Some(StreamUpdate::Failed(message)) => {
                let status = self.state.stream_mut(collection);
                status.phase = ConnectionState::Failed;
                status.degraded = true;
                status.message = Some(message);
            }
        }

        self.state.refresh_loading();
        self.publish();
    }

    fn phase_of(&self, collection: Collection) -> ConnectionState {
        match collection {
            Collection::Subscriptions => self.subscriptions_stream.state(),
            // Plain streams never retry: once they have spoken they stay live.
            _ => ConnectionState::Live,
        }
    }

    /// Full recomputation from the current stores; nothing is carried over.
    fn recompute(&mut self) {
        self.state.metrics = self.aggregation.compute(
            self.expenses.records(),
            self.subscriptions.records(),
            self.investments.records(),
        );
        self.state.recent_expenses = recent_expenses(
            self.expenses.records(),
            self.settings.recent_transactions_limit,
        );
        debug!(
            net_worth = %self.state.metrics.net_worth,
            total_expenses = %self.state.metrics.total_expenses,
            "Recomputed metrics"
        );
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }

    // ── Teardown ────────────────────────────────────────────────────

    /// Close all three streams exactly once and cancel any pending retry.
    /// Later calls are no-ops.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        if let Some(mut stream) = self.expenses_stream.take() {
            stream.close();
        }
        self.subscriptions_stream.close();
        if let Some(mut stream) = self.investments_stream.take() {
            stream.close();
        }

        for collection in Collection::ALL {
            self.finished.insert(collection);
            let status = self.state.stream_mut(collection);
            if !status.phase.is_terminal() {
                status.phase = ConnectionState::Closed;
            }
        }
        self.closed = true;
        self.publish();
        info!(user = %self.user_id, "Dashboard closed");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ── Read-only views ─────────────────────────────────────────────

    #[must_use]
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Observer handle that sees every published state.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<DashboardState> {
        self.publisher.subscribe()
    }

    #[must_use]
    pub fn metrics(&self) -> &DerivedMetrics {
        &self.state.metrics
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    #[must_use]
    pub fn expenses(&self) -> &[ExpenseRecord] {
        self.expenses.records()
    }

    #[must_use]
    pub fn subscriptions(&self) -> &[SubscriptionRecord] {
        self.subscriptions.records()
    }

    #[must_use]
    pub fn investments(&self) -> &[InvestmentRecord] {
        self.investments.records()
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Adapt a non-retrying stream to the update contract. Errors become
/// `Degraded`; the stream keeps listening.
async fn next_plain(stream: &mut Option<StreamSubscription>) -> Option<StreamUpdate> {
    let stream = stream.as_mut()?;
    match stream.next().await? {
        Notification::Snapshot(snapshot) => Some(StreamUpdate::Snapshot(snapshot)),
        Notification::Error(message) => Some(StreamUpdate::Degraded(message)),
    }
}
