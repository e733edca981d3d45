//! Catalog state store.
//!
//! The store owns the state the views read and the actions that refresh it.
//! Actions never return errors: failures are turned into notifications at
//! the action boundary, and the state keeps its previous values.

use operadoras_domain::{Cnpj, Despesa, DomainError, DomainResult, ListQuery};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::request_tracker::{RequestToken, RequestTracker};
use super::state::CatalogState;
use crate::ports::{
    CatalogAction, CatalogGateway, Clock, GatewayError, Notification, NotificationSink,
};

/// Result of one store action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was written into the state.
    Committed,
    /// The request failed and a notification was sent.
    Failed,
    /// A newer request for the same slot was issued; the result was dropped.
    Superseded,
}

impl FetchOutcome {
    /// Returns true if the state was updated.
    #[must_use]
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Presentation state and fetch actions for the operadoras catalog.
///
/// Constructed explicitly with its collaborators and shared by reference
/// (or `Arc`) with the views. Each instance owns its state exclusively.
pub struct CatalogStore<G, N, C> {
    gateway: G,
    notifier: N,
    clock: C,
    state: watch::Sender<CatalogState>,
    list_requests: RequestTracker,
    statistics_requests: RequestTracker,
    detail_requests: RequestTracker,
    filter_requests: RequestTracker,
}

/// Releases `loading` when the list request that owns it ends, however
/// it ends. Only the latest request may release the flag.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<CatalogState>,
    tracker: &'a RequestTracker,
    token: RequestToken,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let tracker = self.tracker;
        let token = self.token;
        self.state.send_if_modified(|state| {
            if state.loading && tracker.is_current(token) {
                state.loading = false;
                true
            } else {
                false
            }
        });
    }
}

impl<G: CatalogGateway, N: NotificationSink, C: Clock> CatalogStore<G, N, C> {
    /// Creates a store with default state.
    pub fn new(gateway: G, notifier: N, clock: C) -> Self {
        Self::with_state(gateway, notifier, clock, CatalogState::default())
    }

    /// Creates a store starting from the given state.
    pub fn with_state(gateway: G, notifier: N, clock: C, initial: CatalogState) -> Self {
        Self {
            gateway,
            notifier,
            clock,
            state: watch::Sender::new(initial),
            list_requests: RequestTracker::new(),
            statistics_requests: RequestTracker::new(),
            detail_requests: RequestTracker::new(),
            filter_requests: RequestTracker::new(),
        }
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes. Every commit wakes the receiver.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    /// Returns true while the latest list request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    // ---------------------------------------------------------------
    // Parameters. Changing them never fetches; call `fetch_operadoras`.
    // ---------------------------------------------------------------

    /// Moves to the given page.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPage` for page 0; the state is unchanged.
    pub fn set_page(&self, page: u32) -> DomainResult<()> {
        let mut result = Ok(());
        self.state.send_if_modified(|state| {
            let before = state.query.page();
            result = state.query.set_page(page);
            state.query.page() != before
        });
        result
    }

    /// Changes the page size and goes back to the first page.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidLimit` for a limit of 0; the state is unchanged.
    pub fn set_limit(&self, limit: u32) -> DomainResult<()> {
        if limit == 0 {
            return Err(DomainError::InvalidLimit(limit));
        }
        self.state.send_if_modified(|state| {
            if state.query.limit() == limit {
                return false;
            }
            let changed = state.query.set_limit(limit).is_ok();
            if changed {
                reset_page(&mut state.query);
            }
            changed
        });
        Ok(())
    }

    /// Changes the search text. A different text goes back to the first page.
    pub fn set_search(&self, search: impl Into<String>) {
        let search = search.into();
        self.state.send_if_modified(|state| {
            if state.query.search == search {
                return false;
            }
            state.query.search = search;
            reset_page(&mut state.query);
            true
        });
    }

    /// Changes the federative unit filter. A different value goes back to the first page.
    pub fn set_uf(&self, uf: Option<String>) {
        self.state.send_if_modified(|state| {
            if state.query.uf == uf {
                return false;
            }
            state.query.uf = uf;
            reset_page(&mut state.query);
            true
        });
    }

    /// Changes the display name filter. A different value goes back to the first page.
    pub fn set_razao_social(&self, razao_social: Option<String>) {
        self.state.send_if_modified(|state| {
            if state.query.razao_social == razao_social {
                return false;
            }
            state.query.razao_social = razao_social;
            reset_page(&mut state.query);
            true
        });
    }

    /// Advances one page, up to the last page known from `total`.
    ///
    /// Returns true if the page changed.
    pub fn next_page(&self) -> bool {
        self.state.send_if_modified(|state| {
            let next = state.page().saturating_add(1);
            next <= state.total_pages() && state.query.set_page(next).is_ok()
        })
    }

    /// Goes back one page, stopping at the first.
    ///
    /// Returns true if the page changed.
    pub fn previous_page(&self) -> bool {
        self.state.send_if_modified(|state| {
            let page = state.page();
            page > 1 && state.query.set_page(page - 1).is_ok()
        })
    }

    // ---------------------------------------------------------------
    // Actions
    // ---------------------------------------------------------------

    /// Loads the page described by the current query.
    ///
    /// `loading` is raised for the duration of the request. On success
    /// `operadoras` and `total` are replaced in one commit; on failure they
    /// are left untouched and a notification is sent. A response that
    /// resolves after a newer list request was issued is discarded.
    pub async fn fetch_operadoras(&self) -> FetchOutcome {
        let token = self.list_requests.issue();
        let mut query = ListQuery::default();
        self.state.send_modify(|state| {
            state.loading = true;
            query = state.query.clone();
        });
        let _guard = LoadingGuard {
            state: &self.state,
            tracker: &self.list_requests,
            token,
        };
        debug!(
            request = token.sequence(),
            page = query.page(),
            limit = query.limit(),
            search = %query.search,
            "fetching operadoras"
        );

        match self.gateway.list_operadoras(&query).await {
            Ok(page) => {
                let mut items = page.items;
                let limit = usize::try_from(query.limit()).unwrap_or(usize::MAX);
                if items.len() > limit {
                    warn!(
                        received = items.len(),
                        limit, "server returned more items than requested, truncating"
                    );
                    items.truncate(limit);
                }
                let total = page.total;
                self.commit(&self.list_requests, token, CatalogAction::ListOperadoras, |state| {
                    state.operadoras = items;
                    state.total = total;
                    state.loading = false;
                })
            }
            Err(error) => self.fail(&self.list_requests, token, CatalogAction::ListOperadoras, &error),
        }
    }

    /// Loads the statistics and rebuilds the chart series from its ranking.
    ///
    /// When the response carries no ranking the previous series is kept.
    pub async fn fetch_estatisticas(&self) -> FetchOutcome {
        let token = self.statistics_requests.issue();
        debug!(request = token.sequence(), "fetching estatisticas");

        match self.gateway.get_statistics().await {
            Ok(statistics) => {
                let series = statistics.chart_series();
                self.commit(&self.statistics_requests, token, CatalogAction::Estatisticas, |state| {
                    if let Some(series) = series {
                        state.top_derived = series;
                    }
                    state.statistics = Some(statistics);
                })
            }
            Err(error) => self.fail(
                &self.statistics_requests,
                token,
                CatalogAction::Estatisticas,
                &error,
            ),
        }
    }

    /// Returns the despesa history of any operadora without touching the state.
    ///
    /// Never fails: an invalid CNPJ or a failed request sends a notification
    /// and yields an empty history.
    pub async fn fetch_despesas(&self, cnpj: &str) -> Vec<Despesa> {
        let cnpj = match Cnpj::new(cnpj) {
            Ok(cnpj) => cnpj,
            Err(error) => {
                self.reject(CatalogAction::Despesas, &error);
                return Vec::new();
            }
        };
        debug!(%cnpj, "fetching despesas");

        match self.gateway.get_despesas(&cnpj).await {
            Ok(despesas) => despesas,
            Err(error) => {
                self.report(CatalogAction::Despesas, &error);
                Vec::new()
            }
        }
    }

    /// Loads one operadora and its despesas, then shows them together.
    ///
    /// On failure the previous selection stays in place.
    pub async fn select_operadora(&self, cnpj: &str) -> FetchOutcome {
        let token = self.detail_requests.issue();
        let cnpj = match Cnpj::new(cnpj) {
            Ok(cnpj) => cnpj,
            Err(error) => {
                self.reject(CatalogAction::OperadoraDetail, &error);
                return FetchOutcome::Failed;
            }
        };
        debug!(request = token.sequence(), %cnpj, "fetching operadora detail");

        let (detail, despesas) = tokio::join!(
            self.gateway.get_operadora(&cnpj),
            self.gateway.get_despesas(&cnpj)
        );
        match detail.and_then(|detail| despesas.map(|despesas| (detail, despesas))) {
            Ok((detail, despesas)) => {
                self.commit(&self.detail_requests, token, CatalogAction::OperadoraDetail, |state| {
                    state.selected = Some(detail);
                    state.despesas = despesas;
                })
            }
            Err(error) => self.fail(
                &self.detail_requests,
                token,
                CatalogAction::OperadoraDetail,
                &error,
            ),
        }
    }

    /// Loads the values offered by the federative unit and name filters.
    pub async fn fetch_filter_options(&self) -> FetchOutcome {
        let token = self.filter_requests.issue();
        debug!(request = token.sequence(), "fetching filter options");

        let (ufs, razoes_sociais) = tokio::join!(
            self.gateway.list_ufs(),
            self.gateway.list_razoes_sociais()
        );
        match ufs.and_then(|ufs| razoes_sociais.map(|names| (ufs, names))) {
            Ok((ufs, razoes_sociais)) => {
                self.commit(&self.filter_requests, token, CatalogAction::FilterOptions, |state| {
                    state.ufs = ufs;
                    state.razoes_sociais = razoes_sociais;
                })
            }
            Err(error) => self.fail(
                &self.filter_requests,
                token,
                CatalogAction::FilterOptions,
                &error,
            ),
        }
    }

    /// Probes the API. Returns false, after notifying, when it is unavailable.
    pub async fn check_health(&self) -> bool {
        match self.gateway.health().await {
            Ok(()) => true,
            Err(error) => {
                self.report(CatalogAction::Health, &error);
                false
            }
        }
    }

    // ---------------------------------------------------------------
    // Commit and failure plumbing
    // ---------------------------------------------------------------

    fn commit(
        &self,
        tracker: &RequestTracker,
        token: RequestToken,
        action: CatalogAction,
        apply: impl FnOnce(&mut CatalogState),
    ) -> FetchOutcome {
        let committed = self.state.send_if_modified(|state| {
            if tracker.is_current(token) {
                apply(state);
                true
            } else {
                false
            }
        });
        if committed {
            debug!(%action, request = token.sequence(), "committed");
            FetchOutcome::Committed
        } else {
            debug!(%action, request = token.sequence(), "discarding superseded response");
            FetchOutcome::Superseded
        }
    }

    fn fail(
        &self,
        tracker: &RequestTracker,
        token: RequestToken,
        action: CatalogAction,
        error: &GatewayError,
    ) -> FetchOutcome {
        if !tracker.is_current(token) {
            debug!(%action, request = token.sequence(), %error, "discarding superseded failure");
            return FetchOutcome::Superseded;
        }
        self.report(action, error);
        FetchOutcome::Failed
    }

    fn report(&self, action: CatalogAction, error: &GatewayError) {
        warn!(%action, %error, "catalog action failed");
        self.notifier.notify(Notification::from_gateway_error(
            action,
            error,
            self.clock.now(),
        ));
    }

    fn reject(&self, action: CatalogAction, error: &DomainError) {
        warn!(%action, %error, "catalog action rejected");
        self.notifier.notify(Notification::from_domain_error(
            action,
            error,
            self.clock.now(),
        ));
    }
}

fn reset_page(query: &mut ListQuery) {
    // Page 1 is always valid.
    let _ = query.set_page(1);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use operadoras_domain::{
        FailureKind, Operadora, OperadoraPage, Statistics, TopOperadora,
    };
    use pretty_assertions::assert_eq;

    type ListReply = (Duration, Result<OperadoraPage, GatewayError>);

    #[derive(Default)]
    struct StubGateway {
        pages: Mutex<HashMap<String, ListReply>>,
        statistics: Mutex<Option<Result<Statistics, GatewayError>>>,
        despesas: Mutex<Option<Result<Vec<Despesa>, GatewayError>>>,
        detail: Mutex<Option<Result<Operadora, GatewayError>>>,
        list_calls: Mutex<Vec<ListQuery>>,
        despesa_calls: Mutex<Vec<Cnpj>>,
    }

    impl StubGateway {
        fn reply_to_search(
            &self,
            search: &str,
            delay: Duration,
            reply: Result<OperadoraPage, GatewayError>,
        ) {
            let mut pages = self.pages.lock().expect("Lock poisoned");
            pages.insert(search.to_string(), (delay, reply));
        }

        fn reply_statistics(&self, reply: Result<Statistics, GatewayError>) {
            *self.statistics.lock().expect("Lock poisoned") = Some(reply);
        }

        fn reply_despesas(&self, reply: Result<Vec<Despesa>, GatewayError>) {
            *self.despesas.lock().expect("Lock poisoned") = Some(reply);
        }

        fn reply_detail(&self, reply: Result<Operadora, GatewayError>) {
            *self.detail.lock().expect("Lock poisoned") = Some(reply);
        }

        fn list_call_count(&self) -> usize {
            self.list_calls.lock().expect("Lock poisoned").len()
        }

        fn despesa_call_count(&self) -> usize {
            self.despesa_calls.lock().expect("Lock poisoned").len()
        }
    }

    fn unstubbed() -> GatewayError {
        GatewayError::Transport {
            message: "no stub configured".to_string(),
        }
    }

    #[async_trait]
    impl CatalogGateway for StubGateway {
        async fn list_operadoras(&self, query: &ListQuery) -> Result<OperadoraPage, GatewayError> {
            self.list_calls
                .lock()
                .expect("Lock poisoned")
                .push(query.clone());
            let reply = self
                .pages
                .lock()
                .expect("Lock poisoned")
                .get(&query.search)
                .cloned();
            let Some((delay, result)) = reply else {
                return Err(unstubbed());
            };
            tokio::time::sleep(delay).await;
            result
        }

        async fn get_statistics(&self) -> Result<Statistics, GatewayError> {
            let reply = self.statistics.lock().expect("Lock poisoned").clone();
            reply.unwrap_or_else(|| Err(unstubbed()))
        }

        async fn get_despesas(&self, cnpj: &Cnpj) -> Result<Vec<Despesa>, GatewayError> {
            self.despesa_calls
                .lock()
                .expect("Lock poisoned")
                .push(cnpj.clone());
            let reply = self.despesas.lock().expect("Lock poisoned").clone();
            reply.unwrap_or_else(|| Err(unstubbed()))
        }

        async fn get_operadora(&self, _cnpj: &Cnpj) -> Result<Operadora, GatewayError> {
            let reply = self.detail.lock().expect("Lock poisoned").clone();
            reply.unwrap_or_else(|| Err(unstubbed()))
        }

        async fn list_ufs(&self) -> Result<Vec<String>, GatewayError> {
            Ok(vec!["RJ".to_string(), "SP".to_string()])
        }

        async fn list_razoes_sociais(&self) -> Result<Vec<String>, GatewayError> {
            Ok(vec!["ACME SAUDE".to_string()])
        }

        async fn health(&self) -> Result<(), GatewayError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        notifications: Mutex<Vec<Notification>>,
    }

    impl RecordingSink {
        fn all(&self) -> Vec<Notification> {
            self.notifications.lock().expect("Lock poisoned").clone()
        }
    }

    impl NotificationSink for RecordingSink {
        fn notify(&self, notification: Notification) {
            self.notifications
                .lock()
                .expect("Lock poisoned")
                .push(notification);
        }
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
        }
    }

    type TestStore = CatalogStore<Arc<StubGateway>, Arc<RecordingSink>, FixedClock>;

    fn test_store() -> (Arc<TestStore>, Arc<StubGateway>, Arc<RecordingSink>) {
        test_store_with(CatalogState::default())
    }

    fn test_store_with(
        initial: CatalogState,
    ) -> (Arc<TestStore>, Arc<StubGateway>, Arc<RecordingSink>) {
        let gateway = Arc::new(StubGateway::default());
        let sink = Arc::new(RecordingSink::default());
        let store = CatalogStore::with_state(
            Arc::clone(&gateway),
            Arc::clone(&sink),
            FixedClock,
            initial,
        );
        (Arc::new(store), gateway, sink)
    }

    fn page(names: &[&str], total: u64) -> OperadoraPage {
        let items = names
            .iter()
            .enumerate()
            .map(|(i, name)| Operadora::new(format!("{i:014}"), *name))
            .collect();
        OperadoraPage::new(items, total)
    }

    fn names(state: &CatalogState) -> Vec<String> {
        state
            .operadoras
            .iter()
            .map(|o| o.razao_social.clone())
            .collect()
    }

    const fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    async fn wait_for_list_calls(gateway: &StubGateway, count: usize) {
        while gateway.list_call_count() < count {
            tokio::task::yield_now().await;
        }
    }

    // -------------------------------------------------------------------
    // fetch_operadoras
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_fetch_operadoras_commits_page_and_total() {
        let (store, gateway, sink) = test_store();
        gateway.reply_to_search("", Duration::ZERO, Ok(page(&["A", "B"], 2)));

        let outcome = store.fetch_operadoras().await;

        assert_eq!(outcome, FetchOutcome::Committed);
        let state = store.snapshot();
        assert_eq!(names(&state), vec!["A", "B"]);
        assert_eq!(state.total, 2);
        assert!(!state.loading);
        assert!(sink.all().is_empty());

        let calls = gateway.list_calls.lock().expect("Lock poisoned").clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].page(), 1);
        assert_eq!(calls[0].limit(), 10);
        assert_eq!(calls[0].search, "");
    }

    #[tokio::test]
    async fn test_http_error_keeps_previous_page() {
        let (store, gateway, sink) = test_store();
        gateway.reply_to_search("", Duration::ZERO, Ok(page(&["A", "B"], 2)));
        store.fetch_operadoras().await;

        gateway.reply_to_search(
            "",
            Duration::ZERO,
            Err(GatewayError::from_status(500, "/api/operadoras/", "boom")),
        );
        let outcome = store.fetch_operadoras().await;

        assert_eq!(outcome, FetchOutcome::Failed);
        let state = store.snapshot();
        assert_eq!(names(&state), vec!["A", "B"]);
        assert_eq!(state.total, 2);
        assert!(!state.loading);

        let notifications = sink.all();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].action, CatalogAction::ListOperadoras);
        assert_eq!(notifications[0].kind, FailureKind::HttpStatus);
        assert_eq!(notifications[0].status, Some(500));
        assert_eq!(notifications[0].raised_at, FixedClock.now());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_request_wins_when_older_resolves_last() {
        let (store, gateway, sink) = test_store();
        gateway.reply_to_search("x", ms(100), Ok(page(&["X1", "X2", "X3"], 3)));
        gateway.reply_to_search("y", ms(10), Ok(page(&["Y1"], 1)));

        store.set_search("x");
        let slow = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.fetch_operadoras().await }
        });
        wait_for_list_calls(&gateway, 1).await;

        store.set_search("y");
        let fast = store.fetch_operadoras().await;
        let slow = slow.await.expect("task should not panic");

        assert_eq!(fast, FetchOutcome::Committed);
        assert_eq!(slow, FetchOutcome::Superseded);
        let state = store.snapshot();
        assert_eq!(names(&state), vec!["Y1"]);
        assert_eq!(state.total, 1);
        assert!(!state.loading);
        assert!(sink.all().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_response_is_dropped_while_newer_is_in_flight() {
        let (store, gateway, _sink) = test_store();
        gateway.reply_to_search("a", ms(10), Ok(page(&["A1"], 1)));
        gateway.reply_to_search("b", ms(100), Ok(page(&["B1", "B2"], 2)));

        store.set_search("a");
        let first = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.fetch_operadoras().await }
        });
        wait_for_list_calls(&gateway, 1).await;

        store.set_search("b");
        let second = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.fetch_operadoras().await }
        });
        wait_for_list_calls(&gateway, 2).await;

        assert_eq!(
            first.await.expect("task should not panic"),
            FetchOutcome::Superseded
        );
        // The newer request still owns the flag.
        assert!(store.is_loading());
        assert!(store.snapshot().operadoras.is_empty());

        assert_eq!(
            second.await.expect("task should not panic"),
            FetchOutcome::Committed
        );
        let state = store.snapshot();
        assert_eq!(names(&state), vec!["B1", "B2"]);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_failure_is_not_notified() {
        let (store, gateway, sink) = test_store();
        gateway.reply_to_search(
            "x",
            ms(100),
            Err(GatewayError::Timeout { timeout_ms: 100 }),
        );
        gateway.reply_to_search("y", ms(10), Ok(page(&["Y1"], 1)));

        store.set_search("x");
        let slow = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.fetch_operadoras().await }
        });
        wait_for_list_calls(&gateway, 1).await;
        store.set_search("y");
        store.fetch_operadoras().await;

        assert_eq!(
            slow.await.expect("task should not panic"),
            FetchOutcome::Superseded
        );
        assert!(sink.all().is_empty());
        assert_eq!(names(&store.snapshot()), vec!["Y1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_is_raised_only_while_in_flight() {
        let (store, gateway, _sink) = test_store();
        gateway.reply_to_search("", ms(50), Ok(page(&["A"], 1)));
        assert!(!store.is_loading());

        let task = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.fetch_operadoras().await }
        });
        wait_for_list_calls(&gateway, 1).await;
        assert!(store.is_loading());

        task.await.expect("task should not panic");
        assert!(!store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_is_released_after_failure() {
        let (store, gateway, sink) = test_store();
        gateway.reply_to_search(
            "",
            ms(50),
            Err(GatewayError::Transport {
                message: "connection refused".to_string(),
            }),
        );

        let task = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.fetch_operadoras().await }
        });
        wait_for_list_calls(&gateway, 1).await;
        assert!(store.is_loading());

        assert_eq!(
            task.await.expect("task should not panic"),
            FetchOutcome::Failed
        );
        assert!(!store.is_loading());
        assert_eq!(sink.all().len(), 1);
        assert_eq!(sink.all()[0].kind, FailureKind::Transport);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_request_releases_loading() {
        let (store, gateway, sink) = test_store();
        gateway.reply_to_search("", Duration::from_secs(5), Ok(page(&["A"], 1)));

        let result = tokio::time::timeout(ms(10), store.fetch_operadoras()).await;

        assert!(result.is_err());
        assert!(!store.is_loading());
        assert!(store.snapshot().operadoras.is_empty());
        assert!(sink.all().is_empty());
    }

    #[tokio::test]
    async fn test_page_never_exceeds_limit() {
        let (store, gateway, _sink) = test_store();
        store.set_limit(2).expect("valid limit");
        gateway.reply_to_search("", Duration::ZERO, Ok(page(&["A", "B", "C"], 3)));

        store.fetch_operadoras().await;

        let state = store.snapshot();
        assert_eq!(names(&state), vec!["A", "B"]);
        assert_eq!(state.total, 3);
    }

    #[tokio::test]
    async fn test_subscriber_sees_page_and_total_together() {
        let (store, gateway, _sink) = test_store();
        let mut receiver = store.subscribe();
        gateway.reply_to_search("", Duration::ZERO, Ok(page(&["A"], 7)));

        store.fetch_operadoras().await;

        assert!(receiver.has_changed().expect("store alive"));
        let seen = receiver.borrow_and_update().clone();
        assert_eq!(seen.total, 7);
        assert_eq!(names(&seen), vec!["A"]);
        assert!(!seen.loading);
    }

    // -------------------------------------------------------------------
    // Parameters
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_parameter_changes_do_not_fetch() {
        let (store, gateway, _sink) = test_store();

        store.set_search("saude");
        store.set_page(2).expect("valid page");
        store.set_uf(Some("SP".to_string()));

        assert_eq!(gateway.list_call_count(), 0);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_new_search_resets_page() {
        let (store, _gateway, _sink) = test_store();
        store.set_page(3).expect("valid page");

        store.set_search("abc");
        assert_eq!(store.snapshot().page(), 1);

        store.set_page(2).expect("valid page");
        store.set_search("abc");
        assert_eq!(store.snapshot().page(), 2);

        store.set_razao_social(Some("ACME".to_string()));
        assert_eq!(store.snapshot().page(), 1);
    }

    #[tokio::test]
    async fn test_new_limit_resets_page() {
        let (store, _gateway, _sink) = test_store();
        store.set_page(4).expect("valid page");

        store.set_limit(10).expect("valid limit");
        assert_eq!(store.snapshot().page(), 4);

        store.set_limit(25).expect("valid limit");
        let state = store.snapshot();
        assert_eq!(state.page(), 1);
        assert_eq!(state.limit(), 25);
    }

    #[tokio::test]
    async fn test_invalid_parameters_are_rejected() {
        let (store, _gateway, _sink) = test_store();

        assert_eq!(store.set_page(0), Err(DomainError::InvalidPage(0)));
        assert_eq!(store.set_limit(0), Err(DomainError::InvalidLimit(0)));

        let state = store.snapshot();
        assert_eq!(state.page(), 1);
        assert_eq!(state.limit(), 10);
    }

    #[tokio::test]
    async fn test_page_navigation_is_clamped_to_total() {
        let initial = CatalogState {
            total: 25,
            ..CatalogState::default()
        };
        let (store, _gateway, _sink) = test_store_with(initial);

        assert!(!store.previous_page());
        assert!(store.next_page());
        assert!(store.next_page());
        assert!(!store.next_page());
        assert_eq!(store.snapshot().page(), 3);
        assert!(store.previous_page());
        assert_eq!(store.snapshot().page(), 2);
    }

    // -------------------------------------------------------------------
    // fetch_estatisticas
    // -------------------------------------------------------------------

    fn ranking(n: usize) -> Vec<TopOperadora> {
        (0..n)
            .map(|i| TopOperadora::new(format!("OP {i}"), 100.0 * (n - i) as f64))
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_estatisticas_derives_top_five_in_rank_order() {
        let (store, gateway, _sink) = test_store();
        gateway.reply_statistics(Ok(Statistics::with_ranking(ranking(7))));

        let outcome = store.fetch_estatisticas().await;

        assert_eq!(outcome, FetchOutcome::Committed);
        let state = store.snapshot();
        assert!(state.statistics.is_some());
        let labels: Vec<_> = state.top_derived.iter().map(|p| p.label.clone()).collect();
        assert_eq!(labels, vec!["OP 0", "OP 1", "OP 2", "OP 3", "OP 4"]);
        assert!((state.top_derived[0].amount - 700.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_statistics_without_ranking_keeps_previous_series() {
        let (store, gateway, _sink) = test_store();
        gateway.reply_statistics(Ok(Statistics::with_ranking(ranking(2))));
        store.fetch_estatisticas().await;

        let mut without_ranking = Statistics::with_ranking(Vec::new());
        without_ranking.top5_operadoras = None;
        without_ranking
            .fields
            .insert("total_despesas".to_string(), serde_json::json!(1.0));
        gateway.reply_statistics(Ok(without_ranking));
        store.fetch_estatisticas().await;

        let state = store.snapshot();
        assert_eq!(state.top_derived.len(), 2);
        assert_eq!(
            state.statistics.and_then(|s| s.total_despesas()),
            Some(1.0)
        );
    }

    #[tokio::test]
    async fn test_statistics_failure_keeps_previous_values() {
        let (store, gateway, sink) = test_store();
        gateway.reply_statistics(Ok(Statistics::with_ranking(ranking(3))));
        store.fetch_estatisticas().await;
        let before = store.snapshot();

        gateway.reply_statistics(Err(GatewayError::Decode {
            message: "missing field `top5_operadoras`".to_string(),
        }));
        let outcome = store.fetch_estatisticas().await;

        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(store.snapshot(), before);
        let notifications = sink.all();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].action, CatalogAction::Estatisticas);
        assert_eq!(notifications[0].kind, FailureKind::Decode);
    }

    // -------------------------------------------------------------------
    // fetch_despesas
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_fetch_despesas_returns_history_without_touching_state() {
        let (store, gateway, sink) = test_store();
        gateway.reply_despesas(Ok(vec![
            Despesa::new(2024, 1, 10.0),
            Despesa::new(2024, 2, 20.0),
        ]));
        let before = store.snapshot();

        let despesas = store.fetch_despesas("12345678000190").await;

        assert_eq!(despesas.len(), 2);
        assert_eq!(store.snapshot(), before);
        assert!(sink.all().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_despesas_transport_failure_returns_empty() {
        let (store, gateway, sink) = test_store();
        gateway.reply_despesas(Err(GatewayError::Transport {
            message: "network unreachable".to_string(),
        }));

        let despesas = store.fetch_despesas("12345678000190").await;

        assert!(despesas.is_empty());
        let notifications = sink.all();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].action, CatalogAction::Despesas);
        assert_eq!(notifications[0].kind, FailureKind::Transport);
    }

    #[tokio::test]
    async fn test_fetch_despesas_not_found_is_distinguishable() {
        let (store, gateway, sink) = test_store();
        gateway.reply_despesas(Err(GatewayError::from_status(
            404,
            "/api/operadoras/999/despesas/",
            "",
        )));

        let despesas = store.fetch_despesas("999").await;

        assert!(despesas.is_empty());
        assert_eq!(sink.all()[0].kind, FailureKind::NotFound);
        assert_eq!(sink.all()[0].status, Some(404));
    }

    #[tokio::test]
    async fn test_fetch_despesas_rejects_blank_cnpj_without_request() {
        let (store, gateway, sink) = test_store();

        let despesas = store.fetch_despesas("   ").await;

        assert!(despesas.is_empty());
        assert_eq!(gateway.despesa_call_count(), 0);
        assert_eq!(sink.all()[0].kind, FailureKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_dot_segment_cnpj_never_reaches_the_gateway() {
        let (store, gateway, sink) = test_store();

        assert!(store.fetch_despesas("..").await.is_empty());
        assert_eq!(store.select_operadora(".").await, FetchOutcome::Failed);

        assert_eq!(gateway.despesa_call_count(), 0);
        let kinds: Vec<_> = sink.all().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![FailureKind::InvalidRequest; 2]);
        assert!(store.snapshot().selected.is_none());
    }

    // -------------------------------------------------------------------
    // Detail, filters, health
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_select_operadora_commits_detail_with_despesas() {
        let (store, gateway, _sink) = test_store();
        gateway.reply_detail(Ok(Operadora::new("123", "ACME SAUDE").with_uf("SP")));
        gateway.reply_despesas(Ok(vec![Despesa::new(2023, 4, 5.0)]));

        let outcome = store.select_operadora("123").await;

        assert_eq!(outcome, FetchOutcome::Committed);
        let state = store.snapshot();
        assert_eq!(
            state.selected.map(|o| o.razao_social),
            Some("ACME SAUDE".to_string())
        );
        assert_eq!(state.despesas.len(), 1);
    }

    #[tokio::test]
    async fn test_select_operadora_failure_keeps_selection() {
        let (store, gateway, sink) = test_store();
        gateway.reply_detail(Ok(Operadora::new("123", "ACME SAUDE")));
        gateway.reply_despesas(Ok(vec![Despesa::new(2023, 4, 5.0)]));
        store.select_operadora("123").await;

        gateway.reply_detail(Err(GatewayError::from_status(
            404,
            "/api/operadoras/456",
            "",
        )));
        let outcome = store.select_operadora("456").await;

        assert_eq!(outcome, FetchOutcome::Failed);
        let state = store.snapshot();
        assert_eq!(state.selected.map(|o| o.cnpj), Some("123".to_string()));
        assert_eq!(state.despesas.len(), 1);
        assert_eq!(sink.all()[0].action, CatalogAction::OperadoraDetail);
        assert_eq!(sink.all()[0].kind, FailureKind::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_filter_options() {
        let (store, _gateway, _sink) = test_store();

        let outcome = store.fetch_filter_options().await;

        assert!(outcome.is_committed());
        let state = store.snapshot();
        assert_eq!(state.ufs, vec!["RJ", "SP"]);
        assert_eq!(state.razoes_sociais, vec!["ACME SAUDE"]);
    }

    #[tokio::test]
    async fn test_check_health() {
        let (store, _gateway, sink) = test_store();
        assert!(store.check_health().await);
        assert!(sink.all().is_empty());
    }
}
