use crate::domain::account::Account;
use crate::domain::ports::GatewayHandle;
use crate::domain::recipient::DirectorySnapshot;
use crate::domain::transaction::{TransactionCache, TransactionId, TransactionRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Immutable snapshot of the synchronized state. Consumers only ever see
/// these copies; nothing outside the synchronizer mutates the caches.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncView {
    /// Last successfully fetched account (address and balance). `None` only
    /// before the first fetch completes.
    pub account: Option<Account>,
    /// The balance shown is a previously fetched value because the latest
    /// refresh attempt failed.
    pub balance_stale: bool,
    /// Everything observed so far, newest first.
    pub transactions: Vec<TransactionRecord>,
    pub history_stale: bool,
    /// Ids first observed by the most recent applied history fetch.
    pub fresh_ids: Vec<TransactionId>,
    pub directory: DirectorySnapshot,
}

/// Per-slice request sequencing. `issued` grows when a fetch starts,
/// `applied` when a completion is accepted; completions carrying a sequence
/// at or below `applied` lost the race and are discarded.
#[derive(Debug, Default)]
struct SliceSeq {
    issued: u64,
    applied: u64,
}

impl SliceSeq {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn try_apply(&mut self, seq: u64) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.applied = seq;
        true
    }
}

#[derive(Default)]
struct SyncState {
    account: Option<Account>,
    balance_stale: bool,
    balance_seq: SliceSeq,
    cache: TransactionCache,
    history_stale: bool,
    history_seq: SliceSeq,
    fresh_ids: Vec<TransactionId>,
    directory: DirectorySnapshot,
    directory_seq: SliceSeq,
}

/// Keeps the local view of one account consistent with the polled backend.
///
/// Each slice (balance, history, directory) refreshes independently: a
/// failure in one leaves the others untouched, and a transient failure
/// leaves that slice's previous data in place behind a stale flag. Cheap to
/// clone; clones share the same state.
#[derive(Clone)]
pub struct StateSynchronizer {
    gateway: GatewayHandle,
    account: Account,
    state: Arc<RwLock<SyncState>>,
}

impl StateSynchronizer {
    /// Starts from the freshly provisioned account, which counts as the
    /// first applied balance fetch.
    pub fn new(gateway: GatewayHandle, account: Account) -> Self {
        let state = SyncState {
            account: Some(account.clone()),
            ..SyncState::default()
        };
        Self {
            gateway,
            account,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Runs one refresh cycle: all three slices fetch concurrently, each
    /// completion is applied (or discarded as stale) independently.
    pub async fn refresh(&self) -> SyncView {
        let (balance_seq, history_seq, directory_seq) = {
            let mut state = self.state.write().await;
            (
                state.balance_seq.issue(),
                state.history_seq.issue(),
                state.directory_seq.issue(),
            )
        };

        let id = &self.account.account_id;
        let (balance, history, directory) = tokio::join!(
            self.gateway.lookup_account(id),
            self.gateway.fetch_transactions(id),
            self.gateway.fetch_directory(),
        );

        {
            let mut state = self.state.write().await;

            if state.balance_seq.try_apply(balance_seq) {
                match balance {
                    Ok(account) => {
                        state.account = Some(account);
                        state.balance_stale = false;
                    }
                    Err(e) => {
                        warn!(error = %e, "balance refresh failed, serving cached value");
                        state.balance_stale = true;
                    }
                }
            } else {
                debug!(seq = balance_seq, "discarding superseded balance completion");
            }

            if state.history_seq.try_apply(history_seq) {
                match history {
                    Ok(page) => {
                        let fresh = state.cache.merge(page);
                        if !fresh.is_empty() {
                            debug!(count = fresh.len(), "observed new transactions");
                        }
                        state.fresh_ids = fresh;
                        state.history_stale = false;
                    }
                    Err(e) => {
                        warn!(error = %e, "history refresh failed, serving cached view");
                        state.history_stale = true;
                    }
                }
            } else {
                debug!(seq = history_seq, "discarding superseded history completion");
            }

            if state.directory_seq.try_apply(directory_seq) {
                match directory {
                    Ok(handles) => state.directory = DirectorySnapshot::new(handles),
                    // The directory keeps its previous snapshot on failure;
                    // suggestions degrade silently.
                    Err(e) => debug!(error = %e, "directory refresh failed"),
                }
            }
        }

        self.current_view().await
    }

    /// Explicit refresh, used by the dispatcher after a successful send and
    /// by any user-triggered reload.
    pub async fn force_sync(&self) -> SyncView {
        self.refresh().await
    }

    pub async fn current_view(&self) -> SyncView {
        let state = self.state.read().await;
        SyncView {
            account: state.account.clone(),
            balance_stale: state.balance_stale,
            transactions: state.cache.records().to_vec(),
            history_stale: state.history_stale,
            fresh_ids: state.fresh_ids.clone(),
            directory: state.directory.clone(),
        }
    }

    /// Spawns the background poll cycle: one refresh immediately, then one
    /// per interval until the handle is dropped or aborted.
    pub fn spawn_polling(&self, interval: Duration) -> JoinHandle<()> {
        let synchronizer = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                synchronizer.refresh().await;
            }
        })
    }
}
