#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use telewallet::domain::account::{Account, AccountId, Balance};
use telewallet::domain::ports::{BackendGateway, TransferRequest};
use telewallet::domain::transaction::TransactionRecord;
use telewallet::error::GatewayError;
use tokio::sync::oneshot;

pub fn account(external_id: &str, handle: &str, balance: &str) -> Account {
    Account {
        account_id: AccountId::derive(external_id),
        handle: handle.to_string(),
        address: format!("0x{external_id:0>20}"),
        balance: Balance(balance.to_string()),
    }
}

pub fn transport_error() -> GatewayError {
    GatewayError::Unreachable("connection refused".to_string())
}

/// Gateway that replays pre-scripted responses in order, so tests can pin
/// down exact backend interleavings. Endpoints with an exhausted script fall
/// back to benign empty responses, except lookups and creates, which panic
/// to catch unplanned calls.
#[derive(Default)]
pub struct ScriptedGateway {
    pub lookups: Mutex<VecDeque<Result<Account, GatewayError>>>,
    pub creates: Mutex<VecDeque<Result<Account, GatewayError>>>,
    pub transactions: Mutex<VecDeque<Result<Vec<TransactionRecord>, GatewayError>>>,
    pub directories: Mutex<VecDeque<Result<Vec<String>, GatewayError>>>,
    pub transfers: Mutex<VecDeque<Result<(), GatewayError>>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_lookup(&self, result: Result<Account, GatewayError>) {
        self.lookups.lock().unwrap().push_back(result);
    }

    pub fn push_create(&self, result: Result<Account, GatewayError>) {
        self.creates.lock().unwrap().push_back(result);
    }

    pub fn push_transactions(&self, result: Result<Vec<TransactionRecord>, GatewayError>) {
        self.transactions.lock().unwrap().push_back(result);
    }

    pub fn push_directory(&self, result: Result<Vec<String>, GatewayError>) {
        self.directories.lock().unwrap().push_back(result);
    }

    pub fn push_transfer(&self, result: Result<(), GatewayError>) {
        self.transfers.lock().unwrap().push_back(result);
    }

    pub fn remaining_lookups(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }

    pub fn remaining_creates(&self) -> usize {
        self.creates.lock().unwrap().len()
    }
}

#[async_trait]
impl BackendGateway for ScriptedGateway {
    async fn lookup_account(&self, _id: &AccountId) -> Result<Account, GatewayError> {
        self.lookups
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted lookup call")
    }

    async fn create_account(
        &self,
        _id: &AccountId,
        _handle: &str,
    ) -> Result<Account, GatewayError> {
        self.creates
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted create call")
    }

    async fn fetch_transactions(
        &self,
        _id: &AccountId,
    ) -> Result<Vec<TransactionRecord>, GatewayError> {
        self.transactions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_directory(&self) -> Result<Vec<String>, GatewayError> {
        self.directories
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn submit_transfer(&self, _request: &TransferRequest) -> Result<(), GatewayError> {
        self.transfers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn request_faucet(&self, _id: &AccountId) -> Result<(), GatewayError> {
        Ok(())
    }
}

/// Gateway whose lookups and transfer submissions block until the test
/// releases them, making completion order fully controllable. Everything
/// else answers immediately with empty data.
#[derive(Default)]
pub struct GatedGateway {
    pending_lookups: Mutex<Vec<oneshot::Sender<Result<Account, GatewayError>>>>,
    pending_transfers: Mutex<Vec<oneshot::Sender<Result<(), GatewayError>>>>,
    lookup_calls: AtomicUsize,
    transfer_calls: AtomicUsize,
}

impl GatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn transfer_calls(&self) -> usize {
        self.transfer_calls.load(Ordering::SeqCst)
    }

    pub fn pending_lookup_count(&self) -> usize {
        self.pending_lookups.lock().unwrap().len()
    }

    pub fn pending_transfer_count(&self) -> usize {
        self.pending_transfers.lock().unwrap().len()
    }

    /// Completes the `index`-th outstanding lookup (in arrival order).
    pub fn release_lookup(&self, index: usize, result: Result<Account, GatewayError>) {
        let sender = self.pending_lookups.lock().unwrap().remove(index);
        let _ = sender.send(result);
    }

    pub fn release_transfer(&self, index: usize, result: Result<(), GatewayError>) {
        let sender = self.pending_transfers.lock().unwrap().remove(index);
        let _ = sender.send(result);
    }

    /// Polls until `count` lookups are blocked on the gate.
    pub async fn wait_for_pending_lookups(&self, count: usize) {
        while self.pending_lookup_count() < count {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
    }

    pub async fn wait_for_pending_transfers(&self, count: usize) {
        while self.pending_transfer_count() < count {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
    }
}

#[async_trait]
impl BackendGateway for GatedGateway {
    async fn lookup_account(&self, _id: &AccountId) -> Result<Account, GatewayError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = oneshot::channel();
        self.pending_lookups.lock().unwrap().push(sender);
        receiver
            .await
            .unwrap_or_else(|_| Err(GatewayError::Unreachable("gate dropped".to_string())))
    }

    async fn create_account(
        &self,
        _id: &AccountId,
        _handle: &str,
    ) -> Result<Account, GatewayError> {
        Err(GatewayError::Unreachable(
            "create not supported by gated gateway".to_string(),
        ))
    }

    async fn fetch_transactions(
        &self,
        _id: &AccountId,
    ) -> Result<Vec<TransactionRecord>, GatewayError> {
        Ok(Vec::new())
    }

    async fn fetch_directory(&self) -> Result<Vec<String>, GatewayError> {
        Ok(Vec::new())
    }

    async fn submit_transfer(&self, _request: &TransferRequest) -> Result<(), GatewayError> {
        self.transfer_calls.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = oneshot::channel();
        self.pending_transfers.lock().unwrap().push(sender);
        receiver
            .await
            .unwrap_or_else(|_| Err(GatewayError::Unreachable("gate dropped".to_string())))
    }

    async fn request_faucet(&self, _id: &AccountId) -> Result<(), GatewayError> {
        Ok(())
    }
}
