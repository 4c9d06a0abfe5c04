use crate::domain::account::{Account, AccountId, Balance, fallback_address};
use crate::domain::ports::{BackendGateway, TransferRequest};
use crate::domain::recipient::RecipientTarget;
use crate::domain::transaction::{Direction, TransactionRecord};
use crate::error::GatewayError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process backend for tests and offline runs.
///
/// Behaves like the real service's happy paths: id-keyed accounts, per-side
/// transaction records for transfers, a faucet, and a handle directory in
/// registration order. `set_unreachable` flips every endpoint into transport
/// failure so degraded paths can be exercised.
#[derive(Default, Clone)]
pub struct InMemoryBackend {
    inner: Arc<RwLock<BackendState>>,
}

#[derive(Default)]
struct BackendState {
    accounts: HashMap<AccountId, StoredAccount>,
    history: HashMap<AccountId, Vec<TransactionRecord>>,
    directory: Vec<String>,
    unreachable: bool,
    next_note: u64,
    clock: i64,
}

struct StoredAccount {
    handle: String,
    address: String,
    funds: Decimal,
}

impl BackendState {
    fn render(&self, id: &AccountId, stored: &StoredAccount) -> Account {
        Account {
            account_id: id.clone(),
            handle: stored.handle.clone(),
            address: stored.address.clone(),
            balance: Balance(format!("{} ETH", stored.funds)),
        }
    }

    fn note_id(&mut self) -> String {
        self.next_note += 1;
        format!("note_{}", self.next_note)
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn resolve_target(&self, target: &RecipientTarget) -> Option<AccountId> {
        self.accounts
            .iter()
            .find(|(_, stored)| match target {
                RecipientTarget::ByHandle(handle) => stored.handle == *handle,
                RecipientTarget::ByAddress(address) => stored.address == *address,
            })
            .map(|(id, _)| id.clone())
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_unreachable(&self, unreachable: bool) {
        self.inner.write().await.unreachable = unreachable;
    }

    pub async fn account_count(&self) -> usize {
        self.inner.read().await.accounts.len()
    }

    /// Credits funds out of thin air, recording an inbound faucet transfer.
    pub async fn credit(&self, id: &AccountId, amount: i64) {
        let mut state = self.inner.write().await;
        let Some(stored) = state.accounts.get_mut(id) else {
            return;
        };
        stored.funds += Decimal::from(amount);
        let record = TransactionRecord {
            id: state.note_id(),
            counterparty: "faucet".to_string(),
            amount: Decimal::from(amount),
            direction: Direction::Inbound,
            timestamp: state.tick(),
        };
        state.history.entry(id.clone()).or_default().push(record);
    }

    async fn guard(&self) -> Result<(), GatewayError> {
        if self.inner.read().await.unreachable {
            Err(GatewayError::Unreachable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BackendGateway for InMemoryBackend {
    async fn lookup_account(&self, id: &AccountId) -> Result<Account, GatewayError> {
        self.guard().await?;
        let state = self.inner.read().await;
        match state.accounts.get(id) {
            Some(stored) => Ok(state.render(id, stored)),
            None => Err(GatewayError::NotFound),
        }
    }

    async fn create_account(
        &self,
        id: &AccountId,
        handle: &str,
    ) -> Result<Account, GatewayError> {
        self.guard().await?;
        let mut state = self.inner.write().await;
        if state.accounts.contains_key(id) {
            return Err(GatewayError::AlreadyExists);
        }
        let stored = StoredAccount {
            handle: handle.to_string(),
            address: fallback_address(id.as_str().trim_start_matches("acc_")),
            funds: Decimal::ZERO,
        };
        let account = state.render(id, &stored);
        state.accounts.insert(id.clone(), stored);
        state.directory.push(handle.to_string());
        Ok(account)
    }

    async fn fetch_transactions(
        &self,
        id: &AccountId,
    ) -> Result<Vec<TransactionRecord>, GatewayError> {
        self.guard().await?;
        let state = self.inner.read().await;
        Ok(state.history.get(id).cloned().unwrap_or_default())
    }

    async fn fetch_directory(&self) -> Result<Vec<String>, GatewayError> {
        self.guard().await?;
        Ok(self.inner.read().await.directory.clone())
    }

    async fn submit_transfer(&self, request: &TransferRequest) -> Result<(), GatewayError> {
        self.guard().await?;
        let mut state = self.inner.write().await;

        let receiver_id = state
            .resolve_target(&request.target)
            .ok_or_else(|| GatewayError::Rejected("unknown recipient".to_string()))?;
        let amount = request.amount.value();

        {
            let sender = state
                .accounts
                .get_mut(&request.sender)
                .ok_or_else(|| GatewayError::Rejected("unknown sender".to_string()))?;
            if sender.funds < amount {
                return Err(GatewayError::Rejected("insufficient funds".to_string()));
            }
            sender.funds -= amount;
        }
        if let Some(receiver) = state.accounts.get_mut(&receiver_id) {
            receiver.funds += amount;
        }

        let timestamp = state.tick();
        let receiver_handle = state
            .accounts
            .get(&receiver_id)
            .map(|a| a.handle.clone())
            .unwrap_or_default();
        let sender_handle = state
            .accounts
            .get(&request.sender)
            .map(|a| a.handle.clone())
            .unwrap_or_default();

        let outbound = TransactionRecord {
            id: state.note_id(),
            counterparty: receiver_handle,
            amount,
            direction: Direction::Outbound,
            timestamp,
        };
        state
            .history
            .entry(request.sender.clone())
            .or_default()
            .push(outbound);

        let inbound = TransactionRecord {
            id: state.note_id(),
            counterparty: sender_handle,
            amount,
            direction: Direction::Inbound,
            timestamp,
        };
        state.history.entry(receiver_id).or_default().push(inbound);

        Ok(())
    }

    async fn request_faucet(&self, id: &AccountId) -> Result<(), GatewayError> {
        self.guard().await?;
        {
            let state = self.inner.read().await;
            if !state.accounts.contains_key(id) {
                return Err(GatewayError::NotFound);
            }
        }
        self.credit(id, 100).await;
        Ok(())
    }
}
