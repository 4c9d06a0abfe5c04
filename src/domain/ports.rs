use super::account::{Account, AccountId, Amount};
use super::recipient::RecipientTarget;
use super::transaction::TransactionRecord;
use crate::error::GatewayError;
use async_trait::async_trait;
use std::sync::Arc;

/// A transfer as submitted to the backend, keyed by sender and target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub sender: AccountId,
    pub target: RecipientTarget,
    pub amount: Amount,
}

/// The backend REST service as seen from the engine.
///
/// Implementations map their transport's outcomes onto [`GatewayError`];
/// everything above this trait is transport-agnostic.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn lookup_account(&self, id: &AccountId) -> Result<Account, GatewayError>;

    async fn create_account(&self, id: &AccountId, handle: &str)
    -> Result<Account, GatewayError>;

    /// Full transaction page for the account. A missing or null page on the
    /// wire is an empty vector, not an error.
    async fn fetch_transactions(
        &self,
        id: &AccountId,
    ) -> Result<Vec<TransactionRecord>, GatewayError>;

    /// All known handles, replacing the previous directory snapshot.
    async fn fetch_directory(&self) -> Result<Vec<String>, GatewayError>;

    async fn submit_transfer(&self, request: &TransferRequest) -> Result<(), GatewayError>;

    /// Best-effort development faucet.
    async fn request_faucet(&self, id: &AccountId) -> Result<(), GatewayError>;
}

pub type GatewayHandle = Arc<dyn BackendGateway>;
