use super::synchronizer::StateSynchronizer;
use crate::domain::account::{Account, Amount};
use crate::domain::ports::{GatewayHandle, TransferRequest};
use crate::domain::recipient::RecipientTarget;
use crate::error::{GatewayError, SendError};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Drives outbound transfers to completion.
///
/// Exclusive per account: while one send is in flight a second call is
/// rejected with `Busy` rather than queued, because a concurrent second
/// send is a user-input mistake, not a request to serialize. There is no
/// automatic retry; without an idempotency key a resubmission could pay
/// twice.
pub struct PaymentDispatcher {
    gateway: GatewayHandle,
    synchronizer: StateSynchronizer,
    sending: AtomicBool,
}

impl PaymentDispatcher {
    pub fn new(gateway: GatewayHandle, synchronizer: StateSynchronizer) -> Self {
        Self {
            gateway,
            synchronizer,
            sending: AtomicBool::new(false),
        }
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::SeqCst)
    }

    /// Submits one transfer. On success the balance and history are
    /// re-synchronized before this returns, so the caller's next view
    /// reflects the transfer.
    pub async fn send(
        &self,
        account: &Account,
        target: &RecipientTarget,
        amount: Amount,
    ) -> Result<(), SendError> {
        if self
            .sending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SendError::Busy);
        }

        let result = self.submit(account, target, amount).await;
        // Back to idle on success and failure alike; a failed send is
        // re-initiated explicitly by the user.
        self.sending.store(false, Ordering::SeqCst);
        result
    }

    async fn submit(
        &self,
        account: &Account,
        target: &RecipientTarget,
        amount: Amount,
    ) -> Result<(), SendError> {
        let request = TransferRequest {
            sender: account.account_id.clone(),
            target: target.clone(),
            amount,
        };

        match self.gateway.submit_transfer(&request).await {
            Ok(()) => {
                info!(sender = %request.sender, amount = %request.amount, "transfer accepted");
                // Happens after the success response, so the forced sync
                // observes the backend state that includes this transfer.
                self.synchronizer.force_sync().await;
                Ok(())
            }
            Err(GatewayError::Rejected(message)) => Err(SendError::Rejected(message)),
            Err(GatewayError::Unexpected { body, .. }) => Err(SendError::Rejected(body)),
            Err(GatewayError::Unreachable(message)) => Err(SendError::Unreachable(message)),
            Err(other) => Err(SendError::Rejected(other.to_string())),
        }
    }
}
