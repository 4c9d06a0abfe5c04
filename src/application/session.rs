use super::dispatcher::PaymentDispatcher;
use super::provisioner::AccountProvisioner;
use super::synchronizer::{StateSynchronizer, SyncView};
use crate::domain::account::{Account, Amount};
use crate::domain::identity::ExternalIdentity;
use crate::domain::ports::GatewayHandle;
use crate::domain::recipient::RecipientTarget;
use crate::error::{ProvisionError, SendError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// One authenticated wallet session: the provisioned account plus the
/// services operating on it, wired in dependency order. This is the whole
/// surface a front end talks to.
pub struct WalletSession {
    identity: ExternalIdentity,
    account: Account,
    provisioner: AccountProvisioner,
    synchronizer: StateSynchronizer,
    dispatcher: PaymentDispatcher,
}

impl WalletSession {
    /// Provisions the identity's account (idempotently) and prepares the
    /// caches. The identity is fixed for the session's lifetime.
    pub async fn open(
        gateway: GatewayHandle,
        identity: ExternalIdentity,
    ) -> Result<Self, ProvisionError> {
        let provisioner = AccountProvisioner::new(gateway.clone());
        let account = provisioner.provision(&identity).await?;
        let synchronizer = StateSynchronizer::new(gateway.clone(), account.clone());
        let dispatcher = PaymentDispatcher::new(gateway, synchronizer.clone());

        Ok(Self {
            identity,
            account,
            provisioner,
            synchronizer,
            dispatcher,
        })
    }

    pub fn identity(&self) -> &ExternalIdentity {
        &self.identity
    }

    /// The account as provisioned; the live balance comes from [`Self::view`].
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub async fn view(&self) -> SyncView {
        self.synchronizer.current_view().await
    }

    pub async fn force_sync(&self) -> SyncView {
        self.synchronizer.force_sync().await
    }

    /// Starts background polling; drop or abort the handle to stop.
    pub fn start_polling(&self, interval: Duration) -> JoinHandle<()> {
        self.synchronizer.spawn_polling(interval)
    }

    /// Resolves free-text recipient and amount, then dispatches the
    /// transfer. Validation failures never reach the network.
    pub async fn send(&self, recipient: &str, amount: &str) -> Result<(), SendError> {
        let target = RecipientTarget::classify(recipient)?;
        let amount = Amount::parse(amount)?;
        self.dispatcher.send(&self.account, &target, amount).await
    }

    pub fn is_sending(&self) -> bool {
        self.dispatcher.is_sending()
    }

    /// Autocomplete handles for a partially typed recipient.
    pub async fn suggest(&self, partial: &str) -> Vec<String> {
        self.view().await.directory.suggest(partial)
    }

    /// Best-effort faucet funding, followed by a forced sync so the credit
    /// shows up.
    pub async fn request_faucet(&self) -> Result<(), ProvisionError> {
        self.provisioner
            .fund_from_faucet(&self.account.account_id)
            .await?;
        self.synchronizer.force_sync().await;
        Ok(())
    }
}
