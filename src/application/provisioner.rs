use crate::domain::account::{Account, AccountId};
use crate::domain::identity::ExternalIdentity;
use crate::domain::ports::GatewayHandle;
use crate::error::{GatewayError, ProvisionError};
use tracing::{debug, info, warn};

/// Converts an external identity into a backend account, idempotently.
///
/// This is a single-attempt primitive: it performs no retries of its own, a
/// caller-level policy decides whether an `Unreachable` outcome is retried.
pub struct AccountProvisioner {
    gateway: GatewayHandle,
}

impl AccountProvisioner {
    pub fn new(gateway: GatewayHandle) -> Self {
        Self { gateway }
    }

    /// Lookup first, create only on not-found. Repeated calls for the same
    /// identity resolve to the same account and never error on the common
    /// "already provisioned" case.
    pub async fn provision(&self, identity: &ExternalIdentity) -> Result<Account, ProvisionError> {
        let account_id = AccountId::derive(&identity.external_id);

        match self.gateway.lookup_account(&account_id).await {
            Ok(account) => {
                debug!(%account_id, "account already provisioned");
                return Ok(account);
            }
            Err(GatewayError::NotFound) => {}
            Err(e) => return Err(map_gateway_error(e)),
        }

        match self
            .gateway
            .create_account(&account_id, &identity.handle)
            .await
        {
            Ok(account) => {
                info!(%account_id, handle = %identity.handle, "account provisioned");
                Ok(account)
            }
            Err(GatewayError::AlreadyExists) => {
                // Lost a creation race against a duplicate auth event for the
                // same identity; the account must be visible now.
                match self.gateway.lookup_account(&account_id).await {
                    Ok(account) => Ok(account),
                    Err(GatewayError::NotFound) => {
                        warn!(%account_id, "lookup and create disagree; refusing to continue");
                        Err(ProvisionError::BackendInconsistent {
                            account_id: account_id.to_string(),
                        })
                    }
                    Err(e) => Err(map_gateway_error(e)),
                }
            }
            Err(e) => Err(map_gateway_error(e)),
        }
    }

    /// Best-effort faucet funding. The caller triggers a refresh afterwards
    /// so the credited balance becomes visible.
    pub async fn fund_from_faucet(&self, account_id: &AccountId) -> Result<(), ProvisionError> {
        self.gateway
            .request_faucet(account_id)
            .await
            .map_err(map_gateway_error)?;
        info!(%account_id, "faucet funding requested");
        Ok(())
    }
}

fn map_gateway_error(error: GatewayError) -> ProvisionError {
    match error {
        GatewayError::Unreachable(message) => ProvisionError::Unreachable(message),
        GatewayError::Rejected(message) => ProvisionError::Rejected(message),
        GatewayError::Unexpected { status, body } => {
            ProvisionError::Rejected(format!("status {status}: {body}"))
        }
        // NotFound and AlreadyExists are handled where they carry meaning;
        // reaching this arm means the backend used them out of context.
        other => ProvisionError::Rejected(other.to_string()),
    }
}
