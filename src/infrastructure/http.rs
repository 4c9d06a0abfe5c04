use crate::config::{DispatchEncoding, WalletConfig};
use crate::domain::account::{Account, AccountId, Balance};
use crate::domain::ports::{BackendGateway, TransferRequest};
use crate::domain::recipient::RecipientTarget;
use crate::domain::transaction::{Direction, TransactionRecord};
use crate::error::GatewayError;
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use std::str::FromStr;

/// REST adapter for the wallet backend.
///
/// Wire DTOs are tolerant: every field the backend may omit or null is an
/// `Option`, and absent collections read as empty. Transport failures,
/// including timeouts, all map to `GatewayError::Unreachable`.
pub struct HttpGateway {
    client: reqwest::Client,
    config: WalletConfig,
}

#[derive(Debug, Deserialize)]
struct AccountDto {
    address: Option<String>,
    balance: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionDto {
    note_id: Option<String>,
    acc_sender: Option<String>,
    acc_recipient: Option<String>,
    value: Option<String>,
    timestamp: Option<String>,
    transaction_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionPageDto {
    transactions: Option<Vec<TransactionDto>>,
}

impl HttpGateway {
    pub fn new(config: WalletConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(unreachable_error)?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get(&self, path: &str) -> Result<Response, GatewayError> {
        self.client
            .get(self.url(path))
            .send()
            .await
            .map_err(unreachable_error)
    }

    /// Maps a non-success status to the gateway taxonomy; `not_provisioned`
    /// controls whether the configured missing-account statuses read as
    /// `NotFound` (only meaningful on the lookup path).
    async fn fail(
        &self,
        response: Response,
        not_provisioned: bool,
    ) -> GatewayError {
        let status = response.status();
        if not_provisioned && self.config.treats_as_not_provisioned(status.as_u16()) {
            return GatewayError::NotFound;
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT {
            return GatewayError::AlreadyExists;
        }
        GatewayError::Unexpected {
            status: status.as_u16(),
            body,
        }
    }

    fn account_from_dto(id: &AccountId, dto: AccountDto) -> Account {
        Account {
            account_id: id.clone(),
            handle: dto.username.unwrap_or_default(),
            address: dto.address.unwrap_or_default(),
            balance: Balance(dto.balance.unwrap_or_default()),
        }
    }

    fn record_from_dto(dto: TransactionDto) -> TransactionRecord {
        let direction = match dto.transaction_type.as_deref() {
            Some("input") => Direction::Inbound,
            _ => Direction::Outbound,
        };
        let counterparty = match direction {
            Direction::Inbound => dto.acc_sender.clone(),
            Direction::Outbound => dto.acc_recipient.clone(),
        }
        .unwrap_or_default();
        let amount = dto
            .value
            .as_deref()
            .and_then(|value| Decimal::from_str(value).ok())
            .unwrap_or(Decimal::ZERO);
        let timestamp = dto
            .timestamp
            .as_deref()
            .and_then(|t| t.parse::<i64>().ok())
            .unwrap_or(0);
        // Some backend versions omit note_id; a synthetic key over the
        // remaining fields keeps de-duplication stable across fetches.
        let id = dto.note_id.clone().unwrap_or_else(|| {
            format!(
                "{}>{}:{}@{}",
                dto.acc_sender.as_deref().unwrap_or(""),
                dto.acc_recipient.as_deref().unwrap_or(""),
                dto.value.as_deref().unwrap_or(""),
                timestamp,
            )
        });

        TransactionRecord {
            id,
            counterparty,
            amount,
            direction,
            timestamp,
        }
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn lookup_account(&self, id: &AccountId) -> Result<Account, GatewayError> {
        let response = self.get(&format!("/account/{id}/info")).await?;
        if !response.status().is_success() {
            return Err(self.fail(response, true).await);
        }
        let dto: AccountDto = response.json().await.map_err(unreachable_error)?;
        Ok(Self::account_from_dto(id, dto))
    }

    async fn create_account(
        &self,
        id: &AccountId,
        handle: &str,
    ) -> Result<Account, GatewayError> {
        let response = self
            .client
            .post(self.url("/account/create"))
            .json(&json!({ "user_id": id.as_str(), "username": handle }))
            .send()
            .await
            .map_err(unreachable_error)?;
        if !response.status().is_success() {
            return Err(self.fail(response, false).await);
        }
        let dto: AccountDto = response.json().await.map_err(unreachable_error)?;
        Ok(Self::account_from_dto(id, dto))
    }

    async fn fetch_transactions(
        &self,
        id: &AccountId,
    ) -> Result<Vec<TransactionRecord>, GatewayError> {
        let response = self.get(&format!("/account/{id}/transactions")).await?;
        if !response.status().is_success() {
            return Err(self.fail(response, false).await);
        }
        let page: TransactionPageDto = response.json().await.map_err(unreachable_error)?;
        Ok(page
            .transactions
            .unwrap_or_default()
            .into_iter()
            .map(Self::record_from_dto)
            .collect())
    }

    async fn fetch_directory(&self) -> Result<Vec<String>, GatewayError> {
        let response = self.get("/account/users").await?;
        if !response.status().is_success() {
            return Err(self.fail(response, false).await);
        }
        // Deployed backends answer either with a bare array or with a
        // `{users: [...]}` envelope.
        let value: Value = response.json().await.map_err(unreachable_error)?;
        let handles = value
            .get("users")
            .unwrap_or(&value)
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(handles)
    }

    async fn submit_transfer(&self, request: &TransferRequest) -> Result<(), GatewayError> {
        let response = match self.config.dispatch {
            DispatchEncoding::NotePath => {
                self.get(&format!(
                    "/account/{}/note/to/{}/asset/{}",
                    request.sender,
                    request.target.dispatch_key(),
                    request.amount,
                ))
                .await?
            }
            DispatchEncoding::SendJson => {
                let mut body = json!({
                    "sender_id": request.sender.as_str(),
                    "amount": request.amount.to_string(),
                });
                match &request.target {
                    RecipientTarget::ByHandle(handle) => {
                        body["receiver_username"] = json!(handle);
                    }
                    RecipientTarget::ByAddress(address) => {
                        body["receiver_id"] = json!(address);
                    }
                }
                self.client
                    .post(self.url("/transactions/send"))
                    .json(&body)
                    .send()
                    .await
                    .map_err(unreachable_error)?
            }
        };

        if response.status().is_success() {
            Ok(())
        } else {
            // Non-success body text is the backend's rejection reason,
            // surfaced verbatim.
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::Rejected(body))
        }
    }

    async fn request_faucet(&self, id: &AccountId) -> Result<(), GatewayError> {
        let response = self.get(&format!("/account/{id}/faucet")).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::Rejected(body))
        }
    }
}

fn unreachable_error(error: reqwest::Error) -> GatewayError {
    GatewayError::Unreachable(error.to_string())
}
