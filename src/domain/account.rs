use crate::error::SendError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable backend identifier for an account.
///
/// Derived deterministically from the external id and never regenerated:
/// provisioning the same identity twice must map to the same account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn derive(external_id: &str) -> Self {
        Self(format!("acc_{external_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Address shown before the backend has reported one: `0x` plus the external
/// id left-padded with zeros to 20 characters.
pub fn fallback_address(external_id: &str) -> String {
    format!("0x{external_id:0>20}")
}

/// Validated positive transfer amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, SendError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(SendError::InvalidAmount(value.to_string()))
        }
    }

    /// Parses user input; empty or non-numeric input never reaches the
    /// network.
    pub fn parse(input: &str) -> Result<Self, SendError> {
        let value = Decimal::from_str(input.trim())
            .map_err(|_| SendError::InvalidAmount(input.to_string()))?;
        Self::new(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Balance exactly as the backend reported it, e.g. `"0 ETH"`. The client
/// displays it or replaces it after a fetch; it never computes one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balance(pub String);

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Cached copy of a backend account. Mutated only by the backend; the client
/// replaces the whole value after a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub handle: String,
    pub address: String,
    pub balance: Balance,
}
