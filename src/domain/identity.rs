use crate::error::AuthError;
use serde_json::Value;

/// Verified external identity, handed over once by the Telegram host.
/// Immutable for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub external_id: String,
    pub handle: String,
}

impl ExternalIdentity {
    /// Extracts the identity from the host's decoded launch payload: either
    /// the user object itself or an envelope carrying a `user` field. The id
    /// arrives as a number or a string depending on host version; both
    /// normalize to a string.
    pub fn from_init_payload(payload: &Value) -> Result<Self, AuthError> {
        let user = payload.get("user").unwrap_or(payload);

        let external_id = match user.get("id") {
            Some(Value::Number(id)) => id.to_string(),
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => return Err(AuthError::MissingIdentity),
        };
        let handle = match user.get("username") {
            Some(Value::String(handle)) if !handle.is_empty() => handle.clone(),
            _ => return Err(AuthError::MissingIdentity),
        };

        Ok(Self {
            external_id,
            handle,
        })
    }

    /// Parses the raw payload string as delivered by the host.
    pub fn from_init_data(raw: &str) -> Result<Self, AuthError> {
        let payload: Value = serde_json::from_str(raw)
            .map_err(|e| AuthError::MalformedPayload(e.to_string()))?;
        Self::from_init_payload(&payload)
    }
}
