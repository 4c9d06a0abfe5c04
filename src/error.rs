use thiserror::Error;

/// Outcome classes at the transport boundary, produced by every
/// [`BackendGateway`](crate::domain::ports::BackendGateway) implementation.
///
/// `NotFound` and `AlreadyExists` are expected signals that drive the
/// provisioning flow; they are not failures in themselves.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    /// Backend-validated rejection; the message is the backend's verbatim text.
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected backend response ({status}): {body}")]
    Unexpected { status: u16, body: String },
}

/// Terminal authentication failures. The identity payload arrives once per
/// session; a malformed one is never retried.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("identity payload is malformed: {0}")]
    MalformedPayload(String),
    #[error("user information not found in identity payload")]
    MissingIdentity,
}

#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Transport failure; retryable by the caller with backoff.
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    /// The backend refused the provisioning request.
    #[error("provisioning rejected: {0}")]
    Rejected(String),
    /// Lookup and creation disagree about the account's existence. Fatal:
    /// automatic provisioning must stop until the user intervenes.
    #[error("account {account_id} reported as both missing and already existing")]
    BackendInconsistent { account_id: String },
}

#[derive(Error, Debug)]
pub enum SendError {
    /// Another send is in flight for this account. Rejected, never queued.
    #[error("a send is already in progress")]
    Busy,
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),
    #[error("invalid recipient: {0:?}")]
    InvalidRecipient(String),
    /// Backend rejection; the message is surfaced to the user verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("backend unreachable: {0}")]
    Unreachable(String),
}
