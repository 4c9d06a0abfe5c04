use std::time::Duration;

/// Wire form used for outbound transfers. Deployed backends drifted between
/// a path-encoded GET and a JSON POST; both remain supported and the
/// deployment picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchEncoding {
    /// `GET /api/account/{id}/note/to/{recipient}/asset/{amount}`
    #[default]
    NotePath,
    /// `POST /api/transactions/send` with a JSON body
    SendJson,
}

/// Deployment-level settings for the wallet engine.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// Backend base URL, without the `/api` prefix.
    pub base_url: String,
    /// Interval between background refresh cycles.
    pub poll_interval: Duration,
    /// Per-request timeout; a timeout is treated like any transport failure.
    pub request_timeout: Duration,
    pub dispatch: DispatchEncoding,
    /// Status codes the lookup endpoint uses to mean "not yet provisioned".
    /// Backend versions disagree here (404 vs 500), so it is configuration
    /// rather than a hardcoded code.
    pub not_provisioned_statuses: Vec<u16>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            poll_interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            dispatch: DispatchEncoding::default(),
            not_provisioned_statuses: vec![404],
        }
    }
}

impl WalletConfig {
    pub fn treats_as_not_provisioned(&self, status: u16) -> bool {
        self.not_provisioned_statuses.contains(&status)
    }
}
