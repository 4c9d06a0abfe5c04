//! Client-side account synchronization and payment dispatch for a
//! Telegram-embedded wallet. The backend is the sole source of truth; this
//! crate provisions an account for a Telegram identity exactly once, keeps a
//! polled local view of balance and history, resolves free-text recipients,
//! and drives outbound transfers.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::session::WalletSession;
pub use application::synchronizer::SyncView;
pub use config::{DispatchEncoding, WalletConfig};
