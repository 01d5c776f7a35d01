//! Azure account core library
//!
//! Platform-independent account and token logic for Azure sign-in:
//! - Token cache over an injected credential store, with an expiry index
//! - Refresh-token exchange with consent escalation
//! - Tenant and subscription discovery
//! - Account lifecycle (sign-in, silent refresh, per-tenant tokens, sign-out)
//!
//! Storage, the interactive flow and user notifications are abstracted
//! through traits so hosts can plug in their own implementations.

pub mod error;
pub mod messages;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{AccountLifecycleService, LoginOutcome, ServiceContext, TokenCache};
pub use traits::{
    ConsentOutcome, CredentialEntry, CredentialStore, InMemoryCredentialStore, InteractiveAuth,
    InteractiveLogin, LogNotifier, UserNotifier,
};
