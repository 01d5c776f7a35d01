//! User notification abstract Trait

use async_trait::async_trait;

use crate::messages;

/// Non-blocking messages and confirmations shown to the user.
#[async_trait]
pub trait UserNotifier: Send + Sync {
    async fn show_error(&self, message: &str);

    async fn show_info(&self, message: &str);

    /// Ask whether the consent page for `tenant` and `resource` may be opened.
    async fn confirm_consent(&self, tenant: &str, resource: &str) -> bool;
}

/// Notifier that only writes to the log
///
/// Default for headless hosts; never grants consent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl UserNotifier for LogNotifier {
    async fn show_error(&self, message: &str) {
        log::error!("{message}");
    }

    async fn show_info(&self, message: &str) {
        log::info!("{message}");
    }

    async fn confirm_consent(&self, tenant: &str, resource: &str) -> bool {
        log::info!(
            "{} No interactive host, declining",
            messages::consent_required(tenant, resource)
        );
        false
    }
}
