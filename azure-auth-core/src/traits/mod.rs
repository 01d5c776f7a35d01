//! Collaborator abstraction trait definitions

mod credential_store;
mod interactive_auth;
mod notifier;

pub use credential_store::{CredentialEntry, CredentialStore, InMemoryCredentialStore};
pub use interactive_auth::{ConsentOutcome, InteractiveAuth, InteractiveLogin};
pub use notifier::{LogNotifier, UserNotifier};
