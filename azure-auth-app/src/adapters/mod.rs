//! Platform storage adapters for desktop and CLI hosts.

#[cfg(feature = "keyring-store")]
mod keyring_credential_store;

#[cfg(feature = "keyring-store")]
pub use keyring_credential_store::KeyringCredentialStore;
