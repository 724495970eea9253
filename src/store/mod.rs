//! Secret store implementations
//!
//! Rotated tokens are handed to a [`SecretStore`]; AWS Secrets Manager is the
//! production store.

mod aws_secrets;
mod secret_store;

pub use aws_secrets::AwsSecretsStore;
pub use secret_store::SecretStore;

/// Type alias for store trait object
pub type Store = Box<dyn SecretStore>;
