//! Media API Token Rotation Library
//!
//! Obtains a fresh media API access token, proves it works with a probe lookup and
//! publishes it to a secret store.

pub mod config;
pub mod media;
pub mod publisher;
pub mod rotation;
pub mod store;

pub use config::Config;
pub use media::{AccessToken, MediaApi, MediaApiError};
pub use publisher::{PublishStatus, SecretPublisher};
pub use rotation::{BackoffSchedule, RotationOutcome, Rotator};
pub use store::SecretStore;
