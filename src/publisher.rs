//! Best-effort publication of validated tokens to the secret store.

use tracing::{info, warn};
use uuid::Uuid;

use crate::media::AccessToken;
use crate::store::Store;

/// Result of a single publish call.
///
/// A failed write is reported as `Dropped` and never retried: the previously
/// stored token keeps working for roughly two more weeks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishStatus {
    Written { request_token: String },
    Dropped { reason: String },
}

impl PublishStatus {
    pub fn is_written(&self) -> bool {
        matches!(self, PublishStatus::Written { .. })
    }
}

/// Writes validated tokens under a fixed secret id
pub struct SecretPublisher {
    store: Store,
    secret_id: String,
}

impl SecretPublisher {
    pub fn new(store: Store, secret_id: impl Into<String>) -> Self {
        Self {
            store,
            secret_id: secret_id.into(),
        }
    }

    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }

    /// Store `token` as the current value of the secret
    pub async fn publish(&self, token: &AccessToken) -> PublishStatus {
        let request_token = Uuid::new_v4().to_string();
        info!(
            "Publishing rotated token to '{}' ({})",
            self.secret_id,
            self.store.store_type()
        );

        match self
            .store
            .put_secret_value(&request_token, &self.secret_id, token.expose())
            .await
        {
            Ok(()) => {
                info!("Published rotated token to '{}'", self.secret_id);
                PublishStatus::Written { request_token }
            }
            Err(e) => {
                warn!(
                    "Failed to publish rotated token to '{}': {:#}. Keeping the current secret.",
                    self.secret_id, e
                );
                PublishStatus::Dropped {
                    reason: format!("{:#}", e),
                }
            }
        }
    }
}
