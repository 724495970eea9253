use anyhow::Result;

/// Trait for secret stores that accept rotated credential values
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    /// Write a new value for `secret_id`.
    ///
    /// `request_token` identifies this write so the store can drop duplicates.
    async fn put_secret_value(&self, request_token: &str, secret_id: &str, value: &str)
        -> Result<()>;

    /// Get the store type name for display purposes
    fn store_type(&self) -> &'static str;
}
