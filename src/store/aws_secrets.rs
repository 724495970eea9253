use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use tracing::{debug, info};

use super::secret_store::SecretStore;

/// AWS Secrets Manager store
pub struct AwsSecretsStore {
    client: SecretsManagerClient,
}

pub(crate) fn resolve_region(region: Option<String>) -> String {
    region.unwrap_or_else(|| {
        std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string())
    })
}

impl AwsSecretsStore {
    /// Create a new AWS Secrets Manager store
    pub async fn new(region: Option<String>) -> Self {
        let region_str = resolve_region(region);
        debug!("Using AWS Secrets Manager in region {}", region_str);

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region_str))
            .load()
            .await;

        Self {
            client: SecretsManagerClient::new(&config),
        }
    }
}

#[async_trait::async_trait]
impl SecretStore for AwsSecretsStore {
    async fn put_secret_value(
        &self,
        request_token: &str,
        secret_id: &str,
        value: &str,
    ) -> Result<()> {
        debug!(
            "Putting new value for secret '{}' (request token {})",
            secret_id, request_token
        );

        let response = self
            .client
            .put_secret_value()
            .client_request_token(request_token)
            .secret_id(secret_id)
            .secret_string(value)
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to put value for secret '{}' in AWS Secrets Manager",
                    secret_id
                )
            })?;

        info!(
            "Stored new version {} of secret '{}'",
            response.version_id().unwrap_or("<unknown>"),
            secret_id
        );
        Ok(())
    }

    fn store_type(&self) -> &'static str {
        "AWS Secrets Manager"
    }
}
