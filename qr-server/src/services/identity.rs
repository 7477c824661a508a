//! Identity provisioning seam
//!
//! Accounts exist twice: as a store record here and as an identity at the
//! external provider. Provider calls are a best-effort side channel — the
//! handlers log failures and commit the store mutation regardless, so the
//! two can drift (an identity without a record, or the reverse) until
//! reconciled out of band.

use async_trait::async_trait;
use serde_json::json;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_identity(&self, email: &str) -> anyhow::Result<()>;
    async fn delete_identity(&self, email: &str) -> anyhow::Result<()>;
}

/// Talks to the identity-provisioning service over HTTP.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn create_identity(&self, email: &str) -> anyhow::Result<()> {
        let url = format!("{}/identities", self.base_url);
        self.client
            .post(&url)
            .json(&json!({ "email": email }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_identity(&self, email: &str) -> anyhow::Result<()> {
        let url = format!("{}/identities/{}", self.base_url, email);
        self.client.delete(&url).send().await?.error_for_status()?;
        Ok(())
    }
}

/// Stand-in used when no identity service is configured.
pub struct NoopIdentityProvider;

#[async_trait]
impl IdentityProvider for NoopIdentityProvider {
    async fn create_identity(&self, _email: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn delete_identity(&self, _email: &str) -> anyhow::Result<()> {
        Ok(())
    }
}
