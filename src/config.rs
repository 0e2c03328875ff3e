use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CREDENTIALS_PATH: &str = "qbo_bridge_credentials.json";
const DEFAULT_BASE_URL: &str = "https://quickbooks.api.intuit.com";

/// Connection settings for the remote ledger API, kept in a plain JSON file
/// next to the working directory. Token acquisition happens elsewhere; this
/// file only carries an already-issued token.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct ApiCredentials {
    /// API origin. Sandbox companies and tests point this elsewhere.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub company_id: String,
    pub access_token: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ApiCredentials {
    pub fn default_base_url() -> &'static str {
        DEFAULT_BASE_URL
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.with_context(|| {
            format!(
                "Failed to read credentials file {} (run `init` first)",
                path.display()
            )
        })?;
        serde_json::from_str(&content).with_context(|| {
            format!("Credentials file {} is not valid JSON", path.display())
        })
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize credentials")?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write credentials file {}", path.display()))?;
        Ok(())
    }
}
