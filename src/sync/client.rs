use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::time::Duration;

use crate::config::ApiCredentials;

const QUERY_PAGE_SIZE: usize = 1000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated client for the remote ledger API. Requests are awaited one
/// at a time; there is no retry, a failed call surfaces immediately.
pub struct LedgerClient {
    client: reqwest::Client,
    base_url: String,
    company_id: String,
    access_token: String,
}

impl LedgerClient {
    pub fn new(credentials: &ApiCredentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("qbo-bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            company_id: credentials.company_id.clone(),
            access_token: credentials.access_token.clone(),
        })
    }

    /// Cheap authenticated round-trip to verify the session works before any
    /// documents are sent.
    pub async fn check_connection(&self) -> Result<()> {
        log::info!("Checking API session...");
        self.query("SELECT * FROM CompanyInfo MAXRESULTS 1").await?;
        log::info!("Checking API session...done");
        Ok(())
    }

    /// Fetches every entity of one type through the paginated query
    /// endpoint. The API caps one response at 1000 entities.
    pub async fn query_entities(&self, entity_type: &str) -> Result<Vec<Value>> {
        let mut all = Vec::new();
        let mut start_position = 1usize;
        loop {
            let query = format!(
                "SELECT * FROM {} STARTPOSITION {} MAXRESULTS {}",
                entity_type, start_position, QUERY_PAGE_SIZE
            );
            let body = self.query(&query).await?;
            let entities = body["QueryResponse"][entity_type]
                .as_array()
                .cloned()
                .unwrap_or_default();
            let count = entities.len();
            all.extend(entities);
            if count < QUERY_PAGE_SIZE {
                break;
            }
            start_position += count;
        }
        Ok(all)
    }

    /// POSTs one document to a create endpoint (`journalentry`, `bill`).
    pub async fn create(&self, resource: &str, document: &Value) -> Result<Value> {
        let url = format!(
            "{}/v3/company/{}/{}",
            self.base_url, self.company_id, resource
        );
        let request = self.client.post(url).json(document);
        self.send(request).await
    }

    async fn query(&self, query: &str) -> Result<Value> {
        let url = format!("{}/v3/company/{}/query", self.base_url, self.company_id);
        let request = self.client.get(url).query(&[("query", query)]);
        self.send(request).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to reach the ledger API")?;
        let status = response.status();
        let text = response
            .text()
            .await
            .context("Failed to read the API response")?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        if !status.is_success() {
            bail!("{}", extract_api_error(&body, status.as_u16()));
        }
        Ok(body)
    }
}

/// Error responses come in a `Fault` structure; fall back to the bare HTTP
/// status when the body is something else entirely.
fn extract_api_error(body: &Value, status: u16) -> String {
    body["Fault"]["Error"][0]["Detail"]
        .as_str()
        .or_else(|| body["Fault"]["Error"][0]["Message"].as_str())
        .or_else(|| body["fault"]["error"][0]["detail"].as_str())
        .or_else(|| body["message"].as_str())
        .map(|message| format!("API error (HTTP {}): {}", status, message))
        .unwrap_or_else(|| format!("API error (HTTP {})", status))
}
