use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{GenerateError, GenerateResult};
use crate::traits::Output;

use super::model::{
    UsageGroup, UsageGroupInventory, UsageGroupRecord, UsageGroupSet, UsageGroupSetRecord,
};

pub const DEFAULT_BASE_URL: &str = "https://api.select.dev/";

/// HTTP client trait for testing
pub trait HttpClient: Send + Sync {
    /// GET the URL and return the body of a successful response
    fn get(&self, url: &Url) -> GenerateResult<String>;
}

/// Real HTTP client using reqwest, authenticating with a bearer token
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
    api_token: String,
}

impl ReqwestClient {
    pub fn new(api_token: &str) -> GenerateResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("select-usage-groups/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GenerateError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_token: api_token.to_string(),
        })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &Url) -> GenerateResult<String> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_token)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| GenerateError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| GenerateError::Transport {
            url: url.to_string(),
            message: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(GenerateError::ApiStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

/// Normalise the base URL so endpoint paths are appended below it
pub fn parse_base_url(base_url: &str) -> GenerateResult<Url> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    let url = Url::parse(&normalised)
        .map_err(|e| GenerateError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;

    if url.cannot_be_a_base() {
        return Err(GenerateError::Config(format!(
            "Base URL '{}' cannot carry a path",
            base_url
        )));
    }

    Ok(url)
}

/// Read-only client for the SELECT usage group endpoints
pub struct SelectClient<H: HttpClient> {
    base_url: Url,
    organization_id: String,
    http_client: H,
}

impl SelectClient<ReqwestClient> {
    /// Create a client talking to the real API
    pub fn new(api_token: &str, organization_id: &str, base_url: &str) -> GenerateResult<Self> {
        Self::with_client(organization_id, base_url, ReqwestClient::new(api_token)?)
    }
}

impl<H: HttpClient> SelectClient<H> {
    /// Create a client with a custom HTTP client (for testing)
    pub fn with_client(organization_id: &str, base_url: &str, client: H) -> GenerateResult<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            organization_id: organization_id.to_string(),
            http_client: client,
        })
    }

    /// Build an endpoint URL below the base URL, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> GenerateResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GenerateError::Config(format!("Base URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> GenerateResult<T> {
        let body = self.http_client.get(url)?;
        serde_json::from_str(&body).map_err(|e| {
            GenerateError::Serialization(format!("Failed to parse response from {}: {}", url, e))
        })
    }

    pub fn list_usage_group_sets(&self) -> GenerateResult<Vec<UsageGroupSet>> {
        let url = self.endpoint(&["api", &self.organization_id, "usage-group-sets"])?;
        let records: Vec<UsageGroupSetRecord> = self.get_json(&url)?;

        records.into_iter().map(UsageGroupSet::try_from).collect()
    }

    pub fn list_usage_groups(&self, usage_group_set_id: &str) -> GenerateResult<Vec<UsageGroup>> {
        let url = self.endpoint(&[
            "api",
            &self.organization_id,
            "usage-group-sets",
            usage_group_set_id,
            "usage-groups",
        ])?;
        let records: Vec<UsageGroupRecord> = self.get_json(&url)?;

        records
            .into_iter()
            .map(|record| UsageGroup::from_record(record, usage_group_set_id))
            .collect()
    }

    /// Fetch every set, then the groups of each set, one request at a time
    pub fn fetch_inventory(&self, output: &dyn Output) -> GenerateResult<UsageGroupInventory> {
        output.info("Fetching usage group sets...");
        let sets = self.list_usage_group_sets()?;

        output.info("Fetching usage groups...");
        let mut inventory = UsageGroupInventory::new();
        for set in sets {
            let groups = self.list_usage_groups(&set.id)?;
            output.dimmed(&format!("  {}: {} usage group(s)", set.name, groups.len()));
            inventory.add_set(set, groups);
        }

        Ok(inventory)
    }
}
