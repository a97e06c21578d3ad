//! Fixtures shared by unit tests: sample usage group data and a canned HTTP client.

#![cfg(test)]

use serde_json::{Number, Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

use crate::error::{GenerateError, GenerateResult};
use crate::select::client::HttpClient;
use crate::select::{Ownership, UsageGroup, UsageGroupInventory, UsageGroupSet};

pub fn account_set(id: &str, name: &str, uuid: &str) -> UsageGroupSet {
    UsageGroupSet {
        id: id.to_string(),
        name: name.to_string(),
        order: 1,
        ownership: Ownership::Account {
            uuid: uuid.to_string(),
        },
    }
}

pub fn org_set(id: &str, name: &str, organization: &str) -> UsageGroupSet {
    UsageGroupSet {
        id: id.to_string(),
        name: name.to_string(),
        order: 1,
        ownership: Ownership::Organization {
            name: organization.to_string(),
        },
    }
}

pub fn group(
    id: &str,
    name: &str,
    usage_group_set_id: &str,
    budget: Option<i64>,
    filter_expression: Value,
) -> UsageGroup {
    UsageGroup {
        id: id.to_string(),
        name: name.to_string(),
        order: 1,
        budget: budget.map(Number::from),
        filter_expression,
        usage_group_set_id: usage_group_set_id.to_string(),
    }
}

/// Three sets over two owners; s1 and s3 share the `account_abcd1234` module
///
/// - s1 "Compute $$" (account abcd1234-xxxx): g1 "GPU" (budget 500), g2 "CPU"
/// - s2 "Storage" (organization Acme): g3 "Hot Tier"
/// - s3 "Warehouses" (account abcd1234-xxxx): g4 "ETL"
pub fn sample_inventory() -> UsageGroupInventory {
    let mut inventory = UsageGroupInventory::new();

    inventory.add_set(
        account_set("s1", "Compute $$", "abcd1234-xxxx"),
        vec![
            group("g1", "GPU", "s1", Some(500), json!({"tag": "gpu"})),
            group("g2", "CPU", "s1", None, json!({"tag": "cpu"})),
        ],
    );
    inventory.add_set(
        org_set("s2", "Storage", "Acme"),
        vec![group("g3", "Hot Tier", "s2", Some(100), json!({}))],
    );
    inventory.add_set(
        account_set("s3", "Warehouses", "abcd1234-xxxx"),
        vec![group("g4", "ETL", "s3", None, json!({"warehouse": ["ETL_WH"]}))],
    );

    inventory
}

/// JSON bodies matching `sample_inventory`, keyed by path below `/api/{org}/`
pub fn sample_responses() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "usage-group-sets",
            r#"[
                {"id": "s1", "name": "Compute $$", "order": null, "snowflake_account_uuid": "abcd1234-xxxx"},
                {"id": "s2", "name": "Storage", "snowflake_organization_name": "Acme"},
                {"id": "s3", "name": "Warehouses", "snowflake_account_uuid": "abcd1234-xxxx"}
            ]"#,
        ),
        (
            "usage-group-sets/s1/usage-groups",
            r#"[
                {"id": "g1", "name": "GPU", "order": 1, "budget": 500, "filter_expression": {"tag": "gpu"}},
                {"id": "g2", "name": "CPU", "filter_expression": {"tag": "cpu"}}
            ]"#,
        ),
        (
            "usage-group-sets/s2/usage-groups",
            r#"[{"id": "g3", "name": "Hot Tier", "budget": 100, "filter_expression": null}]"#,
        ),
        (
            "usage-group-sets/s3/usage-groups",
            r#"[{"id": "g4", "name": "ETL", "filter_expression": {"warehouse": ["ETL_WH"]}}]"#,
        ),
    ]
}

/// HTTP client answering from canned bodies and recording every request
pub struct MockHttpClient {
    responses: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), body.to_string());
        self
    }

    /// Mock serving `sample_responses` for the given API root, e.g. `https://api.select.dev/api/org-1`
    pub fn with_sample_inventory(api_root: &str) -> Self {
        sample_responses()
            .into_iter()
            .fold(Self::new(), |client, (path, body)| {
                client.with_response(&format!("{}/{}", api_root, path), body)
            })
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl HttpClient for MockHttpClient {
    fn get(&self, url: &Url) -> GenerateResult<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.responses
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| GenerateError::ApiStatus {
                url: url.to_string(),
                status: 404,
                body: "not found".to_string(),
            })
    }
}
