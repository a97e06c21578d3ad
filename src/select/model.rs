//! SELECT API records and the validated domain types built from them.
//!
//! Records are deserialized loosely (every field optional) and validated once
//! here, so the rest of the generator works with complete values only.

use serde::Deserialize;
use serde_json::{Number, Value};
use std::collections::HashMap;

use crate::error::{GenerateError, GenerateResult};
use crate::generator::sanitize;

const DEFAULT_ORDER: i64 = 1;

/// Raw usage group set as returned by `GET /api/{org}/usage-group-sets`
#[derive(Debug, Clone, Deserialize)]
pub struct UsageGroupSetRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub order: Option<i64>,
    pub snowflake_account_uuid: Option<String>,
    pub snowflake_organization_name: Option<String>,
}

/// Raw usage group as returned by `GET /api/{org}/usage-group-sets/{id}/usage-groups`
#[derive(Debug, Clone, Deserialize)]
pub struct UsageGroupRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub order: Option<i64>,
    pub budget: Option<Number>,
    pub filter_expression: Option<Value>,
}

/// The Snowflake account or organization that owns a usage group set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ownership {
    Account { uuid: String },
    Organization { name: String },
}

impl Ownership {
    /// Attribute name and value mirrored onto the `select_usage_group_set` resource
    pub fn attribute(&self) -> (&'static str, &str) {
        match self {
            Ownership::Account { uuid } => ("snowflake_account_uuid", uuid),
            Ownership::Organization { name } => ("snowflake_organization_name", name),
        }
    }

    /// Human readable description used in generated comments
    pub fn describe(&self) -> String {
        match self {
            Ownership::Account { uuid } => format!("Snowflake Account UUID: {}", uuid),
            Ownership::Organization { name } => format!("Snowflake Organization: {}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsageGroupSet {
    pub id: String,
    pub name: String,
    pub order: i64,
    pub ownership: Ownership,
}

impl UsageGroupSet {
    /// Terraform resource name for this set
    pub fn identifier(&self) -> String {
        sanitize(&self.name)
    }
}

impl TryFrom<UsageGroupSetRecord> for UsageGroupSet {
    type Error = GenerateError;

    fn try_from(record: UsageGroupSetRecord) -> GenerateResult<Self> {
        let invalid = |id: Option<&String>, message: &str| GenerateError::InvalidRecord {
            record_type: "usage group set",
            id: id.cloned(),
            message: message.to_string(),
        };

        let id = record
            .id
            .clone()
            .ok_or_else(|| invalid(None, "missing 'id'"))?;
        let name = record
            .name
            .clone()
            .ok_or_else(|| invalid(Some(&id), "missing 'name'"))?;

        // The account UUID takes precedence when both keys are populated
        let ownership = match (
            record.snowflake_account_uuid,
            record.snowflake_organization_name,
        ) {
            (Some(uuid), _) => Ownership::Account { uuid },
            (None, Some(name)) => Ownership::Organization { name },
            (None, None) => {
                return Err(invalid(
                    Some(&id),
                    "missing both 'snowflake_account_uuid' and 'snowflake_organization_name'",
                ));
            }
        };

        Ok(Self {
            id,
            name,
            order: record.order.unwrap_or(DEFAULT_ORDER),
            ownership,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsageGroup {
    pub id: String,
    pub name: String,
    pub order: i64,
    pub budget: Option<Number>,
    pub filter_expression: Value,
    pub usage_group_set_id: String,
}

impl UsageGroup {
    /// Validate a raw record fetched under the given usage group set
    pub fn from_record(record: UsageGroupRecord, usage_group_set_id: &str) -> GenerateResult<Self> {
        let invalid = |id: Option<&String>, message: &str| GenerateError::InvalidRecord {
            record_type: "usage group",
            id: id.cloned(),
            message: message.to_string(),
        };

        let id = record
            .id
            .clone()
            .ok_or_else(|| invalid(None, "missing 'id'"))?;
        let name = record
            .name
            .clone()
            .ok_or_else(|| invalid(Some(&id), "missing 'name'"))?;

        Ok(Self {
            id,
            name,
            order: record.order.unwrap_or(DEFAULT_ORDER),
            budget: record.budget,
            filter_expression: record
                .filter_expression
                .filter(|value| !value.is_null())
                .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
            usage_group_set_id: usage_group_set_id.to_string(),
        })
    }

    /// Terraform resource name for this group
    pub fn identifier(&self) -> String {
        sanitize(&self.name)
    }

    /// Composite id expected by `terraform import` for usage groups
    pub fn import_id(&self) -> String {
        format!("{}/{}", self.usage_group_set_id, self.id)
    }
}

/// Everything fetched during one run: the sets in API order and their groups
#[derive(Debug, Clone, Default)]
pub struct UsageGroupInventory {
    sets: Vec<UsageGroupSet>,
    groups: HashMap<String, Vec<UsageGroup>>,
}

impl UsageGroupInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_set(&mut self, set: UsageGroupSet, groups: Vec<UsageGroup>) {
        self.groups.insert(set.id.clone(), groups);
        self.sets.push(set);
    }

    pub fn sets(&self) -> &[UsageGroupSet] {
        &self.sets
    }

    /// Groups of a set, in API order
    pub fn groups_for(&self, usage_group_set_id: &str) -> &[UsageGroup] {
        self.groups
            .get(usage_group_set_id)
            .map(|groups| groups.as_slice())
            .unwrap_or(&[])
    }

    pub fn group_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set_record(value: Value) -> UsageGroupSetRecord {
        serde_json::from_value(value).unwrap()
    }

    fn group_record(value: Value) -> UsageGroupRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_set_with_account_uuid() {
        let set = UsageGroupSet::try_from(set_record(json!({
            "id": "s1",
            "name": "Compute $$",
            "order": 2,
            "snowflake_account_uuid": "abcd1234-xxxx"
        })))
        .unwrap();

        assert_eq!(set.order, 2);
        assert_eq!(
            set.ownership,
            Ownership::Account {
                uuid: "abcd1234-xxxx".to_string()
            }
        );
        assert_eq!(set.identifier(), "compute___");
    }

    #[test]
    fn test_set_order_defaults_to_one() {
        let set = UsageGroupSet::try_from(set_record(json!({
            "id": "s1",
            "name": "Storage",
            "order": null,
            "snowflake_organization_name": "Acme"
        })))
        .unwrap();

        assert_eq!(set.order, 1);
        assert_eq!(set.ownership.attribute(), ("snowflake_organization_name", "Acme"));
        assert_eq!(set.ownership.describe(), "Snowflake Organization: Acme");
    }

    #[test]
    fn test_set_prefers_account_uuid() {
        let set = UsageGroupSet::try_from(set_record(json!({
            "id": "s1",
            "name": "Both",
            "snowflake_account_uuid": "1234",
            "snowflake_organization_name": "Acme"
        })))
        .unwrap();

        assert!(matches!(set.ownership, Ownership::Account { .. }));
    }

    #[test]
    fn test_set_without_ownership_is_rejected() {
        let err = UsageGroupSet::try_from(set_record(json!({"id": "s1", "name": "Orphan"})))
            .unwrap_err();

        assert!(matches!(err, GenerateError::InvalidRecord { .. }));
        assert!(err.to_string().contains("'s1'"));
    }

    #[test]
    fn test_set_without_name_is_rejected() {
        let err = UsageGroupSet::try_from(set_record(json!({
            "id": "s1",
            "snowflake_account_uuid": "abcd"
        })))
        .unwrap_err();

        assert!(err.to_string().contains("missing 'name'"));
    }

    #[test]
    fn test_group_defaults() {
        let group = UsageGroup::from_record(
            group_record(json!({"id": "g1", "name": "GPU", "filter_expression": null})),
            "s1",
        )
        .unwrap();

        assert_eq!(group.order, 1);
        assert_eq!(group.budget, None);
        assert_eq!(group.filter_expression, json!({}));
        assert_eq!(group.usage_group_set_id, "s1");
        assert_eq!(group.import_id(), "s1/g1");
    }

    #[test]
    fn test_group_keeps_budget_and_filter() {
        let group = UsageGroup::from_record(
            group_record(json!({
                "id": "g1",
                "name": "GPU",
                "budget": 0,
                "filter_expression": {"tag": "gpu"}
            })),
            "s1",
        )
        .unwrap();

        assert_eq!(group.budget, Some(Number::from(0)));
        assert_eq!(group.filter_expression, json!({"tag": "gpu"}));
    }

    #[test]
    fn test_group_without_id_is_rejected() {
        let err = UsageGroup::from_record(group_record(json!({"name": "GPU"})), "s1").unwrap_err();
        assert!(err.to_string().contains("usage group"));
        assert!(err.to_string().contains("missing 'id'"));
    }

    #[test]
    fn test_inventory_lookup() {
        let mut inventory = UsageGroupInventory::new();
        let set = UsageGroupSet {
            id: "s1".to_string(),
            name: "Compute".to_string(),
            order: 1,
            ownership: Ownership::Account {
                uuid: "abcd".to_string(),
            },
        };
        let group = UsageGroup::from_record(
            group_record(json!({"id": "g1", "name": "GPU"})),
            "s1",
        )
        .unwrap();

        inventory.add_set(set, vec![group]);

        assert_eq!(inventory.sets().len(), 1);
        assert_eq!(inventory.groups_for("s1").len(), 1);
        assert!(inventory.groups_for("missing").is_empty());
        assert_eq!(inventory.group_count(), 1);
    }
}
