//! Terraform blocks for usage group sets and usage groups.

use crate::error::GenerateResult;
use crate::hcl::{Block, Expression};
use crate::select::{UsageGroup, UsageGroupSet};

use super::LayoutVariant;

pub const SET_RESOURCE_TYPE: &str = "select_usage_group_set";
pub const GROUP_RESOURCE_TYPE: &str = "select_usage_group";

/// Block for a usage group set; only the modular layout mirrors the owner attribute
pub fn set_block(set: &UsageGroupSet, variant: LayoutVariant) -> Block {
    let block = Block::resource(SET_RESOURCE_TYPE, &set.identifier())
        .attribute("name", Expression::string(&set.name))
        .attribute("order", Expression::Integer(set.order));

    if variant.is_modular() {
        let (key, value) = set.ownership.attribute();
        block.attribute(key, Expression::string(value))
    } else {
        block
    }
}

/// Block for a usage group referencing its parent set resource
pub fn group_block(group: &UsageGroup, parent_identifier: &str) -> Block {
    Block::resource(GROUP_RESOURCE_TYPE, &group.identifier())
        .attribute("name", Expression::string(&group.name))
        .attribute("order", Expression::Integer(group.order))
        .optional_attribute("budget", group.budget.clone().map(Expression::Number))
        .attribute(
            "usage_group_set_id",
            Expression::traversal([SET_RESOURCE_TYPE, parent_identifier, "id"]),
        )
        .blank_line()
        .attribute(
            "filter_expression_json",
            Expression::JsonEncode(group.filter_expression.clone()),
        )
}

pub fn render_set(set: &UsageGroupSet, variant: LayoutVariant) -> GenerateResult<String> {
    set_block(set, variant).render()
}

pub fn render_group(group: &UsageGroup, parent_identifier: &str) -> GenerateResult<String> {
    group_block(group, parent_identifier).render()
}

/// Contents of `<set identifier>.tf`: the set followed by its groups in API order
pub fn render_set_file(
    set: &UsageGroupSet,
    groups: &[UsageGroup],
    variant: LayoutVariant,
) -> GenerateResult<String> {
    let parent_identifier = set.identifier();

    let mut out = String::from("# Usage Group Set\n");
    out.push_str(&render_set(set, variant)?);
    out.push_str("\n\n");

    out.push_str("# Usage Groups\n");
    for group in groups {
        out.push_str(&render_group(group, &parent_identifier)?);
        out.push_str("\n\n");
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{account_set, group, org_set};
    use serde_json::json;

    #[test]
    fn test_render_set_modular_includes_account_uuid() {
        let mut set = account_set("s1", "Compute $$", "abcd1234-xxxx");
        set.order = 2;

        let rendered = render_set(&set, LayoutVariant::Modular).unwrap();

        assert_eq!(
            rendered,
            "resource \"select_usage_group_set\" \"compute___\" {\n  name                   = \"Compute $$\"\n  order                  = 2\n  snowflake_account_uuid = \"abcd1234-xxxx\"\n}"
        );
    }

    #[test]
    fn test_render_set_modular_includes_organization() {
        let set = org_set("s1", "Storage", "Acme");

        let rendered = render_set(&set, LayoutVariant::Modular).unwrap();

        assert!(rendered.contains("snowflake_organization_name = \"Acme\""));
        assert!(!rendered.contains("snowflake_account_uuid"));
        assert!(rendered.contains("\n  order                       = 1\n"));
    }

    #[test]
    fn test_render_set_flat_omits_ownership() {
        let set = account_set("s1", "Compute", "abcd1234-xxxx");

        let rendered = render_set(&set, LayoutVariant::Flat).unwrap();

        assert!(!rendered.contains("snowflake_account_uuid"));
        assert!(!rendered.contains("snowflake_organization_name"));
    }

    #[test]
    fn test_render_group_scenario() {
        let gpu = group("g1", "GPU", "s1", Some(500), json!({"tag": "gpu"}));

        let rendered = render_group(&gpu, "compute___").unwrap();

        assert_eq!(
            rendered,
            "resource \"select_usage_group\" \"gpu\" {\n  name               = \"GPU\"\n  order              = 1\n  budget             = 500\n  usage_group_set_id = select_usage_group_set.compute___.id\n\n  filter_expression_json = jsonencode({\n  \"tag\": \"gpu\"\n})\n}"
        );
    }

    #[test]
    fn test_render_group_without_budget() {
        let g = group("g1", "GPU", "s1", None, json!({}));

        let rendered = render_group(&g, "compute").unwrap();

        assert!(!rendered.contains("budget"));
        assert!(rendered.contains("filter_expression_json = jsonencode({})"));
    }

    #[test]
    fn test_render_group_zero_budget_is_kept() {
        let g = group("g1", "GPU", "s1", Some(0), json!({}));

        let rendered = render_group(&g, "compute").unwrap();

        assert!(rendered.contains("  budget             = 0\n"));
    }

    #[test]
    fn test_render_group_filter_with_backspace_and_form_feed() {
        let g = group("g1", "GPU", "s1", None, json!({"tag": "a\u{8}b\u{c}"}));

        let rendered = render_group(&g, "compute").unwrap();

        assert!(rendered.contains(r#""tag": "a\u0008b\u000c""#));
    }

    #[test]
    fn test_render_set_flat_aligns_name_and_order() {
        let set = account_set("s1", "Compute", "abcd1234-xxxx");

        let rendered = render_set(&set, LayoutVariant::Flat).unwrap();

        assert!(rendered.contains("  name  = \"Compute\"\n  order = 1\n"));
    }

    #[test]
    fn test_render_group_references_parent_identifier_not_id() {
        let g = group("g1", "GPU", "raw-set-id", None, json!({}));

        let rendered = render_group(&g, "compute___").unwrap();

        assert!(rendered.contains("select_usage_group_set.compute___.id"));
        assert!(!rendered.contains("raw-set-id"));
    }

    #[test]
    fn test_render_group_escapes_name() {
        let g = group("g1", "Say \"hi\" ${now}", "s1", None, json!({}));

        let rendered = render_group(&g, "compute").unwrap();

        assert!(rendered.contains(r#"name               = "Say \"hi\" $${now}""#));
    }

    #[test]
    fn test_render_set_file_orders_set_before_groups() {
        let set = account_set("s1", "Compute", "abcd1234-xxxx");
        let groups = vec![
            group("g1", "GPU", "s1", Some(500), json!({"tag": "gpu"})),
            group("g2", "CPU", "s1", None, json!({"tag": "cpu"})),
        ];

        let file = render_set_file(&set, &groups, LayoutVariant::Modular).unwrap();

        assert!(file.starts_with("# Usage Group Set\nresource \"select_usage_group_set\" \"compute\""));
        let set_pos = file.find("select_usage_group_set\" \"compute\"").unwrap();
        let groups_header = file.find("# Usage Groups\n").unwrap();
        let gpu_pos = file.find("\"select_usage_group\" \"gpu\"").unwrap();
        let cpu_pos = file.find("\"select_usage_group\" \"cpu\"").unwrap();
        assert!(set_pos < groups_header);
        assert!(groups_header < gpu_pos);
        assert!(gpu_pos < cpu_pos);
        assert!(file.ends_with("}\n\n"));
    }

    #[test]
    fn test_render_set_file_without_groups() {
        let set = org_set("s1", "Empty", "Acme");

        let file = render_set_file(&set, &[], LayoutVariant::Modular).unwrap();

        assert!(file.ends_with("}\n\n# Usage Groups\n"));
        assert_eq!(file.matches("resource ").count(), 1);
    }
}
