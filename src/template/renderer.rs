use handlebars::{Handlebars, Helper, HelperResult, Output, RenderContext, RenderErrorReason};
use serde::Serialize;
use serde_json::json;

use crate::error::GenerateResult;
use crate::hcl::quote_string;

const ROOT_MAIN_TEMPLATE: &str = "root_main";
const MODULE_MAIN_TEMPLATE: &str = "module_main";

const ROOT_MAIN: &str = r#"# SELECT Terraform Provider Configuration
#
# SECURITY WARNING: This file contains a hardcoded API key!
# The API key is sensitive information and should be stored securely.
# Consider using environment variables, terraform.tfvars (in .gitignore),
# or a secret management system for production use.

terraform {
  required_providers {
    select = {
      source = {{hcl_string provider_source}}
    }
  }
}

provider "select" {
  # SECURITY WARNING: move this API key to a secure location
  api_key         = {{hcl_string api_key}}
  organization_id = {{hcl_string organization_id}}
}
{{modules_section}}"#;

const MODULE_MAIN: &str = r#"# This module inherits the provider configuration from the root module
terraform {
  required_providers {
    select = {
      source = {{hcl_string provider_source}}
    }
  }
}
"#;

pub const PROVIDER_SOURCE: &str = "get-select/select";

#[derive(Serialize)]
struct RootMainData<'a> {
    provider_source: &'a str,
    api_key: &'a str,
    organization_id: &'a str,
    modules_section: &'a str,
}

/// Renders the fixed Terraform documents (root and module `main.tf`) using Handlebars
pub struct DocumentRenderer {
    handlebars: Handlebars<'static>,
}

impl DocumentRenderer {
    /// Create a renderer with the built-in templates registered
    pub fn new() -> GenerateResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        // Register custom helpers
        handlebars.register_helper("hcl_string", Box::new(hcl_string_helper));

        handlebars.register_template_string(ROOT_MAIN_TEMPLATE, ROOT_MAIN)?;
        handlebars.register_template_string(MODULE_MAIN_TEMPLATE, MODULE_MAIN)?;

        Ok(Self { handlebars })
    }

    /// Root `main.tf`: provider requirement, provider credentials and the module section
    pub fn render_root_main(
        &self,
        api_key: &str,
        organization_id: &str,
        modules_section: &str,
    ) -> GenerateResult<String> {
        let data = RootMainData {
            provider_source: PROVIDER_SOURCE,
            api_key,
            organization_id,
            modules_section,
        };

        Ok(self.handlebars.render(ROOT_MAIN_TEMPLATE, &data)?)
    }

    /// Module `main.tf`: provider requirement only, credentials come from the root
    pub fn render_module_main(&self) -> GenerateResult<String> {
        Ok(self.handlebars.render(
            MODULE_MAIN_TEMPLATE,
            &json!({ "provider_source": PROVIDER_SOURCE }),
        )?)
    }
}

/// Helper writing its parameter as a quoted, escaped HCL string literal
fn hcl_string_helper(
    h: &Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param = h
        .param(0)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("hcl_string", 0))?;

    let text = match param.value().as_str() {
        Some(s) => s.to_string(),
        None => param.value().to_string(),
    };

    out.write(&quote_string(&text))?;
    Ok(())
}
