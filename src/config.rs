//! Run settings.
//!
//! Values come from CLI flags (or their environment variables), then an
//! optional YAML settings file, then built-in defaults:
//!
//! ```yaml
//! organization_id: my-org
//! base_url: https://api.select.dev/
//! output_dir: select_usage_groups
//! layout: flat
//! terraform_binary: tofu
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{GenerateError, GenerateResult};
use crate::generator::import_script::DEFAULT_TERRAFORM_BINARY;
use crate::generator::{LayoutOptions, LayoutVariant, ProviderCredentials};
use crate::select::DEFAULT_BASE_URL;
use crate::select::client::parse_base_url;
use crate::traits::FileSystem;

pub const DEFAULT_OUTPUT_DIR: &str = "select_usage_groups";

lazy_static! {
    // Written unquoted into import.sh, so only plain path characters are allowed
    static ref TERRAFORM_BINARY: Regex = Regex::new(r"^[A-Za-z0-9_./-]+$").unwrap();
}

/// Contents of the optional `--config` YAML file
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub organization_id: Option<String>,
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub layout: Option<LayoutVariant>,
    pub terraform_binary: Option<String>,
}

impl SettingsFile {
    pub fn load(fs: &dyn FileSystem, path: &Path) -> GenerateResult<Self> {
        let content = fs.read_to_string(path).map_err(|e| {
            GenerateError::Config(format!("Failed to read settings file {:?}: {:#}", path, e))
        })?;

        // An empty document deserializes as null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| {
            GenerateError::Config(format!("Failed to parse settings file {:?}: {}", path, e))
        })
    }
}

/// Values given on the command line or through environment variables
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
    pub api_token: Option<String>,
    pub organization_id: Option<String>,
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub layout: Option<LayoutVariant>,
    pub terraform_binary: Option<String>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_token: String,
    pub organization_id: String,
    pub base_url: String,
    pub output_dir: PathBuf,
    pub layout: LayoutVariant,
    pub terraform_binary: String,
}

impl Settings {
    pub fn resolve(overrides: SettingsOverrides, file: SettingsFile) -> GenerateResult<Self> {
        let api_token = overrides
            .api_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                GenerateError::Config(
                    "API token is required (--token or SELECT_API_TOKEN)".to_string(),
                )
            })?;

        let organization_id = overrides
            .organization_id
            .or(file.organization_id)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                GenerateError::Config(
                    "Organization id is required (--org-id, SELECT_ORGANIZATION_ID or 'organization_id' in the settings file)"
                        .to_string(),
                )
            })?;

        let base_url = overrides
            .base_url
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&base_url)?.to_string();

        let terraform_binary = overrides
            .terraform_binary
            .or(file.terraform_binary)
            .unwrap_or_else(|| DEFAULT_TERRAFORM_BINARY.to_string());
        if !TERRAFORM_BINARY.is_match(&terraform_binary) {
            return Err(GenerateError::Config(format!(
                "Terraform binary '{}' may only contain letters, digits, '_', '.', '/' and '-'",
                terraform_binary
            )));
        }

        Ok(Self {
            api_token,
            organization_id,
            base_url,
            output_dir: overrides
                .output_dir
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            layout: overrides.layout.or(file.layout).unwrap_or_default(),
            terraform_binary,
        })
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            variant: self.layout,
            output_dir: self.output_dir.clone(),
            terraform_binary: self.terraform_binary.clone(),
        }
    }

    pub fn credentials(&self) -> ProviderCredentials {
        ProviderCredentials {
            api_key: self.api_token.clone(),
            organization_id: self.organization_id.clone(),
        }
    }
}
