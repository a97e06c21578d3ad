//! Generation engine: turns fetched usage groups into Terraform files and an
//! import script.
//!
//! Two layouts are supported:
//!
//! - `modular` (default): one Terraform module per Snowflake account or
//!   organization, referenced from the root `main.tf`
//! - `flat`: every usage group set file directly in the output directory
//!
//! ```text
//! select_usage_groups/
//! ├── main.tf                  provider + module blocks
//! ├── import.sh                terraform import commands
//! └── account_abcd1234/
//!     ├── main.tf              provider requirement
//!     └── compute.tf           set + its usage groups
//! ```

pub mod grouping;
pub mod import_script;
pub mod layout;
pub mod render;
pub mod sanitize;

use clap::ValueEnum;
use serde::Deserialize;

pub use layout::{GeneratedLayout, LayoutAssembler, LayoutOptions, ProviderCredentials};
pub use sanitize::sanitize;

/// Output structure of the generated configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVariant {
    /// One module per Snowflake account/organization
    #[default]
    Modular,
    /// All files in the output directory, no modules
    Flat,
}

impl LayoutVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutVariant::Modular => "modular",
            LayoutVariant::Flat => "flat",
        }
    }

    pub fn is_modular(&self) -> bool {
        matches!(self, LayoutVariant::Modular)
    }
}

impl std::fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
