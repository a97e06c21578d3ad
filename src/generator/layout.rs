use std::path::PathBuf;

use crate::error::GenerateResult;
use crate::hcl::{Block, Expression};
use crate::select::UsageGroupInventory;
use crate::template::DocumentRenderer;
use crate::traits::{FileSystem, Output};

use super::LayoutVariant;
use super::grouping::{AccountGroup, partition};
use super::import_script::ImportScript;
use super::render::{GROUP_RESOURCE_TYPE, SET_RESOURCE_TYPE, render_set_file};
use super::sanitize::find_identifier_collisions;

pub const IMPORT_SCRIPT_NAME: &str = "import.sh";
pub const MAIN_FILE_NAME: &str = "main.tf";

/// Credentials written into the root provider block
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub api_key: String,
    pub organization_id: String,
}

#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub variant: LayoutVariant,
    pub output_dir: PathBuf,
    pub terraform_binary: String,
}

/// A file ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
    pub executable: bool,
}

impl GeneratedFile {
    fn new(path: PathBuf, contents: String) -> Self {
        Self {
            path,
            contents,
            executable: false,
        }
    }
}

/// One generated module, for the end-of-run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSummary {
    pub key: String,
    pub owner: String,
    pub set_count: usize,
}

/// Everything a run produces, in write order
#[derive(Debug, Clone)]
pub struct GeneratedLayout {
    pub root: PathBuf,
    pub variant: LayoutVariant,
    pub files: Vec<GeneratedFile>,
    pub modules: Vec<ModuleSummary>,
    pub import_count: usize,
    pub warnings: Vec<String>,
}

impl GeneratedLayout {
    /// Final contents of a path; later files replace earlier ones with the same path
    #[cfg(test)]
    pub fn file(&self, path: &std::path::Path) -> Option<&GeneratedFile> {
        self.files.iter().rev().find(|file| file.path == path)
    }

    /// Write every file in order and mark the import script executable
    pub fn write(&self, fs: &dyn FileSystem, output: &dyn Output) -> GenerateResult<()> {
        fs.create_dir_all(&self.root)?;

        for file in &self.files {
            if let Some(parent) = file.path.parent() {
                fs.create_dir_all(parent)?;
            }

            fs.write(&file.path, &file.contents)?;

            if file.executable {
                fs.set_executable(&file.path)?;
            }

            output.success(&format!("Generated {}", file.path.display()));
        }

        Ok(())
    }
}

/// Decides module boundaries and file paths and assembles all generated files
pub struct LayoutAssembler {
    options: LayoutOptions,
    documents: DocumentRenderer,
}

impl LayoutAssembler {
    pub fn new(options: LayoutOptions) -> GenerateResult<Self> {
        Ok(Self {
            options,
            documents: DocumentRenderer::new()?,
        })
    }

    pub fn assemble(
        &self,
        inventory: &UsageGroupInventory,
        credentials: &ProviderCredentials,
    ) -> GenerateResult<GeneratedLayout> {
        let variant = self.options.variant;
        let root = self.options.output_dir.clone();
        let groups = partition(inventory.sets(), variant);

        let mut files = Vec::new();
        let mut warnings = Vec::new();

        for group in &groups {
            let dir = self.module_dir(group);

            if variant.is_modular() {
                files.push(GeneratedFile::new(
                    dir.join(MAIN_FILE_NAME),
                    self.documents.render_module_main()?,
                ));
            }

            for set in &group.sets {
                files.push(GeneratedFile::new(
                    dir.join(format!("{}.tf", set.identifier())),
                    render_set_file(set, inventory.groups_for(&set.id), variant)?,
                ));
            }

            warnings.extend(self.scope_warnings(group, inventory));
        }

        let script = ImportScript::build(
            &groups,
            inventory,
            variant,
            &self.options.terraform_binary,
        );
        let import_count = script.commands().count();
        files.push(GeneratedFile {
            path: root.join(IMPORT_SCRIPT_NAME),
            contents: script.render(),
            executable: true,
        });

        let modules_section = if variant.is_modular() {
            modules_section(&groups)?
        } else {
            String::new()
        };
        files.push(GeneratedFile::new(
            root.join(MAIN_FILE_NAME),
            self.documents.render_root_main(
                &credentials.api_key,
                &credentials.organization_id,
                &modules_section,
            )?,
        ));

        let modules = if variant.is_modular() {
            groups
                .iter()
                .map(|group| ModuleSummary {
                    key: group.key.clone(),
                    owner: group
                        .ownership()
                        .map(|ownership| ownership.describe())
                        .unwrap_or_default(),
                    set_count: group.sets.len(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(GeneratedLayout {
            root,
            variant,
            files,
            modules,
            import_count,
            warnings,
        })
    }

    fn module_dir(&self, group: &AccountGroup<'_>) -> PathBuf {
        if self.options.variant.is_modular() {
            self.options.output_dir.join(&group.key)
        } else {
            self.options.output_dir.clone()
        }
    }

    /// Collisions inside one Terraform module (or the flat output directory)
    fn scope_warnings(
        &self,
        group: &AccountGroup<'_>,
        inventory: &UsageGroupInventory,
    ) -> Vec<String> {
        let scope = if self.options.variant.is_modular() {
            format!("module '{}'", group.key)
        } else {
            "the output directory".to_string()
        };
        let mut warnings = Vec::new();

        if self.options.variant.is_modular() {
            let conflicts = group.ownership_conflicts();
            if let (Some(first), false) = (group.ownership(), conflicts.is_empty()) {
                let others: Vec<String> = conflicts
                    .iter()
                    .map(|set| format!("'{}' ({})", set.name, set.ownership.describe()))
                    .collect();
                warnings.push(format!(
                    "{} merges sets with different owners: {} is grouped with {}",
                    scope,
                    first.describe(),
                    others.join(", ")
                ));
            }
        }

        for collision in find_identifier_collisions(group.sets.iter().map(|s| s.name.as_str())) {
            warnings.push(format!(
                "Usage group sets {} in {} all map to {}.{}; only the last {}.tf is kept",
                quote_names(&collision.names),
                scope,
                SET_RESOURCE_TYPE,
                collision.identifier,
                collision.identifier
            ));
        }

        let group_names = group
            .sets
            .iter()
            .flat_map(|set| inventory.groups_for(&set.id))
            .map(|usage_group| usage_group.name.as_str());
        for collision in find_identifier_collisions(group_names) {
            warnings.push(format!(
                "Usage groups {} in {} all map to {}.{}",
                quote_names(&collision.names),
                scope,
                GROUP_RESOURCE_TYPE,
                collision.identifier
            ));
        }

        let main_stem = MAIN_FILE_NAME.trim_end_matches(".tf");
        for set in group.sets.iter().filter(|set| set.identifier() == main_stem) {
            warnings.push(format!(
                "Usage group set '{}' in {} is written to {} and clashes with the generated configuration",
                set.name, scope, MAIN_FILE_NAME
            ));
        }

        warnings
    }
}

/// Module blocks for the root `main.tf`, one per account group
fn modules_section(groups: &[AccountGroup<'_>]) -> GenerateResult<String> {
    if groups.is_empty() {
        return Ok(String::new());
    }

    let blocks = groups
        .iter()
        .map(|group| {
            let owner = group
                .ownership()
                .map(|ownership| ownership.describe())
                .unwrap_or_default();

            Block::new("module")
                .label(&group.key)
                .comment(owner)
                .attribute("source", Expression::string(format!("./{}", group.key)))
                .render()
        })
        .collect::<GenerateResult<Vec<String>>>()?;

    Ok(format!(
        "\n# Usage Group Modules by Snowflake Account/Organization\n\n{}\n",
        blocks.join("\n\n")
    ))
}

fn quote_names(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("'{}'", name))
        .collect::<Vec<_>>()
        .join(", ")
}
