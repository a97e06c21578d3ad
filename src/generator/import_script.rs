//! `import.sh`: one `terraform import` per generated resource, sets before their groups.

use crate::select::UsageGroupInventory;

use super::LayoutVariant;
use super::grouping::AccountGroup;
use super::render::{GROUP_RESOURCE_TYPE, SET_RESOURCE_TYPE};

pub const DEFAULT_TERRAFORM_BINARY: &str = "terraform";

/// A single `terraform import <address> <id>` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCommand {
    /// Resource address, module-qualified in the modular layout
    pub address: String,
    /// Id understood by the provider's import implementation
    pub import_id: String,
    /// Progress message echoed before the import
    pub description: String,
}

/// Imports for one account module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSection {
    pub module: Option<String>,
    pub set_imports: Vec<ImportCommand>,
    pub group_imports: Vec<ImportCommand>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportScript {
    variant: LayoutVariant,
    terraform_binary: String,
    sections: Vec<ImportSection>,
}

impl ImportScript {
    /// Build the import plan in iteration order of the grouped sets
    pub fn build(
        groups: &[AccountGroup<'_>],
        inventory: &UsageGroupInventory,
        variant: LayoutVariant,
        terraform_binary: &str,
    ) -> Self {
        let sections = groups
            .iter()
            .map(|group| {
                let module = variant.is_modular().then(|| group.key.clone());
                let address = |resource_type: &str, name: &str| match &module {
                    Some(module) => format!("module.{}.{}.{}", module, resource_type, name),
                    None => format!("{}.{}", resource_type, name),
                };

                let set_imports = group
                    .sets
                    .iter()
                    .map(|set| ImportCommand {
                        address: address(SET_RESOURCE_TYPE, &set.identifier()),
                        import_id: set.id.clone(),
                        description: format!("Importing usage group set: {}", set.name),
                    })
                    .collect();

                let group_imports = group
                    .sets
                    .iter()
                    .flat_map(|set| inventory.groups_for(&set.id))
                    .map(|usage_group| ImportCommand {
                        address: address(GROUP_RESOURCE_TYPE, &usage_group.identifier()),
                        import_id: usage_group.import_id(),
                        description: format!("Importing usage group: {}", usage_group.name),
                    })
                    .collect();

                ImportSection {
                    module,
                    set_imports,
                    group_imports,
                }
            })
            .collect();

        Self {
            variant,
            terraform_binary: terraform_binary.to_string(),
            sections,
        }
    }

    #[cfg(test)]
    pub fn sections(&self) -> &[ImportSection] {
        &self.sections
    }

    /// All commands in execution order
    pub fn commands(&self) -> impl Iterator<Item = &ImportCommand> {
        self.sections
            .iter()
            .flat_map(|section| section.set_imports.iter().chain(&section.group_imports))
    }

    /// Render the bash script
    pub fn render(&self) -> String {
        let structure = match self.variant {
            LayoutVariant::Modular => " (modular structure)",
            LayoutVariant::Flat => "",
        };

        let mut lines = vec![
            "#!/bin/bash".to_string(),
            format!("# Terraform import script for SELECT usage groups{}", structure),
            format!(
                "# Run this script from this directory after running '{} init'",
                self.terraform_binary
            ),
            String::new(),
            "set -e".to_string(),
            String::new(),
            "echo \"Importing SELECT usage groups...\"".to_string(),
            String::new(),
        ];

        for section in &self.sections {
            if let Some(module) = &section.module {
                lines.push(echo(&format!("Importing resources for {}...", module)));
                lines.push(String::new());
            }

            for command in &section.set_imports {
                self.push_command(&mut lines, command);
            }
            lines.push(String::new());

            for command in &section.group_imports {
                self.push_command(&mut lines, command);
            }
            lines.push(String::new());
        }

        lines.push("echo \"Import completed successfully!\"".to_string());
        lines.push(format!(
            "echo \"You can now run '{} plan' to see any configuration drift.\"",
            self.terraform_binary
        ));

        let mut script = lines.join("\n");
        script.push('\n');
        script
    }

    fn push_command(&self, lines: &mut Vec<String>, command: &ImportCommand) {
        lines.push(echo(&command.description));
        lines.push(format!(
            "{} import {} {}",
            self.terraform_binary,
            shell_word(&command.address),
            shell_word(&command.import_id)
        ));
    }
}

fn echo(message: &str) -> String {
    format!("echo {}", shell_quote(message))
}

/// Quote text for the shell, preferring double quotes when nothing inside is special
fn shell_quote(text: &str) -> String {
    if text.chars().any(|c| matches!(c, '"' | '$' | '`' | '\\' | '!')) {
        format!("'{}'", text.replace('\'', r"'\''"))
    } else {
        format!("\"{}\"", text)
    }
}

/// Leave plain words bare, quote anything else
fn shell_word(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:@%+=,".contains(c));

    if plain {
        word.to_string()
    } else {
        shell_quote(word)
    }
}
