use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::{Settings, SettingsFile, SettingsOverrides};
use crate::context::Context;
use crate::generator::{GeneratedLayout, LayoutAssembler, LayoutVariant};
use crate::select::SelectClient;
use crate::select::client::HttpClient;

/// Generate Terraform configuration and an import script from existing usage groups
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// SELECT API token (required)
    #[arg(short = 't', long, env = "SELECT_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// SELECT organization id
    #[arg(short = 'o', long, env = "SELECT_ORGANIZATION_ID")]
    org_id: Option<String>,

    /// SELECT API base URL [default: https://api.select.dev/]
    #[arg(long, env = "SELECT_BASE_URL")]
    base_url: Option<String>,

    /// Directory for the generated files [default: select_usage_groups]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Output structure [default: modular]
    #[arg(long, value_enum)]
    layout: Option<LayoutVariant>,

    /// Binary used in import.sh and the printed instructions [default: terraform]
    #[arg(long)]
    terraform_binary: Option<String>,

    /// YAML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// List the files that would be generated without writing them
    #[arg(long)]
    dry_run: bool,
}

impl GenerateCommand {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let settings = self.settings(ctx)?;
        let client = SelectClient::new(
            &settings.api_token,
            &settings.organization_id,
            &settings.base_url,
        )?;

        Self::run(ctx, &settings, &client, self.dry_run)
    }

    fn settings(&self, ctx: &Context) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => SettingsFile::load(&*ctx.fs, path)?,
            None => SettingsFile::default(),
        };

        let overrides = SettingsOverrides {
            api_token: self.token.clone(),
            organization_id: self.org_id.clone(),
            base_url: self.base_url.clone(),
            output_dir: self.output_dir.clone(),
            layout: self.layout,
            terraform_binary: self.terraform_binary.clone(),
        };

        Ok(Settings::resolve(overrides, file)?)
    }

    /// Fetch, assemble and write; the client is injected so tests can serve canned responses
    fn run<H: HttpClient>(
        ctx: &Context,
        settings: &Settings,
        client: &SelectClient<H>,
        dry_run: bool,
    ) -> Result<()> {
        ctx.output.section("SELECT Usage Groups to Terraform");
        ctx.output.key_value("Organization", &settings.organization_id);
        ctx.output.key_value("API", &settings.base_url);
        ctx.output.key_value_highlight("Layout", settings.layout.as_str());
        ctx.output
            .key_value("Output directory", &settings.output_dir.display().to_string());
        ctx.output.blank();

        let inventory = client.fetch_inventory(&*ctx.output)?;
        ctx.output.info(&format!(
            "Found {} usage group set(s) with {} usage group(s)",
            inventory.sets().len(),
            inventory.group_count()
        ));

        let assembler = LayoutAssembler::new(settings.layout_options())?;
        let layout = assembler.assemble(&inventory, &settings.credentials())?;

        if !layout.warnings.is_empty() {
            ctx.output.subsection("Warnings");
            for warning in &layout.warnings {
                ctx.output.warning(warning);
            }
        }

        if dry_run {
            ctx.output.subsection("Dry run");
            for file in &layout.files {
                let suffix = if file.executable { " (executable)" } else { "" };
                ctx.output
                    .list_item(&format!("{}{}", file.path.display(), suffix));
            }
            ctx.output.info("Dry run: no files were written");
            return Ok(());
        }

        ctx.output.subsection("Writing files");
        layout.write(&*ctx.fs, &*ctx.output).with_context(|| {
            format!(
                "Failed to write generated files to {}",
                layout.root.display()
            )
        })?;

        Self::print_summary(
            ctx,
            settings,
            &layout,
            inventory.sets().len(),
            inventory.group_count(),
        );
        Ok(())
    }

    fn print_summary(
        ctx: &Context,
        settings: &Settings,
        layout: &GeneratedLayout,
        set_count: usize,
        group_count: usize,
    ) {
        ctx.output.blank();
        ctx.output.success("Generation complete!");

        if layout.variant.is_modular() {
            ctx.output.info(&format!(
                "Generated modular structure with {} Snowflake account/organization module(s):",
                layout.modules.len()
            ));
            for module in &layout.modules {
                ctx.output.list_item(&format!(
                    "{}: {} usage group set(s) ({})",
                    module.key, module.set_count, module.owner
                ));
            }
        }

        ctx.output.key_value("Usage group sets", &set_count.to_string());
        ctx.output.key_value("Usage groups", &group_count.to_string());
        ctx.output
            .key_value("Import commands", &layout.import_count.to_string());

        let dir = layout.root.display();
        let bin = &settings.terraform_binary;
        ctx.output.next_steps(&[
            format!(
                "Optionally move the directory {} into your existing Terraform project",
                dir
            ),
            "WARNING: the API key you provided is hardcoded in main.tf! It should be stored securely."
                .to_string(),
            format!("cd {}", dir),
            format!("Run '{} init'", bin),
            "Run './import.sh' to import existing resources".to_string(),
            format!(
                "Run '{} plan', there may be some discrepancies between the existing resources and the Terraform configuration",
                bin
            ),
            format!(
                "Update the Terraform configuration to match the existing resources, until '{} plan' shows no discrepancies",
                bin
            ),
        ]);
    }
}
