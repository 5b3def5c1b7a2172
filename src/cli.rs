use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};

use crate::manifests::{self, Artifact};
use crate::operator_log;
use crate::options::Options;
use crate::settings;
use crate::tenancy;
use crate::tenants;

#[derive(Parser)]
#[command(name = "logstack-operator")]
#[command(about = "Logging stack gateway manifest tooling", version)]
pub struct Cli {
    #[arg(long, global = true, help = "Enable debug logging.")]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Render the gateway objects for a stack file.")]
    Render(RenderArgs),
    #[command(about = "Print the provider options after defaults are applied.")]
    Defaults(DefaultsArgs),
    #[command(about = "Inspect or change the persisted feature gates.")]
    Gates(GatesCommand),
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Parser)]
struct RenderArgs {
    #[arg(long)]
    stack: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,
    #[arg(
        long,
        help = "Generate cookie secrets for tenants that have none. Output is no longer reproducible."
    )]
    generate_cookie_secrets: bool,
}

#[derive(Parser)]
struct DefaultsArgs {
    #[arg(long)]
    stack: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,
}

#[derive(Parser)]
struct GatesCommand {
    #[command(subcommand)]
    command: GatesSubcommand,
}

#[derive(Subcommand)]
enum GatesSubcommand {
    Show,
    Set(GatesSetArgs),
}

#[derive(Parser)]
struct GatesSetArgs {
    #[arg(long)]
    http_encryption: Option<bool>,
    #[arg(long)]
    service_monitor_tls_endpoints: Option<bool>,
    #[arg(long)]
    serving_certs_service: Option<bool>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        operator_log::init(self.debug)?;
        match self.command {
            Command::Render(args) => args.run(),
            Command::Defaults(args) => args.run(),
            Command::Gates(gates) => gates.run(),
        }
    }
}

impl RenderArgs {
    fn run(self) -> anyhow::Result<()> {
        let mut opts = load_stack(&self.stack)?;
        if self.generate_cookie_secrets {
            let generated = tenants::generate_missing(&mut opts);
            info!(tenants = ?generated, "generated cookie secrets");
        }
        tenancy::apply_gateway_default_options(&mut opts)
            .with_context(|| format!("apply defaults for stack {}", opts.name))?;
        let artifacts = manifests::build_all(&opts)
            .with_context(|| format!("build objects for stack {}", opts.name))?;
        print!("{}", render_artifacts(&artifacts, self.format)?);
        Ok(())
    }
}

impl DefaultsArgs {
    fn run(self) -> anyhow::Result<()> {
        let mut opts = load_stack(&self.stack)?;
        tenancy::apply_gateway_default_options(&mut opts)
            .with_context(|| format!("apply defaults for stack {}", opts.name))?;
        print!("{}", render_value(&opts.openshift, self.format)?);
        Ok(())
    }
}

impl GatesCommand {
    fn run(self) -> anyhow::Result<()> {
        let mut settings = settings::load_settings()?;
        if let GatesSubcommand::Set(args) = self.command {
            let gates = &mut settings.feature_gates;
            if let Some(value) = args.http_encryption {
                gates.http_encryption = value;
            }
            if let Some(value) = args.service_monitor_tls_endpoints {
                gates.service_monitor_tls_endpoints = value;
            }
            if let Some(value) = args.serving_certs_service {
                gates.openshift.serving_certs_service = value;
            }
            settings::save_settings(&settings)?;
            info!(path = %settings::settings_path()?.display(), "saved feature gates");
        }
        print!(
            "{}",
            render_value(&settings.feature_gates, OutputFormat::Yaml)?
        );
        Ok(())
    }
}

/// Load a stack file and fill its unset feature gates from the persisted settings.
fn load_stack(path: &Path) -> anyhow::Result<Options> {
    let mut opts = Options::load(path)?;
    let persisted = settings::load_settings()?.feature_gates;
    opts.gates = opts.gate_overrides.resolve(&persisted);
    debug!(stack = %opts.name, mode = ?opts.mode(), "loaded stack");
    Ok(opts)
}

fn render_artifacts(artifacts: &[Artifact], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => render_value(&artifacts, format),
        OutputFormat::Yaml => {
            let mut out = String::new();
            for artifact in artifacts {
                out.push_str("---\n");
                let doc = serde_yaml_bw::to_string(artifact)
                    .with_context(|| format!("encode {} {}", artifact.kind(), artifact.name()))?;
                out.push_str(doc.trim_start_matches("---\n"));
            }
            Ok(out)
        }
    }
}

fn render_value<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(value).context("encode json")?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => serde_yaml_bw::to_string(value).context("encode yaml"),
    }
}
