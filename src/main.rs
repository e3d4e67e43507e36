//! Quay Operator - renders QuayEcosystem workloads as Deployment manifests

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use kube::CustomResourceExt;
use tracing::info;

use quay_common::crd::QuayEcosystem;
use quay_common::telemetry::{init_tracing, TelemetryConfig};
use quay_workload::DeploymentCompiler;

/// Namespace used when neither the flag nor the manifest names one
const DEFAULT_NAMESPACE: &str = "default";

/// Quay Operator - workload synthesis for Quay registry ecosystems
#[derive(Parser, Debug)]
#[command(name = "quay-operator", version, about, long_about = None)]
struct Cli {
    /// Generate the QuayEcosystem CRD manifest and exit
    #[arg(long)]
    crd: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "QUAY_LOG_JSON", global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every Deployment of a QuayEcosystem
    ///
    /// Reads a QuayEcosystem manifest and prints the synthesized Deployments
    /// as a multi-document YAML stream, ready for `kubectl apply -f -`.
    Render(RenderArgs),
}

/// Render mode arguments
#[derive(Parser, Debug)]
struct RenderArgs {
    /// Path to the QuayEcosystem YAML manifest
    #[arg(short = 'f', long = "file", env = "QUAY_ECOSYSTEM_FILE")]
    file: PathBuf,

    /// Namespace to render into; defaults to the manifest's namespace
    #[arg(short = 'n', long, env = "QUAY_NAMESPACE")]
    namespace: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(TelemetryConfig {
        json: cli.log_json,
        ..Default::default()
    })?;

    if cli.crd {
        let crd = serde_yaml::to_string(&QuayEcosystem::crd())
            .context("failed to serialize QuayEcosystem CRD")?;
        println!("{crd}");
        return Ok(());
    }

    match cli.command {
        Some(Commands::Render(args)) => run_render(args),
        None => anyhow::bail!("nothing to do: pass --crd or a subcommand (see --help)"),
    }
}

/// Parse the manifest, synthesize its Deployments, and print them
fn run_render(args: RenderArgs) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let ecosystem = QuayEcosystem::from_yaml(&content)
        .with_context(|| format!("failed to parse QuayEcosystem from {}", args.file.display()))?;
    let name = ecosystem.ecosystem_name()?;

    let namespace = args
        .namespace
        .as_deref()
        .or(ecosystem.metadata.namespace.as_deref())
        .unwrap_or(DEFAULT_NAMESPACE);

    info!(ecosystem = name, namespace, "rendering deployments");

    let deployments = DeploymentCompiler::new(name, namespace, &ecosystem.spec)
        .compile_all()
        .with_context(|| format!("failed to synthesize deployments for {name}"))?;

    let mut documents = Vec::with_capacity(deployments.len());
    for deployment in deployments.iter() {
        documents.push(
            serde_yaml::to_string(deployment)
                .with_context(|| format!("failed to serialize {}", deployment.metadata.name))?,
        );
    }

    info!(count = documents.len(), "rendered deployments");
    print!("---\n{}", documents.join("---\n"));
    Ok(())
}
