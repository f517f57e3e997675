use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::sync::Arc;

use samplegraph::catalog::{Catalog, Configuration};
use samplegraph::config::{self, OutputFormat};
use samplegraph::query_generator::SnowflakeDialect;
use samplegraph::sample_plan::Planner;

/// Samplegraph - builds sampling plans for database replicas
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile the sampling statements of every relation in a replica
    Compile(CompileArgs),
}

#[derive(Args)]
struct CompileArgs {
    /// Replica configuration file (falls back to SAMPLEGRAPH_CONFIG)
    #[arg(long)]
    config: Option<String>,

    /// Catalog snapshot, YAML or JSON (falls back to SAMPLEGRAPH_CATALOG)
    #[arg(long)]
    catalog: Option<String>,

    /// Wrap statements so they report sample and population sizes
    #[arg(long)]
    analyze: bool,

    /// Number of sub-graphs compiled concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

impl From<CompileArgs> for config::CliConfig {
    fn from(args: CompileArgs) -> Self {
        config::CliConfig {
            config_path: args.config,
            catalog_path: args.catalog,
            workers: args.workers,
            analyze: args.analyze,
            output_format: args.format,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Compile(args) => compile(args).await,
    }
}

async fn compile(args: CompileArgs) -> anyhow::Result<()> {
    let run = config::RunConfig::from_cli(args.into()).context("Invalid run configuration")?;

    let replica = Configuration::from_yaml_file(&run.config_path)
        .with_context(|| format!("Failed to load replica config '{}'", run.config_path))?;
    let catalog = Catalog::from_file(&run.catalog_path)
        .with_context(|| format!("Failed to load catalog '{}'", run.catalog_path))?;
    info!(
        "Loaded {} relations from '{}'",
        catalog.len(),
        run.catalog_path
    );

    let planner = Planner::from_run_config(Arc::new(SnowflakeDialect), &run);
    let plan = planner
        .plan(&replica, catalog)
        .await
        .context("Failed to compile sample plan")?;

    println!("{}", plan.render(run.output_format)?);
    Ok(())
}
