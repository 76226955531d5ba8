//! CLI binary for the search panel.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use search_merge::{ProviderId, ResultRecord};
use search_panel::{PanelConfig, ResultProvider, Scenario, SearchSession, StaticProvider};
use tracing_subscriber::EnvFilter;

/// Replay search scenarios and run queries against fixture providers.
#[derive(Parser)]
#[command(name = "search-replay", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Replay a JSON scenario and print one report per step.
    Replay {
        /// Scenario file.
        scenario: PathBuf,
    },

    /// Run queries through a session backed by fixture providers.
    Search {
        /// JSON object mapping provider ids to their records.
        #[arg(short, long)]
        providers: PathBuf,

        /// Queries to run, in order.
        #[arg(required = true)]
        queries: Vec<String>,
    },

    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    match cli.command {
        Command::Replay { scenario } => run_replay(&scenario, &config),
        Command::Search { providers, queries } => run_search(&providers, &queries, &config).await,
        Command::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PanelConfig> {
    if let Some(path) = path {
        return Ok(PanelConfig::from_file(path)?);
    }
    let default_path = PanelConfig::default_config_path();
    if default_path.exists() {
        Ok(PanelConfig::from_file(&default_path)?)
    } else {
        Ok(PanelConfig::default())
    }
}

fn run_replay(path: &Path, config: &PanelConfig) -> anyhow::Result<()> {
    let scenario = Scenario::from_file(path)?;
    let reports = search_panel::replay(&scenario, config)?;
    for report in &reports {
        println!("{}", serde_json::to_string(report)?);
    }
    if let Some(bad) = reports.iter().find(|r| !r.mirror_in_sync) {
        anyhow::bail!("observer mirror diverged at step {}", bad.index);
    }
    Ok(())
}

async fn run_search(path: &Path, queries: &[String], config: &PanelConfig) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)?;
    let fixtures: HashMap<ProviderId, Vec<ResultRecord>> = serde_json::from_str(&content)?;

    // Precedence order first, then any extra providers by name.
    let mut ids: Vec<ProviderId> = fixtures.keys().cloned().collect();
    ids.sort_by_key(|id| {
        let position = config.pipeline.merge_order.iter().position(|p| p == id);
        (position.unwrap_or(usize::MAX), id.as_str().to_owned())
    });
    let providers: Vec<Arc<dyn ResultProvider>> = ids
        .into_iter()
        .filter_map(|id| {
            let records = fixtures.get(&id)?.clone();
            Some(Arc::new(StaticProvider::new(id, records)) as Arc<dyn ResultProvider>)
        })
        .collect();

    let session = SearchSession::from_config(config, providers)?;
    for query in queries {
        let outcome = session.submit(query.as_str()).await?;
        let line = serde_json::json!({
            "query": query,
            "size": outcome.size,
            "results": outcome.results.iter().map(|r| r.stable_id).collect::<Vec<_>>(),
            "publication": outcome.publication,
        });
        println!("{line}");
    }
    session.shutdown().await?;
    Ok(())
}
