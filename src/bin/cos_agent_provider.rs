use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use cos_agent_provider::relation::discover_databags;
use cos_agent_provider::{
    DatabagRelation, Endpoint, MarkerFlags, MetricsEndpointSpec, ProviderConfig, PublishReport,
    RelationData, RelationEvent, UnitData,
};

#[derive(Parser)]
#[command(name = "cos-agent-provider", version, about = "Publish scrape jobs over the cos-agent relation")]
struct Cli {
    /// Root directory holding relation databags and flag markers
    #[arg(long, default_value = "./cos-agent")]
    root: PathBuf,

    /// JSON config file ({"charm_name": ..., "endpoint_name": ...})
    #[arg(long)]
    config: Option<PathBuf>,

    /// Charm name (default: COS_AGENT_CHARM_NAME or JUJU_UNIT_NAME)
    #[arg(long)]
    charm_name: Option<String>,

    /// Endpoint name (default: cos-agent)
    #[arg(long)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish scrape jobs to every relation
    Publish {
        /// JSON array of {"path", "port", "job_name"?}; omit for the default job
        #[arg(long)]
        endpoints: Option<PathBuf>,
    },
    /// Remove published data from every relation
    Clear,
    /// Dispatch a lifecycle event
    Event {
        /// joined, changed, broken or departed
        event: RelationEvent,
    },
    /// Print the record published to each relation
    Show,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let flags = MarkerFlags::open(cli.root.join("flags"))
        .with_context(|| format!("open flags under {}", cli.root.display()))?;
    let mut endpoint = Endpoint::new(&config, flags);
    for relation in discover_databags(&cli.root, &config.endpoint_name)
        .with_context(|| format!("discover relations under {}", cli.root.display()))?
    {
        endpoint.attach(relation);
    }
    info!(
        "{}: {} relations under {}",
        endpoint.name(),
        endpoint.relations().count(),
        cli.root.display()
    );

    match cli.command {
        Commands::Publish { endpoints } => {
            let specs = match endpoints {
                Some(path) => Some(load_endpoints(&path)?),
                None => None,
            };
            let report = endpoint.update_relation_data(specs.as_deref())?;
            finish("publish", report)
        }
        Commands::Clear => finish("clear", endpoint.clear_relation_data()),
        Commands::Event { event } => {
            let report = endpoint.handle(event)?;
            finish(event.as_str(), report)
        }
        Commands::Show => show(&endpoint),
    }
}

fn resolve_config(cli: &Cli) -> Result<ProviderConfig> {
    let mut config = match (&cli.config, &cli.charm_name) {
        (Some(path), _) => ProviderConfig::from_json_file(path)?,
        (None, Some(name)) => ProviderConfig::new(name.clone()),
        (None, None) => ProviderConfig::from_env()?,
    };
    if let Some(name) = &cli.charm_name {
        config.charm_name = name.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint_name = endpoint.clone();
    }
    Ok(config)
}

fn load_endpoints(path: &Path) -> Result<Vec<MetricsEndpointSpec>> {
    let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parse {}", path.display()))
}

fn finish(action: &str, report: PublishReport) -> Result<()> {
    let total = report.updated.len() + report.failed.len();
    if report.is_complete() {
        println!("{action}: {total} relations ok");
        return Ok(());
    }
    for (relation, err) in &report.failed {
        eprintln!("{action}: {relation}: {err}");
    }
    for (flag, err) in &report.flag_errors {
        eprintln!("{action}: flag {flag}: {err}");
    }
    bail!(
        "{action}: {}/{total} relations failed, {} flags not cleared",
        report.failed.len(),
        report.flag_errors.len()
    )
}

fn show(endpoint: &Endpoint<DatabagRelation, MarkerFlags>) -> Result<()> {
    for relation in endpoint.relations() {
        match relation.get(UnitData::KEY)? {
            Some(value) => println!("{}: {}", relation.id(), serde_json::to_string_pretty(&value)?),
            None => println!("{}: <none>", relation.id()),
        }
    }
    Ok(())
}
