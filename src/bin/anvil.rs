use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use anvil::config::AgentConfig;
use anvil::manifest::{HostList, Manifest};
use anvil::runner::TaskRunner;
use anvil::transport::SshConnector;

#[derive(Parser)]
#[command(name = "anvil")]
#[command(about = "Minimal configuration management agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct AnvilCli {
    /// Agent configuration file
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,

    /// Manifest file with the ordered task list (overrides config)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Hosts file with one target per line (overrides config)
    #[arg(long)]
    hosts: Option<PathBuf>,

    /// Write the run report as JSON to the given path
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = AnvilCli::parse();

    // Initialize tracing
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    info!("Starting anvil v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AgentConfig::load(&cli.config)?;
    if let Some(manifest) = cli.manifest {
        config.manifest = manifest;
    }
    if let Some(hosts) = cli.hosts {
        config.hosts = hosts;
    }

    let manifest = Manifest::from_file(&config.manifest)?;
    let hosts = HostList::from_file(&config.hosts)?;

    info!(
        "loaded {} tasks for {} hosts",
        manifest.tasks.len(),
        hosts.hosts.len()
    );

    let connector = SshConnector::new(config.ssh.clone());
    let runner = TaskRunner::new(manifest, hosts);
    let report = runner.run(&connector).await;

    report.render();

    if let Some(path) = &cli.report_json {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        info!("report written to {}", path.display());
    }

    // An inconsistent service state halts the run and must reach the
    // operator as a distinct completion status.
    if report.fatal.is_some() {
        std::process::exit(2);
    }
    if !report.success() {
        std::process::exit(1);
    }

    Ok(())
}
