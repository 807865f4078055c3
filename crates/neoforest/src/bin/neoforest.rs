//! Command-line entry point: export a Neo4j graph to a nested JSON document.
#![forbid(unsafe_code)]

use clap::{ArgAction, Parser};
use log::{error, info};
use neoforest::logging::{init_logging, level_for_verbosity};
use neoforest::{export_graph, ExportConfig, HttpSource, NodeOrder, Result};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "neoforest",
    version,
    about = "Export a property graph as a containment forest plus a flat edge list"
)]
struct Cli {
    #[arg(long, short = 'c', value_name = "FILE", help = "TOML configuration file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Graph store host")]
    host: Option<String>,

    #[arg(long, help = "Graph store HTTP port")]
    port: Option<u16>,

    #[arg(long, short = 'u', help = "User to authenticate as")]
    user: Option<String>,

    #[arg(long, env = "NEO4J_PASSWORD", hide_env_values = true, help = "Password")]
    password: Option<String>,

    #[arg(long, help = "Database to export")]
    database: Option<String>,

    #[arg(long, short = 'o', value_name = "FILE", help = "Output file [default: output.json]")]
    output: Option<PathBuf>,

    #[arg(long, value_name = "TYPE", help = "Containment relationship type [default: CONTAINS]")]
    containment_type: Option<String>,

    #[arg(long, help = "Order roots and children by ascending id")]
    sort_by_id: bool,

    #[arg(short, long, action = ArgAction::Count, help = "Increase log detail (-v debug, -vv trace)")]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::load(path)?,
            None => ExportConfig::default(),
        };

        let connection = &mut config.connection;
        if let Some(host) = self.host {
            connection.host = host;
        }
        if let Some(port) = self.port {
            connection.port = port;
        }
        if let Some(user) = self.user {
            connection.username = user;
        }
        if let Some(password) = self.password {
            connection.password = Some(password);
        }
        if let Some(database) = self.database {
            connection.database = database;
        }

        let export = &mut config.export;
        if let Some(output) = self.output {
            export.output = output;
        }
        if let Some(containment_type) = self.containment_type {
            export.containment_type = containment_type;
        }
        if self.sort_by_id {
            export.order = NodeOrder::IdAscending;
        }

        Ok(config)
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config()?;
    info!("Exporting from {:?}", config.connection);

    let source = HttpSource::new(&config.connection)?;
    let summary = export_graph(&source, &config.export)?;

    println!("Data has been written to {}", summary.output.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(level_for_verbosity(cli.verbose)) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Export failed: {e}");
            ExitCode::FAILURE
        }
    }
}
