use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use paypipe::Provider;
use paypipe::config::AppConfig;
use paypipe::domain::envelope::Params;
use paypipe::infrastructure::http::UreqTransport;
use paypipe::infrastructure::jsb::JsbGateway;
use paypipe::interfaces::json::params_reader::ParamsReader;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use url::Url;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Gateway configuration file (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the plugin chain an operation resolves to, without running it
    Plan {
        /// Operation identifier, e.g. jsb.scan
        operation: String,
    },
    /// Run an operation against the gateway and print the result as JSON
    Call {
        /// Operation identifier, e.g. jsb.scan
        operation: String,

        /// JSON file holding the call parameters
        #[arg(long)]
        params: PathBuf,

        /// Overrides the endpoint from the configuration file
        #[arg(long)]
        endpoint: Option<Url>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = AppConfig::from_path(&cli.config)?;

    match cli.command {
        Command::Plan { operation } => {
            let gateway = JsbGateway::new(config.jsb);
            let registry = Arc::new(gateway.registry());
            let provider = Provider::builder(gateway, registry).build();

            for (position, label) in provider
                .plan(&operation, &Params::new())?
                .iter()
                .enumerate()
            {
                println!("{}. {label}", position + 1);
            }
        }
        Command::Call {
            operation,
            params,
            endpoint,
        } => {
            if let Some(endpoint) = endpoint {
                config.jsb.endpoint = endpoint;
            }
            let params = ParamsReader::new(File::open(params).into_diagnostic()?).params()?;

            let gateway = JsbGateway::new(config.jsb);
            let registry = Arc::new(gateway.registry());
            let provider = Provider::builder(gateway, registry)
                .transport(Arc::new(UreqTransport::new(&config.http)))
                .build();

            let destination = provider.call(&operation, params)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&destination).into_diagnostic()?
            );
        }
    }

    Ok(())
}
