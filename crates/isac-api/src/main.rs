//! `isac-server`: HTTP sensing service and one-shot sensing CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use isac_api::{build_state, export::export_csv, serve, ApiConfig};
use isac_core::{AreaId, Error, Result};
use isac_csi::SensingMode;

#[derive(Parser, Debug)]
#[command(name = "isac-server", version, about = "CSI presence sensing with adaptive topology")]
struct Args {
    /// Configuration file (TOML, YAML or JSON); `ISAC__*` variables override it
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,

    /// Run one sensing request and write the results as CSV
    Sense {
        /// Area to sense
        #[arg(long)]
        area: String,

        /// Frames per participating unit (1-50)
        #[arg(long, default_value = "10")]
        num_samples: usize,

        /// 1 = human, 2 = no human, 3 = variable
        #[arg(long, default_value = "3", value_parser = parse_mode)]
        mode: SensingMode,

        /// Output CSV path
        #[arg(long, value_name = "PATH", default_value = "results.csv")]
        output: PathBuf,
    },
}

fn parse_mode(s: &str) -> std::result::Result<SensingMode, String> {
    match s {
        "human" => Ok(SensingMode::Human),
        "no-human" => Ok(SensingMode::NoHuman),
        "variable" => Ok(SensingMode::Variable),
        _ => {
            let code: u8 = s.parse().map_err(|_| format!("unknown sensing mode '{s}'"))?;
            SensingMode::try_from(code).map_err(|e| e.to_string())
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = ApiConfig::load(args.config.as_deref())?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Sense {
            area,
            num_samples,
            mode,
            output,
        } => {
            let state = build_state(&config).await?;
            let area = AreaId::new(area);
            let outcome = state.orchestrator().sense(&area, num_samples, mode).await?;

            let present = outcome.results.iter().filter(|r| r.human_presence).count();
            tracing::info!(
                area = %area,
                frames = outcome.results.len(),
                present,
                topology = %outcome.current_topology,
                switched = outcome.topology_switched,
                "Sensing complete"
            );

            export_csv(&output, &area, &outcome)?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, retryable = e.is_retryable(), "isac-server failed");
        let code = match e {
            Error::Config(_) | Error::Model(_) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}
