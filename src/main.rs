use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

mod check;
mod config;
mod constants;
mod discovery;
mod formatter;
mod gcloud;
mod gcp;
mod kubeconfig;
mod types;

use check::{Checker, Diagnosis};
use config::{Cli, Config};
use formatter::Formatter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the diagnosis; `Ok(false)` means the GSA does not trust the KSA.
async fn run(cli: Cli) -> Result<bool> {
    let config = Config::from_cli(cli)?;
    let output = config.output;
    let checker = Checker::new(config).await?;
    match checker.diagnose().await? {
        Diagnosis::Granted(report) => {
            println!("{}", Formatter::new(output, report));
            Ok(true)
        }
        Diagnosis::Denied { pod, ksa, gsa } => {
            error!("{}", Diagnosis::denial_message(pod.as_deref(), &ksa, &gsa));
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let cli = Cli::parse_from(config::normalize_args(std::env::args_os()));
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
