mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use storefront_config::Config;
use storefront_core::{Storefront, StorefrontConfig};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let cfg = load_config(&cli.global)?;

    match cli.command {
        // Config commands never touch the network
        Command::Config(args) => commands::config_cmd::handle(args, &cfg, &cli.global),

        cmd => {
            let storefront = Storefront::new(build_storefront_config(&cfg, &cli.global)?)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &storefront, &cli.global).await
        }
    }
}

/// File + environment, then the `--api-url` flag on top.
fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = match &global.config {
        Some(path) => storefront_config::load_config_from(path)?,
        None => storefront_config::load_config()?,
    };
    if let Some(url) = &global.api_url {
        cfg.api_url.clone_from(url);
    }
    Ok(cfg)
}

fn build_storefront_config(cfg: &Config, global: &GlobalOpts) -> Result<StorefrontConfig, CliError> {
    storefront_config::to_storefront_config(cfg).map_err(|e| match e {
        storefront_config::ConfigError::Validation { field, reason }
            if field == "api_url" && global.api_url.is_some() =>
        {
            CliError::Validation {
                field: "--api-url".into(),
                reason,
            }
        }
        other => other.into(),
    })
}
