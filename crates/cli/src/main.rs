use clap::Parser;
use pref_dns_application::use_cases::engine::reports::CODE_EXECUTION;
use pref_dns_domain::CliOverrides;
use serde_json::json;
use std::process::ExitCode;
use tracing::{debug, error};

mod bootstrap;
mod cli;
mod commands;
mod di;
mod output;

use cli::{Cli, Format};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = cli.format;

    match run(cli).await {
        Ok(code) => exit_code(code),
        Err(e) => {
            error!(error = %e, "Startup failed");
            if format == Format::Json {
                let result = json!({
                    "code": CODE_EXECUTION,
                    "message": "execution_error",
                    "detail": format!("{:#}", e),
                });
                println!("{}", result);
            }
            eprintln!("Error: {:#}", e);
            exit_code(CODE_EXECUTION)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let cli_overrides = CliOverrides {
        log_level: cli.log_level.clone(),
        store_backend: cli.store.map(Into::into),
        store_dir: cli.store_dir.clone(),
        init_dir: cli.init_dir.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config.logging);
    bootstrap::log_config_summary(&config);

    let adapters = di::Adapters::new(&config);
    let use_cases = di::UseCases::new(&adapters, &config);

    debug!(command = ?cli.command, "Dispatching");
    Ok(commands::execute(cli.command, &use_cases, &config, cli.format).await)
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
