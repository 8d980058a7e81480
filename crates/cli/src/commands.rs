use crate::bootstrap::ActionLock;
use crate::cli::{Command, ConfigCommand, Format};
use crate::di::UseCases;
use crate::output::{emit, emit_error};
use pref_dns_application::use_cases::engine::reports::CODE_OK;
use pref_dns_application::use_cases::ActionError;
use pref_dns_domain::Config;
use pref_dns_jobs::{JobRunner, StatusPollJob};
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn execute(
    command: Command,
    use_cases: &UseCases,
    config: &Config,
    format: Format,
) -> i32 {
    let _lock = if command.writes() {
        match ActionLock::acquire(&config.lock).await {
            Ok(lock) => Some(lock),
            Err(e) => return emit_error(format, &ActionError::from(e)),
        }
    } else {
        None
    };

    let engine = &use_cases.engine;
    match command {
        Command::Resolve { domain, server } => match engine.resolve(&domain, &server).await {
            Ok(report) => emit(format, report.code, &report, &report.status_line()),
            Err(e) => emit_error(format, &e),
        },
        Command::Update => match engine.update().await {
            Ok(report) => emit(format, report.code, &report, &report.status_line()),
            Err(e) => emit_error(format, &e),
        },
        Command::CommitAndRestart => match engine.commit_and_restart().await {
            Ok(report) => emit(format, report.code, &report, &report.status_line()),
            Err(e) => emit_error(format, &e),
        },
        Command::Cron { action } => match engine.cron(action.into()).await {
            Ok(report) => emit(format, report.code, &report, &report.status_line()),
            Err(e) => emit_error(format, &e),
        },
        Command::Write => match engine.write_port().await {
            Ok(report) => emit(format, report.code, &report, &report.status_line()),
            Err(e) => emit_error(format, &e),
        },
        Command::Restore => match engine.restore().await {
            Ok(report) => emit(format, report.code, &report, &report.status_line()),
            Err(e) => emit_error(format, &e),
        },
        Command::Status { watch: false } => {
            let report = engine.status().await;
            emit(format, CODE_OK, &report, &report.status_line())
        }
        Command::Status { watch: true } => watch_status(use_cases, config, format).await,
        Command::Current => {
            let report = engine.current().await;
            emit(format, report.code, &report, &report.status_line())
        }
        Command::Config { command } => config_command(command, use_cases, format).await,
    }
}

async fn config_command(command: ConfigCommand, use_cases: &UseCases, format: Format) -> i32 {
    let engine = &use_cases.engine;
    match command {
        ConfigCommand::Get { field } => match engine.fields().get(&field).await {
            Ok(value) => emit(
                format,
                CODE_OK,
                &json!({ "code": CODE_OK, "field": field, "value": value }),
                &value,
            ),
            Err(e) => emit_error(format, &ActionError::from(e)),
        },
        ConfigCommand::Set { field, value } => match engine.set_field(&field, &value).await {
            Ok(()) => emit(
                format,
                CODE_OK,
                &json!({ "code": CODE_OK, "field": field, "value": value }),
                &format!("{} = {}", field, value),
            ),
            Err(e) => emit_error(format, &e),
        },
        ConfigCommand::Show => match engine.fields().show().await {
            Ok(fields) => {
                let lines = fields
                    .iter()
                    .map(|(name, value)| format!("{} = {}", name, value))
                    .collect::<Vec<_>>()
                    .join("\n");
                emit(
                    format,
                    CODE_OK,
                    &json!({ "code": CODE_OK, "fields": fields }),
                    &lines,
                )
            }
            Err(e) => emit_error(format, &ActionError::from(e)),
        },
    }
}

/// Prints one status snapshot per poll tick until Ctrl-C.
async fn watch_status(use_cases: &UseCases, config: &Config, format: Format) -> i32 {
    let token = CancellationToken::new();
    let job = StatusPollJob::new(use_cases.probe.clone(), use_cases.names.clone())
        .with_interval(Duration::from_secs(config.services.poll_interval_secs));
    let mut snapshots = job.subscribe();

    JobRunner::new()
        .with_status_poll(job)
        .with_shutdown_token(token.clone())
        .start()
        .await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping status watch");
                token.cancel();
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if let Some(report) = snapshot {
                    emit(format, CODE_OK, &report, &report.status_line());
                }
            }
        }
    }
    CODE_OK
}
