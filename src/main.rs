mod config;
mod email;
mod error;
mod purge;

use clap::Parser;
use std::io::Write;
use std::process::ExitCode;

use config::ConnectionParameters;
use email::imap::ImapConnector;
use error::PurgeError;
use purge::clock::SystemClock;
use purge::runner::{PurgeRunner, PurgeSummary};

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr, stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Exits with status 2 and usage on missing arguments
    let params = ConnectionParameters::parse();
    tracing::debug!("Parameters: {:?}", params);

    let runner = PurgeRunner::new(ImapConnector, params, SystemClock);
    let mut stdout = std::io::stdout().lock();

    let result = runner.run(&mut stdout).await;
    let code = exit_code(&result, &mut stdout);
    let _ = stdout.flush();
    code
}

/// Print fatal errors and map the run outcome to the process status.
/// Soft failures were already reported inline and still exit with 0.
fn exit_code<W: Write>(result: &Result<PurgeSummary, PurgeError>, out: &mut W) -> ExitCode {
    match result {
        Ok(summary) => {
            tracing::info!(
                "Done: {} total, {} purged, {} left",
                summary.total,
                summary.purged_ids.len(),
                summary.remaining
            );
            ExitCode::SUCCESS
        }
        Err(err) if !err.is_fatal() => {
            tracing::warn!("Run stopped early: {}", err);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{}", err);
            let _ = if err.is_protocol() {
                writeln!(out, "IMAP error: {}", err)
            } else {
                writeln!(out, "An error occurred: {}", err)
            };
            ExitCode::FAILURE
        }
    }
}
