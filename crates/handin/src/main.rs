//! `handin`: submit a puzzle solution directory by email.

mod cli;
mod prompt;
mod terminal;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use handin_core::{Environment, Error, Settings, SmtpTransport, SubmissionReport, submit};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::prompt::TerminalPrompt;
use crate::terminal::TerminalMode;

/// Exit status after Ctrl-C, as a shell would report SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")
    {
        Ok(runtime) => runtime,
        Err(err) => return report_error(&err),
    };

    let terminal = TerminalMode::capture();
    let outcome = runtime.block_on(run(&cli));
    if outcome.as_ref().is_err_and(is_interrupted) {
        // The abandoned prompt still has echo switched off.
        terminal.restore();
    }
    // An open password prompt cannot be cancelled; do not wait for it.
    runtime.shutdown_background();

    match outcome {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => report_error(&err),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "handin=debug,handin_core=debug,handin_smtp=debug"
    } else {
        "handin=info,handin_core=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

async fn run(cli: &Cli) -> anyhow::Result<SubmissionReport> {
    let settings = Settings::load(cli.config.as_deref())?;
    let env = Environment::capture();
    let request = cli.request();
    let transport = SmtpTransport::new(&settings.smtp);
    debug!("Request: {request:?}");

    tokio::select! {
        result = submit(&settings, &env, &request, &TerminalPrompt, &transport) => Ok(result?),
        _ = tokio::signal::ctrl_c() => Err(Error::Interrupted.into()),
    }
}

fn is_interrupted(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Error>().is_some_and(Error::is_interrupted)
}

fn report_error(err: &anyhow::Error) -> ExitCode {
    if is_interrupted(err) {
        eprintln!();
        eprintln!("aborted by user");
        return ExitCode::from(EXIT_INTERRUPTED);
    }
    eprintln!("error: {err:#}");
    eprintln!("hint: run 'handin --help' for usage");
    ExitCode::FAILURE
}
