//! Terminal front end for the todo store.
//!
//! Opens one sync session per invocation, applies the requested intent and
//! prints the resulting view. Exits non-zero when the final state carries an
//! error.

mod cli;
mod transport;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, ensure};
use clap::Parser;
use todo_core::{project, Intent, Session, TodoClient, TodoId};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Command};
use crate::transport::UreqTransport;

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    setup_tracing(args.verbose);

    ensure!(
        args.base_url.starts_with("http://") || args.base_url.starts_with("https://"),
        "base URL must start with http:// or https://, got {:?}",
        args.base_url
    );

    let intent = match args.command {
        Command::List => None,
        Command::Add { text, category } => match Intent::submit(&text, category.as_deref()) {
            Some(intent) => Some(intent),
            None => bail!("todo text must not be blank"),
        },
        Command::Delete { id } => {
            let id: TodoId = match id.trim().parse() {
                Ok(id) => id,
                Err(never) => match never {},
            };
            Some(Intent::RequestDelete { id })
        }
    };

    info!(base_url = %args.base_url, "opening session");
    let transport = UreqTransport::new(Duration::from_secs(args.timeout_secs));
    let mut session = Session::open(TodoClient::new(&args.base_url), transport);
    if let Some(intent) = intent {
        session.dispatch(intent);
    }

    let state = session.state();
    print!("{}", project(state));
    Ok(if state.last_error().is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn setup_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
