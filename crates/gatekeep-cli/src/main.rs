use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use gatekeep_types::CleanupRegistry;

mod cli;
mod commands;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    let registry = Arc::new(CleanupRegistry::new());
    spawn_signal_handler(Arc::clone(&registry));

    if let Err(err) = commands::run_command(cli, Arc::clone(&registry)).await {
        // A fatal error can leave a restore callback pending; drain it
        // before reporting so the working tree is consistent.
        registry.run_all().await;
        eprintln!("{}", err.to_string().red());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    if verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }
}

/// Run every pending cleanup callback before dying on a termination
/// signal, so an interrupted run never leaves the working tree in the
/// intermediate snapshot state.
fn spawn_signal_handler(registry: Arc<CleanupRegistry>) {
    tokio::spawn(async move {
        wait_for_termination().await;
        registry.run_all().await;
        std::process::exit(130);
    });
}

#[cfg(unix)]
async fn wait_for_termination() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut terminate =
        signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    let _ = tokio::signal::ctrl_c().await;
}
