//! CLI entry point - the composition root.
//!
//! Configuration is resolved from the environment once, the runtime is wired
//! by [`bootstrap`], and each command is dispatched to its handler.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use asc_cli::{Cli, CliConfig, Commands, bootstrap, exit_code, handlers};
use asc_core::RequestContext;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Cancel `root` on the first Ctrl-C so in-flight work unwinds cleanly.
fn cancel_on_interrupt(root: RequestContext) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            root.cancel();
        }
    });
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    // Bootstrap the CLI context (composition root)
    let config = CliConfig::from_env()?;
    let ctx = bootstrap(config)?;
    cancel_on_interrupt(ctx.root().clone());

    match command {
        Commands::Get {
            path,
            paginate,
            limit,
        } => handlers::get::execute(&ctx, &path, paginate, limit).await,
        Commands::WaitBuildRun {
            id,
            interval,
            timeout,
        } => handlers::builds::wait(&ctx, &id, interval, timeout).await,
        Commands::Upload { file, operations } => {
            handlers::upload::execute(&ctx, &file, &operations).await
        }
        Commands::Checksum { file, algorithm } => handlers::checksum::execute(&file, algorithm).await,
        Commands::Download {
            url,
            dest,
            overwrite,
        } => handlers::download::execute(&ctx, &url, &dest, overwrite).await,
    }
}
