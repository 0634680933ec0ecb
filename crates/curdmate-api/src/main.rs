//! CurdMate CLI and REST API entry point.
//!
//! Binary name: `curdmate`
//!
//! Parses CLI arguments, sets up tracing, loads configuration, then runs the
//! interactive chat or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use curdmate_observe::tracing_setup::{self, LogFormat, TracingOptions};

use cli::{Cli, Commands};
use state::{AppState, Overrides};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "curdmate", &mut std::io::stdout());
        return Ok(());
    }

    tracing_setup::init_tracing(TracingOptions {
        format: if cli.log_json { LogFormat::Json } else { LogFormat::Pretty },
        otel: cli.otel,
        default_filter: tracing_setup::filter_for_verbosity(cli.verbose, cli.quiet),
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let overrides = Overrides {
        api_url: cli.api_url.clone(),
        ..Overrides::default()
    };

    let result = match cli.command {
        Commands::Chat { token_env } => {
            let state = AppState::init(&overrides).await?;
            cli::chat::loop_runner::run_chat_loop(&state, token_env.as_deref()).await
        }

        Commands::Serve { port, host } => {
            let overrides = Overrides {
                host,
                port,
                ..overrides
            };
            let state = AppState::init(&overrides).await?;
            serve(state).await
        }

        Commands::Config => {
            let state = AppState::init(&overrides).await?;
            cli::config::show_config(&state, cli.json);
            Ok(())
        }

        Commands::Completions { .. } => Ok(()),
    };

    tracing_setup::shutdown_tracing();
    result
}

async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let router = http::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!(
        "  {} REST API listening on {}",
        console::style("*").green().bold(),
        console::style(format!("http://{addr}")).cyan().underlined()
    );
    println!(
        "  {} {}",
        console::style("Health:").dim(),
        console::style(format!("http://{addr}/health")).dim()
    );
    println!();

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
