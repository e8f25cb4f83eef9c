use std::{
    io::{self, IsTerminal, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, load_settings_from, ChatExplainer, LedgerClient, Phase, SessionController,
    SessionState,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

use render::Renderer;

/// Explain a Sui transaction in plain English.
#[derive(Parser, Debug)]
struct Args {
    /// Transaction digest or explorer URL. Reads one per line from stdin when omitted.
    input: Option<String>,
    /// Config file (defaults to ./explain.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ledger JSON-RPC endpoint, e.g. a local relay.
    #[arg(long)]
    rpc_url: Option<String>,
    /// Chat model name.
    #[arg(long)]
    model: Option<String>,
    /// Also print the raw transaction record.
    #[arg(long)]
    raw: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => load_settings_from(path, |key| std::env::var(key).ok())?,
        None => load_settings()?,
    };
    if let Some(rpc_url) = args.rpc_url {
        settings.ledger_rpc_url = rpc_url;
    }
    if let Some(model) = args.model {
        settings.llm_model = model;
    }
    settings.validate()?;
    let chat = settings.chat_settings()?;
    debug!(rpc_url = %settings.ledger_rpc_url, model = %chat.model, "settings loaded");

    let controller = SessionController::new(
        Arc::new(LedgerClient::new(settings.ledger_rpc_url.clone())),
        Arc::new(ChatExplainer::new(chat)),
    );
    let mut events = controller.subscribe();
    let mut renderer = Renderer::new(args.raw);

    if let Some(input) = args.input {
        let final_state = run_submission(&controller, &mut events, &mut renderer, &input).await?;
        return Ok(if final_state.phase() == Phase::Failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    let interactive = io::stdin().is_terminal();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if interactive {
            print!("digest> ");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        run_submission(&controller, &mut events, &mut renderer, &line).await?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Submits one input and renders snapshots while it runs.
async fn run_submission(
    controller: &SessionController,
    events: &mut broadcast::Receiver<SessionState>,
    renderer: &mut Renderer,
    input: &str,
) -> Result<SessionState> {
    let mut stdout = io::stdout();
    let submit = controller.submit(input);
    tokio::pin!(submit);

    let final_state = loop {
        tokio::select! {
            final_state = &mut submit => break final_state,
            Ok(snapshot) = events.recv() => renderer.render(&snapshot, &mut stdout)?,
        }
    };

    while let Ok(snapshot) = events.try_recv() {
        renderer.render(&snapshot, &mut stdout)?;
    }
    renderer.render(&final_state, &mut stdout)?;
    Ok(final_state)
}
