//! Terminal runner (default binary).
//!
//! Reads commands line by line from stdin and prints the board on stdout;
//! logs go to stderr, filtered by `PHRASE_MASTER_LOG`.

use anyhow::{anyhow, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use phrase_master::cli::{parse_args, parse_line, LineCommand, USAGE};
use phrase_master::engine::{Engine, EngineConfig, EngineUpdate};
use phrase_master::services::{GeminiGenerator, JsonFileStore, PlainTextExtractor};
use phrase_master::view::{describe_event, needs_redraw, render_board, render_stats};

const FALLBACK_HISTORY_FILE: &str = "phrase-master-history.json";

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PHRASE_MASTER_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;
    if cli.help {
        println!("{USAGE}");
        return Ok(());
    }

    let mut config = EngineConfig::from_env();
    cli.apply_to(&mut config);
    if config.gemini.api_key.is_none() {
        tracing::warn!("no API key configured; puzzle generation will fail");
    }

    let history_path = config.history_path.clone().unwrap_or_else(|| {
        tracing::warn!("no data directory; keeping history in {FALLBACK_HISTORY_FILE}");
        FALLBACK_HISTORY_FILE.into()
    });
    let store = JsonFileStore::new(history_path);
    tracing::info!(path = %store.path().display(), "using history file");
    let generator = GeminiGenerator::new(config.gemini.clone())?;
    let (engine, updates) = Engine::new(
        config.seed_or_clock(),
        PlainTextExtractor::new(),
        generator,
        store,
    )
    .await;
    let mut handle = engine.spawn(updates, config.max_pending_commands);

    for cmd in cli.startup_commands() {
        handle.send(cmd).await?;
    }
    print!("{}", render_board(&handle.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line, &handle.snapshot()) {
                    Ok(None) => {}
                    Ok(Some(LineCommand::Quit)) => break,
                    Ok(Some(LineCommand::Show)) => print!("{}", render_board(&handle.snapshot())),
                    Ok(Some(LineCommand::Stats)) => print!("{}", render_stats(&handle.snapshot())),
                    Ok(Some(LineCommand::Help)) => println!("{USAGE}"),
                    Ok(Some(LineCommand::Engine(cmd))) => handle.send(cmd).await?,
                    Err(err) => println!("{err}"),
                }
            }
            update = handle.recv() => {
                let Some(update) = update else {
                    return Err(anyhow!("engine stopped unexpectedly"));
                };
                match &update {
                    EngineUpdate::Rejected { error, .. } => println!("{error}"),
                    EngineUpdate::Event(event) => {
                        if let Some(text) = describe_event(event) {
                            println!("{text}");
                        }
                    }
                    EngineUpdate::Applied { .. } => {}
                }
                if needs_redraw(&update) {
                    print!("{}", render_board(&handle.snapshot()));
                }
            }
        }
    }

    handle.shutdown().await?;
    Ok(())
}
