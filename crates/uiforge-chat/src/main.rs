//! Chat with the uiforge component generator from the terminal.
//!
//! Reads the API key from the `OPENROUTER_KEY` environment variable.
//! Sessions are stored as JSON files under `--sessions-dir`.
//!
//! # Examples
//!
//! ```sh
//! # Interactive loop, writing generated files to ./out
//! uiforge-chat chat --emit ./out
//!
//! # Single turn, machine-readable output
//! uiforge-chat --json send "a pricing card with three tiers"
//!
//! # Continue a session
//! uiforge-chat send --session 0b6f...e1 "make the middle tier highlighted"
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uiforge::prelude::*;
use uiforge::{DEFAULT_CLASSIFIER_MODEL, DEFAULT_MODEL};
use uiforge_chat::{
    GENERATION_FAILED, SessionRecord, SessionStore, TurnError, begin_turn, emit_artifacts,
    open_session, run_turn, validate_message,
};

/// Chat with the uiforge component generator.
#[derive(Parser)]
#[command(name = "uiforge-chat", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    // ── Storage ────────────────────────────────────────────────
    /// Directory holding session files
    #[arg(long, global = true, default_value = ".uiforge/sessions")]
    sessions_dir: PathBuf,

    // ── Model selection ────────────────────────────────────────
    /// Model that writes components
    #[arg(long, global = true, default_value = DEFAULT_MODEL)]
    model: String,

    /// Model that decides between asking and generating
    #[arg(long, global = true, default_value = DEFAULT_CLASSIFIER_MODEL)]
    classifier_model: String,

    // ── Turn policy ────────────────────────────────────────────
    /// Clarifying questions allowed per session
    #[arg(long, global = true, default_value_t = 2)]
    max_ask_rounds: u32,

    /// Context window of the generation model, in tokens
    #[arg(long, global = true, default_value_t = 128_000)]
    context_window: usize,

    /// Retries for transient API failures
    #[arg(long, global = true, default_value_t = 2)]
    retries: u32,

    // ── Output ─────────────────────────────────────────────────
    /// Print each turn result as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat; each input line is one turn
    Chat(TurnArgs),

    /// Send a single message and print the reply
    Send {
        #[command(flatten)]
        turn: TurnArgs,

        /// Message text
        message: String,
    },

    /// List sessions, most recent first
    Sessions,

    /// Print a session transcript
    Show {
        /// Session id
        id: String,
    },

    /// Delete a session
    Delete {
        /// Session id
        id: String,
    },
}

#[derive(Args)]
struct TurnArgs {
    /// Continue an existing session instead of starting a new one
    #[arg(long)]
    session: Option<String>,

    /// Write generated files into this directory
    #[arg(long)]
    emit: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<(), String> {
    let store = SessionStore::new(&cli.sessions_dir)?;

    match &cli.command {
        Command::Sessions => list_sessions(&store),
        Command::Show { id } => show_session(&store, id),
        Command::Delete { id } => {
            if store.delete(id)? {
                println!("Deleted session {id}");
                Ok(())
            } else {
                Err(format!("Session {id} not found"))
            }
        }
        Command::Send { turn, message } => {
            let (mut record, content) = begin_turn(&store, turn.session.as_deref(), message)?;
            let client = build_client(cli.retries)?;
            let generator = Generator::new(&client, generator_config(&cli))?;
            let result = run_turn(&store, &mut record, &generator, content)
                .await
                .map_err(|e| e.to_string())?;
            show_turn(&record, &result, turn, cli.json)
        }
        Command::Chat(turn) => {
            let client = build_client(cli.retries)?;
            let generator = Generator::new(&client, generator_config(&cli))?;
            let record = open_session(&store, turn.session.as_deref())?;
            chat_loop(&store, record, &generator, turn, cli.json).await
        }
    }
}

fn generator_config(cli: &Cli) -> GeneratorConfig {
    GeneratorConfig::default()
        .with_generation_model(&cli.model)
        .with_classifier_model(&cli.classifier_model)
        .with_max_ask_rounds(cli.max_ask_rounds)
        .with_context_window(cli.context_window)
}

fn build_client(retries: u32) -> Result<OpenRouterClient, String> {
    let api_key = std::env::var("OPENROUTER_KEY")
        .map_err(|_| "OPENROUTER_KEY environment variable is not set".to_string())?;
    let client = OpenRouterClient::with_headers(
        api_key,
        "https://github.com/uiforge/uiforge",
        "uiforge-chat",
    )
    .map_err(|e| format!("failed to create API client: {e}"))?;
    Ok(client.with_retry(RetryConfig::with_retries(retries)))
}

// ── Turns ──────────────────────────────────────────────────────────

fn show_turn(
    record: &SessionRecord,
    result: &GenerationResult,
    turn: &TurnArgs,
    json: bool,
) -> Result<(), String> {
    print_result(record, result, json)?;
    if let Some(dir) = &turn.emit {
        report_emitted(dir, result)?;
    }
    Ok(())
}

async fn chat_loop(
    store: &SessionStore,
    mut record: SessionRecord,
    generator: &Generator<'_>,
    turn: &TurnArgs,
    json: bool,
) -> Result<(), String> {
    println!("Session {} ({}). Type /quit to exit.", record.id, record.title);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout
            .write_all(b"> ")
            .await
            .map_err(|e| format!("Failed to write prompt: {e}"))?;
        stdout
            .flush()
            .await
            .map_err(|e| format!("Failed to flush stdout: {e}"))?;

        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| format!("Failed to read input: {e}"))?
        else {
            break;
        };

        if matches!(line.trim(), "/quit" | "/exit") {
            break;
        }
        let content = match validate_message(&line) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        match run_turn(store, &mut record, generator, content).await {
            Ok(result) => show_turn(&record, &result, turn, json)?,
            Err(TurnError::Generation(_)) => eprintln!("{GENERATION_FAILED}"),
            Err(e @ TurnError::Storage(_)) => return Err(e.to_string()),
        }
    }
    Ok(())
}

// ── Output ─────────────────────────────────────────────────────────

fn print_result(
    record: &SessionRecord,
    result: &GenerationResult,
    json: bool,
) -> Result<(), String> {
    if json {
        let out = serde_json::json!({
            "session_id": record.id,
            "result": result,
        });
        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| format!("Failed to serialize result: {e}"))?;
        println!("{text}");
        return Ok(());
    }

    match result.action {
        TurnAction::Ask => println!("\n? {}\n", result.content),
        TurnAction::Generate => {
            println!("\n{}\n", result.content);
            if !result.artifacts.is_empty() {
                let names: Vec<_> = result.artifacts.iter().map(|a| a.filename.as_str()).collect();
                println!("[{} | ~{} tokens]", names.join(", "), result.token_count);
            }
        }
    }
    Ok(())
}

fn report_emitted(dir: &Path, result: &GenerationResult) -> Result<(), String> {
    for path in emit_artifacts(dir, &result.artifacts)? {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn list_sessions(store: &SessionStore) -> Result<(), String> {
    let records = store.list()?;
    if records.is_empty() {
        println!("No sessions.");
        return Ok(());
    }
    for r in records {
        println!(
            "{}  {}  {:>3} msg  {}",
            r.id,
            r.updated_at.format("%Y-%m-%d %H:%M"),
            r.messages.len(),
            r.title
        );
    }
    Ok(())
}

fn show_session(store: &SessionStore, id: &str) -> Result<(), String> {
    let record = store
        .load(id)?
        .ok_or_else(|| format!("Session {id} not found"))?;

    println!("# {}", record.title);
    println!("created {}", record.created_at.to_rfc3339());
    for message in &record.messages {
        let label = match (message.role, message.action) {
            (TurnRole::User, _) => "user".to_string(),
            (TurnRole::Assistant, Some(action)) => format!("assistant ({action})"),
            (TurnRole::Assistant, None) => "assistant".to_string(),
        };
        println!("\n── {label} ── {}", message.created_at.format("%H:%M:%S"));
        println!("{}", message.content);
    }
    Ok(())
}
