//! lexctl - administrative command line client for a lexicon server
//!
//! Wraps the server's admin surface: lexicon and symbol set management,
//! the IPA reference table, and the asynchronous lexicon import workflow
//! with live progress over the server's notification channel.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use lexctl::{
    AdminApi, ChannelState, ImportJob, ImportOutcome, Lexicon, NotificationChannel, SessionId,
    Symbol,
};
use lexctl_common::config::{self, TomlConfig};

#[derive(Parser)]
#[command(
    name = "lexctl",
    version,
    about = "Administrative client for a lexicon/phonology database server"
)]
struct Cli {
    /// Server base URL (overrides LEXCTL_SERVER and the config file)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a lexicon file and follow the import's progress
    Import {
        /// Name of the lexicon to create
        #[arg(long)]
        lexicon: String,
        /// Symbol set the lexicon's transcriptions use
        #[arg(long)]
        symbolset: String,
        /// Lexicon file to upload
        #[arg(long)]
        file: PathBuf,
        /// Skip server-side validation of the imported entries
        #[arg(long)]
        no_validate: bool,
        /// Keep listening for notifications this many seconds after the
        /// submission outcome arrives (0 = stop immediately)
        #[arg(long, default_value_t = 10)]
        linger: u64,
    },
    /// Open a notification channel and print status pushes
    Listen {
        /// Stop after this many seconds (0 = until the channel closes)
        #[arg(long, default_value_t = 0)]
        duration: u64,
    },
    /// List lexicon references
    Lexicons,
    /// Create or update a lexicon reference
    LexiconSave {
        /// Id of an existing lexicon; 0 creates a new one
        #[arg(long, default_value_t = 0)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbolset: String,
    },
    /// Delete a lexicon reference
    LexiconDelete {
        #[arg(long)]
        id: i64,
    },
    /// List symbol set names available for import
    Symbolsets,
    /// List the symbol set of one lexicon
    Symbols {
        #[arg(long)]
        lexicon_id: i64,
    },
    /// Replace a lexicon's symbol set from a JSON file
    SymbolsSave {
        #[arg(long)]
        file: PathBuf,
    },
    /// Print the server's IPA reference table
    Ipa,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = TomlConfig::load();

    init_tracing(&config);

    info!(
        "lexctl v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let server = config::resolve_server_url(cli.server.as_deref(), &config);
    info!("Server: {}", server);
    let api = AdminApi::new(&server)?;

    match cli.command {
        Command::Import {
            lexicon,
            symbolset,
            file,
            no_validate,
            linger,
        } => run_import(&api, &server, &lexicon, &symbolset, &file, !no_validate, linger).await,
        Command::Listen { duration } => run_listen(&server, duration).await,
        Command::Lexicons => {
            for lex in api.list_lexicons().await? {
                println!("{}\t{}\t{}", lex.id, lex.name, lex.symbol_set_name);
            }
            Ok(())
        }
        Command::LexiconSave {
            id,
            name,
            symbolset,
        } => {
            let lexicon = Lexicon {
                id,
                name,
                symbol_set_name: symbolset,
            };
            let stored = api.insert_or_update_lexicon(&lexicon).await?;
            println!("{}\t{}\t{}", stored.id, stored.name, stored.symbol_set_name);
            Ok(())
        }
        Command::LexiconDelete { id } => {
            api.delete_lexicon(id).await?;
            println!("deleted lexicon {}", id);
            Ok(())
        }
        Command::Symbolsets => {
            for name in api.list_symbol_set_names().await? {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Symbols { lexicon_id } => {
            for symbol in api.list_symbol_set(lexicon_id).await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    symbol.symbol, symbol.category, symbol.ipa, symbol.description
                );
            }
            Ok(())
        }
        Command::SymbolsSave { file } => run_symbols_save(&api, &file).await,
        Command::Ipa => {
            let table = api.fetch_ipa_table().await?;
            for symbol in table.symbols() {
                println!("{}\t{}", symbol.glyph, symbol.description);
            }
            Ok(())
        }
    }
}

fn init_tracing(config: &TomlConfig) {
    let default_filter = config
        .log_level
        .clone()
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}

async fn run_import(
    api: &AdminApi,
    server: &str,
    lexicon: &str,
    symbolset: &str,
    file: &Path,
    validate: bool,
    linger: u64,
) -> Result<()> {
    let job = ImportJob::from_path(lexicon, symbolset, validate, file).await?;

    // Register the notification channel before submitting, so the server
    // can correlate progress pushes with this session from the first
    // message of the job.
    let session = SessionId::generate();
    let ws_url = config::websocket_url(server)?;
    let channel = NotificationChannel::connect(&ws_url, &session).await?;
    println!("session {}", session);

    let mut status = channel.status_watch();
    let printer = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            if let Some(line) = status.borrow_and_update().clone() {
                println!("{}", line);
            }
        }
    });

    let outcome = api.submit_import(&session, &job).await;
    match &outcome {
        ImportOutcome::Accepted { detail } => {
            println!("import completed without errors: {}", detail);
        }
        ImportOutcome::Rejected {
            status: Some(code),
            detail,
        } => {
            println!("import failed ({}): {}", code, detail);
        }
        ImportOutcome::Rejected {
            status: None,
            detail,
        } => {
            println!("import failed: {}", detail);
        }
    }

    // The HTTP outcome and the channel pushes are independent signals;
    // give the channel a window to drain before shutting down.
    if linger > 0 {
        let mut state = channel.state_watch();
        let drain = async {
            while *state.borrow() == ChannelState::Open {
                if state.changed().await.is_err() {
                    break;
                }
            }
        };
        let _ = tokio::time::timeout(Duration::from_secs(linger), drain).await;
    }
    printer.abort();
    channel.close();

    if outcome.is_accepted() {
        Ok(())
    } else {
        anyhow::bail!("import submission rejected")
    }
}

async fn run_listen(server: &str, duration: u64) -> Result<()> {
    let session = SessionId::generate();
    let ws_url = config::websocket_url(server)?;
    let channel = NotificationChannel::connect(&ws_url, &session).await?;
    println!("session {}", session);

    let mut status = channel.status_watch();
    let stream = async {
        while status.changed().await.is_ok() {
            if let Some(line) = status.borrow_and_update().clone() {
                println!("{}", line);
            }
        }
    };
    if duration > 0 {
        let _ = tokio::time::timeout(Duration::from_secs(duration), stream).await;
    } else {
        stream.await;
    }
    Ok(())
}

async fn run_symbols_save(api: &AdminApi, file: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(file).await?;
    let symbols: Vec<Symbol> = serde_json::from_str(&text)?;
    api.save_symbol_set(&symbols).await?;
    println!("saved {} symbols", symbols.len());
    Ok(())
}
