use anyhow::Context;
use clap::{Parser, Subcommand};
use moodline_core::{EntryStore, MoodEntry, MoodlineConfig, Principal};
use moodline_gateway::{AppState, GatewayServer, StaticTokenAuth};
use moodline_notify::Notifier;
use moodline_reasoning::{providers, MoodPipeline, RetryResponse};
use moodline_store::SqliteStore;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "moodline.toml", env = "MOODLINE_CONFIG")]
    config: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP gateway
    Serve,
    /// Analyze a stored entry as if it had just been created
    Analyze {
        #[arg(long)]
        entry: String,
    },
    /// Re-run analysis on behalf of the entry's owner
    Retry {
        #[arg(long)]
        entry: String,
        #[arg(long)]
        user: String,
    },
    /// Store a new entry and print its id
    AddEntry {
        #[arg(long)]
        user: String,
        #[arg(long)]
        text: String,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json(response: &RetryResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.log_json);

    let config = MoodlineConfig::load_or_default(&args.config);

    info!("Opening store at {}...", config.store.db_path);
    let store = Arc::new(SqliteStore::new(&config.store.db_path).await?);

    if let Command::AddEntry { user, text } = &args.command {
        let id = Uuid::new_v4().to_string();
        store.insert_entry(&MoodEntry::new(&id, user, text)).await?;
        println!("{}", id);
        return Ok(());
    }

    // One model client per process, shared by every invocation.
    let llm = providers::from_config(&config.llm)?;
    let pipeline = MoodPipeline::new(llm, store.clone());

    match args.command {
        Command::Serve => {
            let sender = moodline_notify::sender_from_config(&config.push)?;
            let state = AppState {
                pipeline,
                notifier: Notifier::new(store.clone(), sender),
                auth: Arc::new(StaticTokenAuth::from_config(&config.auth)),
            };
            let server = GatewayServer::new(state, &config.gateway.host, config.gateway.port);
            tokio::select! {
                result = server.run() => result?,
                _ = tokio::signal::ctrl_c() => info!("Shutting down"),
            }
        }
        Command::Analyze { entry } => {
            let stored = store
                .get_entry(&entry)
                .await?
                .with_context(|| format!("Mood entry {} not found", entry))?;
            let outcome = pipeline.on_entry_created(&entry, &stored).await?;
            print_json(&outcome.into())?;
        }
        Command::Retry { entry, user } => {
            let response = pipeline
                .retry(Some(&Principal::new(user)), Some(&entry))
                .await?;
            print_json(&response)?;
        }
        Command::AddEntry { .. } => {}
    }

    Ok(())
}
