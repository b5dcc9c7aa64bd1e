use clap::Parser;
use std::process;
use taskpal::agent::{Agent, AgentConfig};
use taskpal::chat;
use taskpal::cli::{Cli, Commands};
use taskpal::mcp::run_mcp_server;
use taskpal::store::TaskStore;

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = TaskStore::new(db_path());

    let result = match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(store),
        Commands::Mcp => run_mcp(store),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn db_path() -> String {
    std::env::var("TASKPAL_DB").unwrap_or_else(|_| "tasks.db".to_string())
}

fn run_chat(store: TaskStore) -> anyhow::Result<()> {
    store.initialize()?;

    let config = AgentConfig::from_env()?;
    let mut agent = Agent::new(config);
    chat::run_chat(&store, &mut agent)
}

fn run_mcp(store: TaskStore) -> anyhow::Result<()> {
    store.initialize()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime
        .block_on(run_mcp_server(store))
        .map_err(|e| anyhow::anyhow!(e.to_string()))
}
