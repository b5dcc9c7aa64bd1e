use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "taskpal")]
#[command(about = "Personal task assistant: chat loop and MCP server over a local task database")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat loop (the default when no subcommand is given)
    Chat,

    /// Serve the task store tools over stdio for MCP clients
    Mcp,
}
