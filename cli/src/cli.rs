use clap::{Parser, Subcommand};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(about = "View, add and delete todos kept on a remote store")]
pub struct Args {
    /// Base URL of the todo store
    #[arg(long, env = "TODO_API_URL", default_value = "http://127.0.0.1:3000")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "TODO_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show all todos
    List,
    /// Add a todo
    Add {
        text: String,
        /// One of General, Work, Personal, Shopping, Health (or any label)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Delete a todo by id
    Delete { id: String },
}
