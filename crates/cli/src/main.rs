//! solr-sync: keep a Solr core in step with a content store.
//!
//! ## Commands
//!
//! - `index` - Reindex eligible content in batches, resumable from a checkpoint
//! - `delete` - Delete documents by id, or everything with `--all`
//! - `select` - Run queries and print matching documents as JSON lines
//! - `debug` - Print the parsed query, score explanations and timings
//! - `info` - Ping the core and print its status
//! - `optimize` - Ask Solr to optimize the core
//!
//! Exit codes: 0 success, 1 some items failed, 2 usage error, 3 fatal.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod command;
mod config;

use command::{
    classify_error, CommandAction, CommandHandler, DebugPayload, DeletePayload, IndexPayload,
    Reporter, SelectPayload, UsageError,
};
use config::ConfigFlags;
use solr_sync_search::MATCH_ALL;

const DEFAULT_ROWS: usize = 10;

#[derive(Parser)]
#[command(name = "solr-sync", author, version, about = "Keep a Solr core in step with a content store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON config file (default: .solr-sync/config.json when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Solr base URL, without the core name
    #[arg(long, global = true, value_name = "URL")]
    solr_url: Option<String>,

    /// Solr core to talk to
    #[arg(long, global = true)]
    core: Option<String>,

    /// JSON-lines file with the content items
    #[arg(long, global = true, value_name = "FILE")]
    source: Option<PathBuf>,

    /// Only print records, warnings and the final summary
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log progress details to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Index eligible content items in batches
    Index(IndexArgs),

    /// Delete documents by id, or all documents
    Delete {
        /// Document ids to delete
        ids: Vec<String>,

        /// Delete every document in the core
        #[arg(long)]
        all: bool,
    },

    /// Run queries and print the matching documents as JSON lines
    Select {
        queries: Vec<String>,

        /// Query every document (`*:*`); still capped by --rows
        #[arg(long)]
        all: bool,

        /// Maximum documents printed per query, including with --all
        #[arg(long, default_value_t = DEFAULT_ROWS)]
        rows: usize,
    },

    /// Explain how queries are parsed and scored
    Debug {
        queries: Vec<String>,

        /// Not supported for debug output
        #[arg(long, hide = true)]
        all: bool,
    },

    /// Ping the core and print its status
    Info,

    /// Optimize the core
    Optimize,
}

#[derive(Args)]
struct IndexArgs {
    /// Batch to start from (zero based); defaults to the saved checkpoint
    #[arg(long)]
    batch: Option<u64>,

    /// Only index items of this post type
    #[arg(long, alias = "post_type")]
    post_type: Option<String>,

    /// Items per batch
    #[arg(long)]
    batch_size: Option<usize>,
}

impl Command {
    /// Checks mode arguments; nothing has been contacted yet.
    fn into_action(self) -> Result<CommandAction, UsageError> {
        match self {
            Command::Index(args) => Ok(CommandAction::Index(IndexPayload {
                batch: args.batch,
                post_type: args.post_type.filter(|t| !t.trim().is_empty()),
            })),
            Command::Delete { ids, all } => match (ids.is_empty(), all) {
                (true, false) => Err(UsageError::new(
                    "delete needs document ids or --all",
                )),
                (false, true) => Err(UsageError::new(
                    "delete takes either document ids or --all, not both",
                )),
                (true, true) => Ok(CommandAction::Delete(DeletePayload::All)),
                (false, false) => Ok(CommandAction::Delete(DeletePayload::Ids(ids))),
            },
            Command::Select { queries, all, rows } => {
                if rows == 0 {
                    return Err(UsageError::new("--rows must be at least 1"));
                }
                let queries = match (queries.is_empty(), all) {
                    (true, false) => {
                        return Err(UsageError::new("select needs at least one query or --all"))
                    }
                    (false, true) => {
                        return Err(UsageError::new(
                            "select takes either queries or --all, not both",
                        ))
                    }
                    (true, true) => vec![MATCH_ALL.to_string()],
                    (false, false) => queries,
                };
                Ok(CommandAction::Select(SelectPayload { queries, rows }))
            }
            Command::Debug { queries, all } => {
                if all {
                    return Err(UsageError::new("debug does not support --all"));
                }
                if queries.is_empty() {
                    return Err(UsageError::new("debug needs at least one query"));
                }
                Ok(CommandAction::Debug(DebugPayload { queries }))
            }
            Command::Info => Ok(CommandAction::Info),
            Command::Optimize => Ok(CommandAction::Optimize),
        }
    }

    fn batch_size(&self) -> Option<usize> {
        match self {
            Command::Index(args) => args.batch_size,
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    let mut reporter = Reporter::stdio(cli.quiet);
    let status = match run(cli, &mut reporter).await {
        Ok(outcome) => {
            reporter.finish(&outcome);
            outcome.status
        }
        Err(err) => {
            reporter.error(&format!("{err:#}"));
            classify_error(&err)
        }
    };
    std::process::exit(status.code());
}

async fn run(cli: Cli, reporter: &mut Reporter) -> Result<command::CommandOutcome> {
    let flags = ConfigFlags {
        config_path: cli.config,
        solr_url: cli.solr_url,
        core: cli.core,
        source: cli.source,
        batch_size: cli.command.batch_size(),
    };
    let action = cli.command.into_action()?;
    let config = config::resolve(&flags, |var| std::env::var(var).ok())?;

    let handler = CommandHandler::new(config)?;
    handler.execute(action, reporter).await
}
