//! quizboard CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::load::LoadArgs;
use commands::query::QueryArgs;

#[derive(Parser)]
#[command(name = "quizboard", version, about = "Quiz response analytics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show score summary, distribution, and per-question stats
    Summary {
        #[command(flatten)]
        load: LoadArgs,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Search, sort, and page through responses
    Query {
        #[command(flatten)]
        load: LoadArgs,

        #[command(flatten)]
        query: QueryArgs,

        /// Page number (1-indexed)
        #[arg(long, default_value = "1")]
        page: usize,

        /// Rows per page (default from config)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Export the filtered, sorted responses as CSV
    Export {
        #[command(flatten)]
        load: LoadArgs,

        #[command(flatten)]
        query: QueryArgs,

        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List detected question groups and their classification
    Groups {
        #[command(flatten)]
        load: LoadArgs,
    },

    /// Show one student's answers
    Student {
        #[command(flatten)]
        load: LoadArgs,

        /// Row index as shown by `query`
        #[arg(long)]
        index: usize,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Create starter config and example data
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizboard=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Summary { load, format } => commands::summary::execute(load, format).await,
        Commands::Query {
            load,
            query,
            page,
            page_size,
        } => commands::query::execute(load, query, page, page_size).await,
        Commands::Export {
            load,
            query,
            output,
        } => commands::export::execute(load, query, output).await,
        Commands::Groups { load } => commands::groups::execute(load).await,
        Commands::Student {
            load,
            index,
            format,
        } => commands::student::execute(load, index, format).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
