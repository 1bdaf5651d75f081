//! selctl - command line client for Selectel cloud storage
//!
//! Credentials come from `--user`/`--key` or `SELECTEL_USER`/`SELECTEL_KEY`.
//! Every invocation authenticates afresh; nothing is cached on disk.

mod commands;
mod exit_code;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{Context, GlobalArgs};
use exit_code::ExitCode;
use output::{Formatter, OutputConfig};

/// Selectel storage command line client
#[derive(Parser, Debug)]
#[command(name = "selctl", version, about, long_about = None)]
pub struct Cli {
    /// Storage user
    #[arg(short, long, global = true, env = "SELECTEL_USER")]
    user: Option<String>,

    /// Storage key
    #[arg(short, long, global = true, env = "SELECTEL_KEY", hide_env_values = true)]
    key: Option<String>,

    /// Default container
    #[arg(
        id = "default_container",
        short = 'c',
        long = "container",
        global = true,
        env = "SELECTEL_CONTAINER",
        value_name = "CONTAINER"
    )]
    container: Option<String>,

    /// Print JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Disable colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log requests to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print information about the storage, a container or an object
    Info(commands::info::InfoArgs),

    /// List containers or objects
    List(commands::list::ListArgs),

    /// Upload a file to a container
    Upload(commands::upload::UploadArgs),

    /// Download an object from a container
    Download(commands::download::DownloadArgs),

    /// Create a container
    Create(commands::create::CreateArgs),

    /// Remove an object or a container
    Remove(commands::remove::RemoveArgs),

    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,selctl={level},sel_core={level},sel_storage={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(command: Commands, globals: GlobalArgs, output_config: OutputConfig) -> ExitCode {
    if let Commands::Completions(args) = command {
        return commands::completions::execute(args);
    }

    let ctx = match Context::load(globals, &Formatter::new(output_config)) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    match command {
        Commands::Info(args) => commands::info::execute(args, ctx, output_config).await,
        Commands::List(args) => commands::list::execute(args, ctx, output_config).await,
        Commands::Upload(args) => commands::upload::execute(args, ctx, output_config).await,
        Commands::Download(args) => commands::download::execute(args, ctx, output_config).await,
        Commands::Create(args) => commands::create::execute(args, ctx, output_config).await,
        Commands::Remove(args) => commands::remove::execute(args, ctx, output_config).await,
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        quiet: cli.quiet,
    };
    let globals = GlobalArgs {
        user: cli.user,
        key: cli.key,
        container: cli.container,
    };

    run(cli.command, globals, output_config).await.into()
}
