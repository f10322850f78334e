use clap::{Args, Parser, Subcommand};

use renthub::error::AppError;

use crate::demo::{run_demo, run_feed_import, DemoArgs, FeedImportArgs};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "RentHub Core",
    about = "Run and demonstrate the RentHub verification and alerting services from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Import a listings feed export and report the resulting matches
    Feed {
        #[command(subcommand)]
        command: FeedCommand,
    },
    /// Run an end-to-end CLI demo covering verification and saved-search alerts
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum FeedCommand {
    /// Parse a listings CSV export and run it through the match dispatcher
    Import(FeedImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Feed {
            command: FeedCommand::Import(args),
        } => run_feed_import(args),
        Command::Demo(args) => run_demo(args),
    }
}
