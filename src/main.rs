use std::process;

use clap::Parser;

use manwe::cli::{error_message, Cli, Commands};
use manwe::cli::commands::{data_sources, samples, users};
use manwe::logging::init_logging;
use manwe::resources::Filetype;
use manwe::{load_config, Session};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level.as_deref()) {
        eprintln!("error: {e}");
        process::exit(1);
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Manwë");

    if let Err(e) = execute_command(&cli).await {
        tracing::debug!(error = ?e, "Command failed");
        eprintln!("error: {}", error_message(&e, cli.config.as_deref()));
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let session = Session::new(config)?;

    match &cli.command {
        Commands::Samples(command) => command.execute(&session).await,
        Commands::Groups(command) => command.execute(&session).await,
        Commands::Users(command) => command.execute(&session).await,
        Commands::DataSources(command) => command.execute(&session).await,
        Commands::AnnotateVcf(args) => args.execute(&session, Filetype::Vcf).await,
        Commands::AnnotateBed(args) => args.execute(&session, Filetype::Bed).await,
        Commands::ImportSample(args) => args.execute(&session).await,
        Commands::Activate(args) => samples::activate_sample(&session, &args.uri).await,
        Commands::Sample(args) => samples::show_sample(&session, &args.uri).await,
        Commands::AddUser(args) => args.execute(&session).await,
        Commands::User(args) => users::show_user(&session, &args.uri).await,
        Commands::DataSource(args) => data_sources::show_data_source(&session, &args.uri).await,
        Commands::DownloadDataSource(args) => {
            data_sources::download_data_source(&session, &args.uri).await
        }
    }
}
