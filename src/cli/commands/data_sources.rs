//! Data source commands

use clap::{Args, Subcommand};

use crate::cli::commands::{fetch_or_user_error, log, QueryArgs, UriArgs};
use crate::cli::output;
use crate::resources::{AnnotationCreateParams, DataSource, DataSourceListParams, Link, User};
use crate::session::Session;

/// Data source subcommands
#[derive(Subcommand, Debug)]
pub enum DataSourcesCommand {
    /// List data sources
    List(ListDataSourcesArgs),

    /// Show data source details
    Show(UriArgs),

    /// Download data source and write data to standard output
    Download(UriArgs),

    /// Annotate data source with variant frequencies
    Annotate(AnnotateDataSourceArgs),
}

impl DataSourcesCommand {
    /// Execute the data source subcommand
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        match self {
            Self::List(args) => args.execute(session).await,
            Self::Show(args) => show_data_source(session, &args.uri).await,
            Self::Download(args) => download_data_source(session, &args.uri).await,
            Self::Annotate(args) => args.execute(session).await,
        }
    }
}

/// Arguments for listing data sources
#[derive(Args, Debug)]
pub struct ListDataSourcesArgs {
    /// Filter data sources by user
    #[arg(short, long, value_name = "URI")]
    pub user: Option<String>,
}

impl ListDataSourcesArgs {
    /// Execute the list command
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let params = DataSourceListParams {
            user: self.user.as_deref().map(Link::from),
        };

        let mut data_sources = session.data_sources(&params);
        let mut first = true;
        while let Some(data_source) = data_sources.next().await? {
            if !first {
                println!();
            }
            first = false;
            println!("{}", output::data_source(&data_source));
        }
        Ok(())
    }
}

/// Shows a data source with its owner.
pub async fn show_data_source(session: &Session, uri: &str) -> anyhow::Result<()> {
    let data_source = fetch_or_user_error::<DataSource>(session, uri).await?;
    println!("{}", output::data_source(&data_source));

    let user = match &data_source.user {
        Some(link) => Some(session.fetch::<User>(link.uri()).await?),
        None => None,
    };
    println!();
    println!("{}", output::data_source_user(user.as_ref()));
    Ok(())
}

/// Writes the data of a data source to standard output.
pub async fn download_data_source(session: &Session, uri: &str) -> anyhow::Result<()> {
    let mut data_source = fetch_or_user_error::<DataSource>(session, uri).await?;
    let written = session
        .download_data_source(&mut data_source, tokio::io::stdout())
        .await?;
    tracing::debug!(uri = %uri, bytes = written, "Wrote data source to standard output");
    Ok(())
}

/// Arguments for annotating a data source
#[derive(Args, Debug)]
pub struct AnnotateDataSourceArgs {
    /// Data source URI
    #[arg(value_name = "URI")]
    pub uri: String,

    #[command(flatten)]
    pub queries: QueryArgs,
}

impl AnnotateDataSourceArgs {
    /// Execute the annotate command
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let data_source = fetch_or_user_error::<DataSource>(session, &self.uri).await?;
        let annotation = session
            .create(&AnnotationCreateParams::new(
                Link::new(data_source.uri()),
                self.queries.queries(),
            ))
            .await?;

        log(format!("Started annotation: {}", annotation.uri()));
        Ok(())
    }
}
