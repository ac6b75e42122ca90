//! Command line interface.
//!
//! This module provides the `manwe` command line, parsed with clap. Each
//! subcommand's arguments implement an `execute` method that runs the
//! command against a [`Session`](crate::Session).

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::user_config_path;
use crate::import::ImportError;
use crate::resources::{RemoteErrorKind, ResourceError};

use commands::annotate::AnnotateFileArgs;
use commands::data_sources::DataSourcesCommand;
use commands::groups::GroupsCommand;
use commands::samples::{ImportSampleArgs, SamplesCommand};
use commands::users::{AddUserArgs, UsersCommand};
use commands::UriArgs;

/// Manwë, a client for the Varda database service
#[derive(Parser, Debug)]
#[command(name = "manwe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file to use instead of looking in default
    /// locations
    #[arg(short, long, value_name = "FILE", env = "MANWE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MANWE_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage samples
    #[command(subcommand)]
    Samples(SamplesCommand),

    /// Manage groups
    #[command(subcommand)]
    Groups(GroupsCommand),

    /// Manage users
    #[command(subcommand)]
    Users(UsersCommand),

    /// Manage data sources
    #[command(subcommand)]
    DataSources(DataSourcesCommand),

    /// Annotate VCF file
    AnnotateVcf(AnnotateFileArgs),

    /// Annotate BED file
    AnnotateBed(AnnotateFileArgs),

    /// Add sample and import data (same as `samples import`)
    ImportSample(ImportSampleArgs),

    /// Activate sample (same as `samples activate`)
    Activate(UriArgs),

    /// Show sample details (same as `samples show`)
    Sample(UriArgs),

    /// Add new API user (same as `users add`)
    AddUser(AddUserArgs),

    /// Show user details (same as `users show`)
    User(UriArgs),

    /// Show data source details (same as `data-sources show`)
    DataSource(UriArgs),

    /// Download data source (same as `data-sources download`)
    DownloadDataSource(UriArgs),
}

/// An error caused by how the command was invoked, reported as is.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UserError(pub String);

impl UserError {
    /// Creates a user error.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Renders a command failure for the user.
///
/// Authentication and permission failures get a hint; other errors are
/// shown as is. `config_path` is the configuration file given on the
/// command line, if any.
#[must_use]
pub fn error_message(error: &anyhow::Error, config_path: Option<&Path>) -> String {
    if let Some(user_error) = error.downcast_ref::<UserError>() {
        return user_error.to_string();
    }

    let resource_error = error
        .downcast_ref::<ResourceError>()
        .or_else(|| match error.downcast_ref::<ImportError>() {
            Some(ImportError::Resource(e)) => Some(e),
            _ => None,
        });

    match resource_error.and_then(ResourceError::kind) {
        Some(RemoteErrorKind::Unauthorized) => {
            let path = config_path
                .map(Path::to_path_buf)
                .or_else(user_config_path)
                .map(|path| path.display().to_string())
                .unwrap_or_default();
            format!(
                "Authentication is needed, please make sure you have the correct \
                 authentication token defined in \"{path}\""
            )
        }
        Some(RemoteErrorKind::Forbidden) => "Sorry, you do not have permission".to_string(),
        _ => error.to_string(),
    }
}
