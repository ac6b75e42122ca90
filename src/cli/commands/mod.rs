//! CLI command implementations
//!
//! Commands are grouped per resource kind. Results are printed to standard
//! output; progress messages go to standard error.

pub mod annotate;
pub mod data_sources;
pub mod groups;
pub mod samples;
pub mod users;

use clap::{ArgAction, Args};

use crate::cli::UserError;
use crate::resources::{Queries, Resource, ResourceError, TrackedResource};
use crate::session::Session;

/// A single resource URI argument
#[derive(Args, Debug)]
pub struct UriArgs {
    /// URI of the resource
    #[arg(value_name = "URI")]
    pub uri: String,
}

/// Annotation queries given as `-q NAME EXPRESSION`
#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    /// Annotation query (more than one can be given)
    #[arg(
        short = 'q',
        long = "query",
        num_args = 2,
        value_names = ["NAME", "EXPRESSION"],
        action = ArgAction::Append
    )]
    pub query: Vec<String>,
}

impl QueryArgs {
    /// Returns the queries by name. A later query with the same name
    /// replaces an earlier one.
    #[must_use]
    pub fn queries(&self) -> Queries {
        self.query
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect()
    }
}

/// Prints a progress message to standard error.
///
/// This is command output meant for the user, not a diagnostic, so it is
/// printed regardless of the log level.
pub(crate) fn log(message: impl std::fmt::Display) {
    eprintln!("{message}");
}

/// Fetches a resource, reporting a missing one as a [`UserError`].
pub(crate) async fn fetch_or_user_error<T: Resource>(
    session: &Session,
    uri: &str,
) -> anyhow::Result<TrackedResource<T>> {
    match session.fetch::<T>(uri).await {
        Ok(resource) => Ok(resource),
        Err(ResourceError::NotFound { .. }) => {
            Err(UserError::new(format!("{} does not exist: \"{uri}\"", T::NAME)).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Rewrites a missing-resource error into a [`UserError`] naming `what`.
pub(crate) fn not_found_as_user_error(error: anyhow::Error, what: &str, uri: &str) -> anyhow::Error {
    let missing = error
        .downcast_ref::<ResourceError>()
        .or_else(|| match error.downcast_ref::<crate::import::ImportError>() {
            Some(crate::import::ImportError::Resource(e)) => Some(e),
            _ => None,
        })
        .is_some_and(ResourceError::is_not_found);

    if missing {
        UserError::new(format!("{what} does not exist: \"{uri}\"")).into()
    } else {
        error
    }
}
