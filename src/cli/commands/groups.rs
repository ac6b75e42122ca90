//! Group commands

use clap::{Args, Subcommand};

use crate::cli::commands::{fetch_or_user_error, log, UriArgs};
use crate::cli::output;
use crate::resources::{Group, GroupCreateParams};
use crate::session::Session;

/// Group subcommands
#[derive(Subcommand, Debug)]
pub enum GroupsCommand {
    /// List groups
    List,

    /// Show group details
    Show(UriArgs),

    /// Add a sample group
    Add(AddGroupArgs),
}

impl GroupsCommand {
    /// Execute the group subcommand
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        match self {
            Self::List => list_groups(session).await,
            Self::Show(args) => {
                let group = fetch_or_user_error::<Group>(session, &args.uri).await?;
                println!("{}", output::group(&group));
                Ok(())
            }
            Self::Add(args) => args.execute(session).await,
        }
    }
}

async fn list_groups(session: &Session) -> anyhow::Result<()> {
    let mut groups = session.groups();
    let mut first = true;
    while let Some(group) = groups.next().await? {
        if !first {
            println!();
        }
        first = false;
        println!("{}", output::group(&group));
    }
    Ok(())
}

/// Arguments for adding a group
#[derive(Args, Debug)]
pub struct AddGroupArgs {
    /// Group name
    #[arg(value_name = "NAME")]
    pub name: String,
}

impl AddGroupArgs {
    /// Execute the add command
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let group = session
            .create(&GroupCreateParams::new(self.name.clone()))
            .await?;
        log(format!("Added group: {}", group.uri()));
        Ok(())
    }
}
