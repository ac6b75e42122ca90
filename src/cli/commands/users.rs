//! User commands

use clap::{Args, Subcommand};
use regex::Regex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::cli::commands::{fetch_or_user_error, log, UriArgs};
use crate::cli::{output, UserError};
use crate::resources::{User, UserCreateParams};
use crate::session::Session;

const LOGIN_PATTERN: &str = "[a-zA-Z][a-zA-Z0-9._-]*";

/// User subcommands
#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List users
    List,

    /// Show user details
    Show(UriArgs),

    /// Add new API user (queries for password)
    Add(AddUserArgs),
}

impl UsersCommand {
    /// Execute the user subcommand
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        match self {
            Self::List => list_users(session).await,
            Self::Show(args) => show_user(session, &args.uri).await,
            Self::Add(args) => args.execute(session).await,
        }
    }
}

async fn list_users(session: &Session) -> anyhow::Result<()> {
    let mut users = session.users();
    let mut first = true;
    while let Some(user) = users.next().await? {
        if !first {
            println!();
        }
        first = false;
        println!("{}", output::user(&user));
    }
    Ok(())
}

/// Shows a user.
pub async fn show_user(session: &Session, uri: &str) -> anyhow::Result<()> {
    let user = fetch_or_user_error::<User>(session, uri).await?;
    println!("{}", output::user(&user));
    Ok(())
}

/// Arguments for adding a user
#[derive(Args, Debug)]
pub struct AddUserArgs {
    /// User login
    #[arg(value_name = "LOGIN")]
    pub login: String,

    /// Human readable name (default: login)
    #[arg(short, long)]
    pub name: Option<String>,

    /// User can do anything
    #[arg(long)]
    pub admin: bool,

    /// User can import samples
    #[arg(long)]
    pub importer: bool,

    /// User can annotate variants
    #[arg(long)]
    pub annotator: bool,

    /// User can annotate variants if they are in an active sample
    #[arg(long)]
    pub trader: bool,

    /// User can use any query expression when annotating
    #[arg(long)]
    pub querier: bool,

    /// User can use group query expressions when annotating
    #[arg(long)]
    pub group_querier: bool,
}

impl AddUserArgs {
    /// Returns the roles selected by the flags.
    #[must_use]
    pub fn roles(&self) -> Vec<String> {
        [
            ("admin", self.admin),
            ("importer", self.importer),
            ("annotator", self.annotator),
            ("trader", self.trader),
            ("querier", self.querier),
            ("group-querier", self.group_querier),
        ]
        .into_iter()
        .filter(|(_, selected)| *selected)
        .map(|(role, _)| role.to_string())
        .collect()
    }

    /// Execute the add command
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        validate_login(&self.login)?;

        let stdin = BufReader::new(tokio::io::stdin());
        let password = read_new_password(stdin).await?;

        let params = UserCreateParams {
            name: self.name.clone(),
            roles: self.roles(),
            ..UserCreateParams::new(self.login.clone(), password)
        };
        let user = session.create(&params).await?;

        log(format!("Added user: {}", user.uri()));
        Ok(())
    }
}

fn validate_login(login: &str) -> anyhow::Result<()> {
    let pattern = Regex::new(&format!("^{LOGIN_PATTERN}$"))?;
    if pattern.is_match(login) {
        Ok(())
    } else {
        Err(UserError::new(format!("User login must match \"{LOGIN_PATTERN}\"")).into())
    }
}

/// Prompts twice for a password on standard error and reads both answers
/// from `input`.
async fn read_new_password<R>(input: R) -> anyhow::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    prompt("Please provide a password for the new user: ").await?;
    let password = lines.next_line().await?.unwrap_or_default();
    prompt("Repeat: ").await?;
    let repeated = lines.next_line().await?.unwrap_or_default();

    if password == repeated {
        Ok(password)
    } else {
        Err(UserError::new("Passwords did not match").into())
    }
}

async fn prompt(message: &str) -> std::io::Result<()> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(message.as_bytes()).await?;
    stderr.flush().await
}
