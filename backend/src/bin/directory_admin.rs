//! Inspect and soft-delete directory users from the command line.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use directory_backend::DirectorySettings;
use directory_backend::domain::ports::{DeleteUsersRequest, ListUsersRequest, UserDirectory};
use directory_backend::domain::{UserDirectoryService, UserId, UserSortColumn};
use directory_backend::outbound::persistence::{
    DbPool, DieselGroupMembershipRepository, DieselUserDeleter, DieselUserRepository,
};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use pagination::SortDirection;
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `directory-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "directory-admin",
    about = "Query and soft-delete users in the identity directory",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DIRECTORY_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Print one user.
    Get {
        /// Identifier of the user.
        user_id: String,
        /// Include the user's groups.
        #[arg(long)]
        with_groups: bool,
    },
    /// Print a page of users and the total match count.
    List(ListArgs),
    /// Soft-delete users and drop their group bindings.
    Delete {
        /// Identifiers of the users to delete.
        #[arg(required = true)]
        user_ids: Vec<String>,
    },
}

#[derive(Debug, Clone, Args)]
struct ListArgs {
    /// Restrict to members of these groups.
    #[arg(long = "group-id", value_name = "id")]
    group_ids: Vec<String>,
    /// Restrict to these user ids.
    #[arg(long = "user-id", value_name = "id")]
    user_ids: Vec<String>,
    /// Restrict to these usernames.
    #[arg(long = "username", value_name = "name")]
    usernames: Vec<String>,
    /// Restrict to these emails.
    #[arg(long = "email", value_name = "address")]
    emails: Vec<String>,
    /// Restrict to these phone numbers.
    #[arg(long = "phone-number", value_name = "number")]
    phone_numbers: Vec<String>,
    /// Restrict to these statuses, e.g. `active` or `deleted`.
    #[arg(long = "status", value_name = "status")]
    statuses: Vec<String>,
    /// Case-insensitive substring of username, email or phone number.
    #[arg(long = "search", value_name = "word")]
    search_word: Option<String>,
    /// `create_time`, `update_time`, `status_time` or `username`.
    #[arg(long = "sort-key", value_name = "column")]
    sort_key: Option<String>,
    /// `false` sorts ascending; descending otherwise.
    #[arg(long, value_name = "bool")]
    reverse: Option<bool>,
    /// Page size.
    #[arg(long)]
    limit: Option<i64>,
    /// Rows to skip.
    #[arg(long)]
    offset: Option<i64>,
    /// Include each user's groups.
    #[arg(long)]
    with_groups: bool,
}

impl ListArgs {
    fn into_request(self) -> ListUsersRequest {
        let sort_key = self.sort_key.as_deref().and_then(|key| {
            let column = UserSortColumn::from_key(key);
            if column.is_none() {
                warn!(sort_key = key, "unknown sort key, using creation time");
            }
            column
        });

        ListUsersRequest {
            group_ids: self.group_ids,
            user_ids: self.user_ids,
            usernames: self.usernames,
            emails: self.emails,
            phone_numbers: self.phone_numbers,
            statuses: self.statuses,
            search_word: self.search_word,
            sort_key,
            sort_direction: Some(SortDirection::from_reverse(self.reverse)),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;

    let mut settings = DirectorySettings::load_from_iter([OsString::from("directory-admin")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    if args.database_url.is_some() {
        settings.database_url = args.database_url;
    }
    let pool_config = settings.pool_config().map_err(io::Error::other)?;
    let limits = settings.pagination_limits().map_err(io::Error::other)?;

    let pool = DbPool::new(pool_config)
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let directory = UserDirectoryService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselGroupMembershipRepository::new(pool.clone())),
        Arc::new(DieselUserDeleter::new(pool)),
        Arc::new(DefaultClock),
    )
    .with_limits(limits);

    run(&directory, args.command).await
}

async fn run(directory: &impl UserDirectory, command: Command) -> io::Result<()> {
    match command {
        Command::Get {
            user_id,
            with_groups,
        } => {
            let user_id = UserId::new(user_id.trim())
                .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
            if with_groups {
                let user = directory
                    .get_user_with_group(&user_id)
                    .await
                    .map_err(io::Error::other)?;
                print_json(&user)
            } else {
                let user = directory
                    .get_user(&user_id)
                    .await
                    .map_err(io::Error::other)?;
                print_json(&user)
            }
        }
        Command::List(list) => {
            let with_groups = list.with_groups;
            let request = list.into_request();
            if with_groups {
                let page = directory
                    .list_users_with_group(request)
                    .await
                    .map_err(io::Error::other)?;
                print_json(&page)
            } else {
                let page = directory
                    .list_users(request)
                    .await
                    .map_err(io::Error::other)?;
                print_json(&page)
            }
        }
        Command::Delete { user_ids } => {
            let response = directory
                .delete_users(DeleteUsersRequest { user_ids })
                .await
                .map_err(io::Error::other)?;
            print_json(&response)
        }
    }
}

fn print_json(value: &impl Serialize) -> io::Result<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    println!("{rendered}");
    Ok(())
}
