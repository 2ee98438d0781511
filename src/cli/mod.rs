//! Command-line interface: run the server, bootstrap config, and manage
//! users and venues without going through the web API.

use clap::{Parser, Subcommand};

use crate::auth::AuthService;
use crate::config::Config;
use crate::db::Store;

/// Birdie - badminton club scheduling hub
#[derive(Parser)]
#[command(name = "birdie")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server (default)
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage venues
    Location {
        #[command(subcommand)]
        command: LocationCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a new user
    Add {
        username: String,
        /// Plaintext password, hashed before storage
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: Option<String>,
    },

    /// List all users
    #[command(alias = "ls")]
    List,

    /// Deactivate a user; they keep their record but can no longer log in
    Deactivate { username: String },

    /// Reactivate a previously deactivated user
    Activate { username: String },
}

#[derive(Subcommand)]
pub enum LocationCommands {
    /// Add a venue
    Add {
        name: String,
        #[arg(long)]
        address: Option<String>,
    },

    /// List active venues
    #[command(alias = "ls")]
    List,
}

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml");
    } else {
        println!("config.toml already exists");
    }
    Ok(())
}

pub async fn cmd_user(config: &Config, command: UserCommands) -> anyhow::Result<()> {
    let store = Store::connect(&config.general).await?;

    match command {
        UserCommands::Add {
            username,
            password,
            email,
        } => {
            let auth = AuthService::new(store.clone(), config.auth.fallback_credential());
            let user = auth
                .create_user(&username, &password, email.as_deref())
                .await?;
            println!("Created user '{}' (id {})", user.username, user.id);
        }

        UserCommands::List => {
            let users = store.list_users().await?;
            if users.is_empty() {
                println!("No users");
                return Ok(());
            }
            for user in users {
                let status = if user.is_active { "active" } else { "inactive" };
                let email = user.email.as_deref().unwrap_or("-");
                println!("{:>4}  {:<20} {:<10} {}", user.id, user.username, status, email);
            }
        }

        UserCommands::Deactivate { username } => {
            if store.set_user_active(&username, false).await? {
                println!("Deactivated '{username}'");
            } else {
                println!("No such user: {username}");
            }
        }

        UserCommands::Activate { username } => {
            if store.set_user_active(&username, true).await? {
                println!("Activated '{username}'");
            } else {
                println!("No such user: {username}");
            }
        }
    }

    Ok(())
}

pub async fn cmd_location(config: &Config, command: LocationCommands) -> anyhow::Result<()> {
    let store = Store::connect(&config.general).await?;

    match command {
        LocationCommands::Add { name, address } => {
            let location = store.create_location(&name, address.as_deref()).await?;
            println!("Created location '{}' (id {})", location.name, location.id);
        }

        LocationCommands::List => {
            let locations = store.list_active_locations().await?;
            if locations.is_empty() {
                println!("No locations. Add one with: birdie location add <name>");
                return Ok(());
            }
            for location in locations {
                let address = location.address.as_deref().unwrap_or("-");
                println!("{:>4}  {:<30} {}", location.id, location.name, address);
            }
        }
    }

    Ok(())
}
