use clap::{Args, Subcommand};
use std::io::{self, Write};

use super::OutputFormat;
use docshare::config::Config;
use docshare::db::UserRepository;
use docshare::models::{NewUser, User};

#[derive(Args)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Register a new user
    Add {
        /// Login name (must be unique)
        username: String,

        /// Email address (must be unique)
        #[arg(long, short)]
        email: String,

        /// Password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// List all users
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Remove a user, their documents, and every grant involving them
    Remove {
        /// Login name
        username: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl UserCommand {
    pub async fn run(
        &self,
        users: &UserRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            UserSubcommand::Add {
                username,
                email,
                password,
            } => {
                let password = match password {
                    Some(p) => p.clone(),
                    None => prompt("Password: ")?,
                };

                let user =
                    add_user(users, username, email, &password, config.password_cost.value).await?;
                println!("Added user: {}", user);
                Ok(())
            }

            UserSubcommand::List { format } => {
                let all = users.list().await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&all)?);
                    }
                    OutputFormat::Text => {
                        if all.is_empty() {
                            println!("No users registered.");
                            return Ok(());
                        }

                        println!("{:<6}  {:<24}  EMAIL", "ID", "USERNAME");
                        println!("{}", "-".repeat(72));
                        for user in &all {
                            println!("{:<6}  {:<24}  {}", user.id, user.username, user.email);
                        }
                        println!("\nTotal: {} user(s)", all.len());
                    }
                }
                Ok(())
            }

            UserSubcommand::Remove { username, force } => {
                let user = users
                    .get_by_username(username)
                    .await?
                    .ok_or_else(|| format!("User not found: {}", username))?;

                // Confirm deletion unless --force is used
                if !force {
                    let answer = prompt(&format!(
                        "Delete user '{}' and all of their documents? [y/N] ",
                        user.username
                    ))?;
                    if !answer.eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                users.delete(user.id).await?;
                println!("Removed user: {}", user.username);
                Ok(())
            }
        }
    }
}

/// Registers a user after checking that neither the username nor the email
/// is taken.
async fn add_user(
    users: &UserRepository,
    username: &str,
    email: &str,
    password: &str,
    cost: u32,
) -> Result<User, Box<dyn std::error::Error>> {
    if username.trim().is_empty() {
        return Err("Username cannot be empty".into());
    }
    if password.is_empty() {
        return Err("Password cannot be empty".into());
    }
    if users.get_by_username(username).await?.is_some() {
        return Err(format!("User '{}' already exists", username).into());
    }
    if users.get_by_email(email).await?.is_some() {
        return Err(format!("Email '{}' is already registered", email).into());
    }

    let new_user = NewUser::new(username, email, password, cost)?;
    Ok(users.create(&new_user).await?)
}

fn prompt(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
