use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{connect, connect_signed_in, resolve_password};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::services::{Registered, Registration};
use crate::session::SessionStatus;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the admin API")]
    Login {
        #[arg(help = "Admin email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Forget the saved session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show the signed-in admin as reported by the server")]
    Whoami,

    #[command(about = "Register a new admin account")]
    Register {
        #[arg(help = "Admin email")]
        email: String,
        #[arg(help = "Display name")]
        name: String,
        #[arg(long, help = "Registration key issued by an existing admin")]
        key: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let client = connect().await?;
            let password = resolve_password(password)?;
            let session = client.auth.login(&email, &password).await?;

            output_success(
                &output_format,
                &format!("Logged in as {}", session.identity.display_name()),
                Some(json!({ "admin": session.identity })),
            )
        }
        AuthCommands::Logout => {
            let client = connect().await?;
            client.auth.logout();
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let client = connect().await?;
            let status = client.session().status();
            let identity = client.session().identity();

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "logged_in": status == SessionStatus::LoggedIn,
                        "admin": identity,
                        "server": client.config().base_url(),
                    }))?);
                }
                OutputFormat::Text => match identity {
                    Some(admin) => {
                        println!("Logged in as {} <{}>", admin.display_name(), admin.email);
                        println!("Server: {}", client.config().base_url());
                    }
                    None => println!("Not logged in"),
                },
            }
            Ok(())
        }
        AuthCommands::Whoami => {
            let client = connect_signed_in().await?;
            let admin = client.auth.profile().await?;

            match output_format {
                OutputFormat::Json => output_json("admin", &admin),
                OutputFormat::Text => {
                    println!("ID:    {}", admin.id);
                    println!("Email: {}", admin.email);
                    println!("Name:  {}", admin.display_name());
                    Ok(())
                }
            }
        }
        AuthCommands::Register { email, name, key, password } => {
            let client = connect().await?;
            let password = resolve_password(password)?;
            let registration = Registration {
                email,
                password,
                name,
                registration_key: key,
            };

            match client.auth.register(&registration).await? {
                Registered::SignedIn(session) => output_success(
                    &output_format,
                    &format!("Registered and logged in as {}", session.identity.display_name()),
                    Some(json!({ "admin": session.identity })),
                ),
                Registered::Accepted { admin } => output_success(
                    &output_format,
                    "Account created. Log in with 'optima auth login' to continue",
                    Some(json!({ "admin": admin, "degraded": true })),
                ),
            }
        }
    }
}
