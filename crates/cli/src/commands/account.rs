//! Account commands.

use std::io::{self, BufRead, Write};

use clap::Subcommand;
use secrecy::SecretString;

use mirrorcraft_core::Email;
use mirrorcraft_storefront::Storefront;
use mirrorcraft_storefront::models::{Preferences, ProfileUpdate, RegisterRequest};

use super::{CliError, Output};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Log in with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the session on this device
    Logout,
    /// Create an account (does not log in)
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Show the signed-in user
    Whoami {
        /// Refresh from the server first
        #[arg(short, long)]
        refresh: bool,
    },
    /// Update profile fields
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Date of birth, e.g. 1990-04-12
        #[arg(long)]
        date_of_birth: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        /// Receive the newsletter
        #[arg(long)]
        newsletter: Option<bool>,
        /// Receive SMS updates
        #[arg(long)]
        sms_updates: Option<bool>,
    },
}

/// Read a password from stdin when it was not given as an argument.
fn password_or_prompt(password: Option<String>) -> Result<String, CliError> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| CliError::Usage(format!("could not read password: {e}")))?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(CliError::Usage("password cannot be empty".to_string()));
    }
    Ok(password)
}

pub async fn run(storefront: &Storefront, out: &Output, action: AccountAction) -> Result<(), CliError> {
    let auth = storefront.auth();

    match action {
        AccountAction::Login { email, password } => {
            let password = password_or_prompt(password)?;
            auth.login(&email, &password).await?;
            let name = auth
                .profile()
                .map(|p| p.display_name())
                .unwrap_or(email);
            out.status(&format!("Logged in as {name}"));

            let report = storefront.start().await;
            if let Some(count) = report.wishlist_entries {
                tracing::info!(count, "Wishlist synced after login");
            }
        }
        AccountAction::Logout => {
            auth.logout();
            out.status("Logged out");
        }
        AccountAction::Register {
            first_name,
            last_name,
            email,
            phone,
            password,
        } => {
            let email = Email::parse(&email).map_err(|e| CliError::Usage(e.to_string()))?;
            let password = password_or_prompt(password)?;
            let request = RegisterRequest {
                first_name,
                last_name,
                email,
                phone,
                password: SecretString::from(password),
            };
            auth.register(&request).await?;
            out.status("Account created; log in to continue");
        }
        AccountAction::Whoami { refresh } => {
            if !auth.is_logged_in() {
                return Err(CliError::Usage("Not logged in".to_string()));
            }
            let profile = if refresh {
                Some(auth.fetch_profile().await?)
            } else {
                match auth.profile() {
                    Some(profile) => Some(profile),
                    None => Some(auth.fetch_profile().await?),
                }
            };
            out.emit(&profile, || {
                profile.as_ref().map_or_else(String::new, |p| {
                    format!(
                        "{} <{}> ({})",
                        p.display_name(),
                        p.email.as_deref().unwrap_or("-"),
                        p.role
                    )
                })
            });
        }
        AccountAction::Update {
            first_name,
            last_name,
            phone,
            date_of_birth,
            gender,
            newsletter,
            sms_updates,
        } => {
            let preferences = if newsletter.is_some() || sms_updates.is_some() {
                let current = auth.profile().map(|p| p.preferences).unwrap_or_default();
                Some(Preferences {
                    newsletter: newsletter.unwrap_or(current.newsletter),
                    sms_updates: sms_updates.unwrap_or(current.sms_updates),
                })
            } else {
                None
            };
            let update = ProfileUpdate {
                first_name,
                last_name,
                phone,
                date_of_birth,
                gender,
                preferences,
            };
            if update.is_empty() {
                return Err(CliError::Usage("nothing to update".to_string()));
            }
            let profile = auth.update_profile(&update).await?;
            out.emit(&profile, || format!("Profile updated for {}", profile.display_name()));
        }
    }
    Ok(())
}
