//! Tableside CLI - a terminal client for the Tableside restaurant platform.
//!
//! Thin front-end over `tableside-core`: every command constructs the
//! session manager, runs startup revalidation, then dispatches. Session
//! state persists across invocations through the file-backed credential
//! store, so `login` in one invocation carries over to `me` in the next.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tableside_core::{
    ApiClient, ApiError, Config, FileStore, ProfileUpdate, RegisterRequest, SessionManager,
    SessionState,
};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    println!("Usage: tableside <command>");
    println!();
    println!("Commands:");
    println!("  status    Show whether a session is active (default)");
    println!("  register  Create a new account");
    println!("  login     Sign in and persist the session");
    println!("  me        Print the current profile");
    println!("  update    Update the current profile");
    println!("  logout    Clear the persisted session");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("status");

    if matches!(command, "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }

    let mut config = Config::load()?;
    let api = ApiClient::new(&config.api_base_url, config.request_timeout())?;
    let store = FileStore::new(config.cache_dir()?)?;
    let manager = SessionManager::new(Arc::new(api), Arc::new(store));

    info!(command, "tableside starting");
    manager.initialize().await;

    let outcome = match command {
        "status" => cmd_status(&manager),
        "register" => cmd_register(&manager).await,
        "login" => cmd_login(&manager, &mut config, args.get(2).cloned()).await,
        "me" => cmd_me(&manager),
        "update" => cmd_update(&manager).await,
        "logout" => {
            manager.logout();
            println!("Signed out.");
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(err) = outcome {
        eprintln!("Error: {}", err);
        let retryable = err
            .downcast_ref::<ApiError>()
            .map(ApiError::is_retryable)
            .unwrap_or(false);
        if retryable {
            eprintln!("The server may be down or unreachable; try again shortly.");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_status(manager: &SessionManager) -> Result<()> {
    match manager.current() {
        SessionState::Authenticated { user, .. } => {
            println!("Signed in as {} <{}>", user.display_name(), user.email);
        }
        _ => println!("Not signed in."),
    }
    Ok(())
}

async fn cmd_register(manager: &SessionManager) -> Result<()> {
    let full_name = prompt("Full name")?;
    let email = prompt("Email")?;
    let phone = prompt_optional("Phone (optional)")?;
    let password = rpassword::prompt_password("Password: ")?;

    let input = RegisterRequest {
        email,
        full_name,
        phone,
        password,
    };
    let user = manager.register(&input).await?;

    println!(
        "Account created for {} <{}>. Sign in with `tableside login`.",
        user.display_name(),
        user.email
    );
    Ok(())
}

async fn cmd_login(
    manager: &SessionManager,
    config: &mut Config,
    email_arg: Option<String>,
) -> Result<()> {
    let email = match email_arg {
        Some(email) => email,
        None => {
            let suggestion = config.last_email.clone();
            let label = match &suggestion {
                Some(last) => format!("Email [{}]", last),
                None => "Email".to_string(),
            };
            let entered = prompt(&label)?;
            if entered.is_empty() {
                suggestion.unwrap_or_default()
            } else {
                entered
            }
        }
    };
    if email.is_empty() {
        anyhow::bail!("an email address is required");
    }

    let password = rpassword::prompt_password("Password: ")?;
    let user = manager.login(&email, &password).await?;

    config.last_email = Some(email);
    if let Err(err) = config.save() {
        warn!(error = %err, "failed to save config");
    }

    println!("Signed in as {} <{}>", user.display_name(), user.email);
    Ok(())
}

fn cmd_me(manager: &SessionManager) -> Result<()> {
    match manager.current_user() {
        Some(user) => {
            println!("{}", serde_json::to_string_pretty(&user)?);
            Ok(())
        }
        None => anyhow::bail!("Not signed in. Run `tableside login` first."),
    }
}

async fn cmd_update(manager: &SessionManager) -> Result<()> {
    let current = match manager.current_user() {
        Some(user) => user,
        None => anyhow::bail!("Not signed in. Run `tableside login` first."),
    };

    println!("Press Enter to keep the current value.");
    let full_name = prompt_optional(&format!("Full name [{}]", current.full_name))?;
    let phone = prompt_optional(&format!(
        "Phone [{}]",
        current.phone.as_deref().unwrap_or("-")
    ))?;
    let password = {
        let entered = rpassword::prompt_password("New password (blank to keep): ")?;
        if entered.is_empty() {
            None
        } else {
            Some(entered)
        }
    };

    if full_name.is_none() && phone.is_none() && password.is_none() {
        println!("Nothing to update.");
        return Ok(());
    }

    let update = ProfileUpdate {
        full_name,
        phone,
        password,
    };
    let user = manager.update_profile(&update).await?;

    println!("Profile updated for {} <{}>", user.display_name(), user.email);
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_optional(label: &str) -> Result<Option<String>> {
    let value = prompt(label)?;
    Ok(if value.is_empty() { None } else { Some(value) })
}
