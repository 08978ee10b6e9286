use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use secrecy::SecretString;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tokio::sync::mpsc;

use newsfeed::app::{build_http_client, App, AppEvent};
use newsfeed::auth::{AuthClient, AuthError, Requirement};
use newsfeed::config::Config;
use newsfeed::cycle::FeedCycle;
use newsfeed::feed::Category;
use newsfeed::session::CredentialStore;
use newsfeed::translate::Language;

/// Get the config directory path (~/.config/newsfeed/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("newsfeed"))
}

#[derive(Parser, Debug)]
#[command(name = "newsfeed", about = "Terminal news dashboard with headline translation")]
struct Args {
    /// Config file (default: ~/.config/newsfeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Category to open with, e.g. "Technology"
    #[arg(long)]
    category: Option<String>,

    /// Language code to translate headlines into, e.g. "fr"
    #[arg(long)]
    language: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session
    Login {
        username: String,
        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },
    /// Create an account
    Signup {
        username: String,
        email: String,
        #[arg(long)]
        password_stdin: bool,
    },
    /// Forget the stored session
    Logout,
}

/// Read a password without echoing it.
fn prompt_password(prompt: &str) -> Result<SecretString> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{}", prompt)?;
    stderr.flush()?;

    enable_raw_mode()?;
    let result = read_hidden_line();
    disable_raw_mode()?;
    writeln!(stderr)?;
    result
}

fn read_hidden_line() -> Result<SecretString> {
    let mut buf = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(SecretString::from(buf)),
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                anyhow::bail!("Cancelled");
            }
            KeyCode::Char(c) => buf.push(c),
            KeyCode::Esc => anyhow::bail!("Cancelled"),
            _ => {}
        }
    }
}

fn read_password(from_stdin: bool, prompt: &str) -> Result<SecretString> {
    if !from_stdin {
        return prompt_password(prompt);
    }
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(SecretString::from(
        line.trim_end_matches(['\r', '\n']).to_string(),
    ))
}

async fn run_command(
    command: Command,
    config: &Config,
    client: reqwest::Client,
    store: &CredentialStore,
) -> Result<()> {
    let auth = AuthClient::new(client, &config.auth_base_url);
    match command {
        Command::Login {
            username,
            password_stdin,
        } => {
            let password = read_password(password_stdin, "Password: ")?;
            match auth.login(&username, &password).await {
                Ok(credential) => {
                    store
                        .save(&credential)
                        .context("Failed to store session")?;
                    println!("Signed in as {}", credential.username);
                }
                Err(AuthError::InvalidCredentials) => {
                    eprintln!("Invalid credentials. Please try again.");
                    std::process::exit(1);
                }
                Err(e) => return Err(e).context("Login failed"),
            }
        }
        Command::Signup {
            username,
            email,
            password_stdin,
        } => {
            let password = read_password(password_stdin, "Password: ")?;
            match auth.signup(&username, &email, &password).await {
                Ok(()) => println!("Account created. Run `newsfeed login {}` to sign in.", username),
                Err(AuthError::WeakPassword(missing)) => {
                    eprintln!("Password must contain:");
                    for requirement in Requirement::ALL {
                        let mark = if missing.contains(&requirement) { "x" } else { "ok" };
                        eprintln!("  [{}] {}", mark, requirement.describe());
                    }
                    std::process::exit(1);
                }
                Err(e) => return Err(e).context("Signup failed"),
            }
        }
        Command::Logout => {
            store.clear().context("Failed to remove stored session")?;
            println!("Signed out.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never land inside the TUI frame buffer
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    // User-only access: the directory holds the session token
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if let Some(category) = args.category {
        if Category::from_str_name(&category).is_none() {
            anyhow::bail!(
                "Unknown category '{}'. Choose one of: {}",
                category,
                Category::ALL.map(|c| c.name()).join(", ")
            );
        }
        config.default_category = category;
    }
    if let Some(language) = args.language {
        if Language::from_code(&language).is_none() {
            anyhow::bail!(
                "Unsupported language '{}'. Choose one of: {}",
                language,
                Language::ALL.map(|l| l.code()).join(", ")
            );
        }
        config.default_language = language;
    }

    let client = build_http_client().context("Failed to build HTTP client")?;
    let store = CredentialStore::new(config_dir.join("session.toml"));

    if let Some(command) = args.command {
        return run_command(command, &config, client, &store).await;
    }

    let cycle = FeedCycle::from_config(&config, client);
    let mut app = App::new(&config, cycle, store);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    newsfeed::ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
