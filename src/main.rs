use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use watchparty::config::{ClientConfig, ConfigError, normalize_base_url};
use watchparty::session::SessionError;
use watchparty::verify::VerifyError;
use watchparty::{FileSessionStore, HttpTokenVerifier, NavigationGuard, NavigationOutcome, Navigator, RouteTable, SessionStore};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("session store error: {0}")]
    Session(#[from] SessionError),
    #[error("verifier setup failed: {0}")]
    Verify(#[from] VerifyError),
    #[error("navigation to {0} was superseded")]
    Superseded(String),
}

#[derive(Parser, Debug)]
#[command(name = "watchparty", about = "Watch party client session and navigation tool")]
struct Cli {
    /// Backend base URL; overrides WATCHPARTY_API_URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Session file path; overrides WATCHPARTY_SESSION_FILE.
    #[arg(long)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a signed-in session.
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        username: String,
    },
    /// Clear the stored session.
    Logout,
    /// Show the stored session.
    Session,
    /// List the route table.
    Routes,
    /// Run a navigation through the guard and print the page that would render.
    Navigate {
        path: String,
        /// Page currently on screen.
        #[arg(long)]
        from: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config.api_base_url = normalize_base_url(url)?;
    }
    if let Some(path) = cli.session_file {
        config.session_path = path;
    }

    let store = Arc::new(FileSessionStore::open(&config.session_path)?);

    match cli.command {
        Command::Login { token, username } => {
            store.write(&token, &username)?;
            println!("signed in as {username}");
            Ok(())
        }
        Command::Logout => {
            store.clear()?;
            println!("signed out");
            Ok(())
        }
        Command::Session => {
            let session = store.read();
            match (session.token(), session.username()) {
                (Some(token), Some(username)) => println!("{username} ({})", mask_token(token)),
                _ => println!("signed out"),
            }
            Ok(())
        }
        Command::Routes => {
            for route in RouteTable::watch_party().iter() {
                println!("{route}");
            }
            Ok(())
        }
        Command::Navigate { path, from } => run_navigate(&config, store, &path, from.as_deref()).await,
    }
}

async fn run_navigate(
    config: &ClientConfig,
    store: Arc<FileSessionStore>,
    path: &str,
    from: Option<&str>,
) -> Result<(), CliError> {
    let verifier = Arc::new(HttpTokenVerifier::from_config(config)?);
    let guard = NavigationGuard::new(RouteTable::watch_party(), store, verifier)
        .with_verify_timeout(config.timeouts.request());
    let mut navigator = Navigator::new(guard);
    if let Some(from) = from {
        navigator = navigator.starting_at(from);
    }

    match navigator.navigate(path).await {
        NavigationOutcome::Rendered { path: rendered, steps } => {
            for step in &steps {
                println!("{:<18} {:?}", step.path, step.resolution);
            }
            println!("render {rendered}");
            Ok(())
        }
        NavigationOutcome::Superseded => Err(CliError::Superseded(path.to_owned())),
    }
}

fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    format!("{visible}***")
}
