//! Warden - Main Entry Point
//!
//! Wires the session manager to the HTTP transport and the session file,
//! then runs one command.

mod commands;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use commands::Commands;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use warden_application::{SessionEvent, SessionManager};
use warden_infrastructure::{FileKeyValueStore, ReqwestTransport, default_store_path, load_config};

#[derive(Debug, Parser)]
#[command(name = "warden")]
#[command(about = "Session-aware client for the console API")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./warden.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Session file
    #[arg(short, long, global = true, env = "WARDEN_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let store_path = cli.store.unwrap_or_else(default_store_path);
    info!(base_url = %config.base_url, store = %store_path.display(), "Starting Warden");

    let transport = Arc::new(ReqwestTransport::new(&config)?);
    let store = Arc::new(FileKeyValueStore::new(store_path));
    let manager = Arc::new(SessionManager::restore(transport, store, config).await);

    let mut events = manager.subscribe();
    let routes = Arc::new(routes::default_routes());
    let outcome = cli.command.execute(manager, routes).await;

    for from in login_prompts(&mut events) {
        warn!(%from, "Session ended, run `warden login` to continue");
    }
    outcome?;
    Ok(())
}

/// Drains the events buffered during the command and returns the routes
/// that asked for a login.
fn login_prompts(events: &mut broadcast::Receiver<SessionEvent>) -> Vec<String> {
    let mut prompts = Vec::new();
    loop {
        match events.try_recv() {
            Ok(SessionEvent::LoginRequired { from }) => prompts.push(from),
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => return prompts,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use warden_domain::HttpMethod;

    #[test]
    fn test_parse_login() {
        let cli = Cli::try_parse_from([
            "warden",
            "login",
            "--email",
            "kim@example.com",
            "--password",
            "pw",
        ])
        .unwrap();

        match cli.command {
            Commands::Login { email, password } => {
                assert_eq!(email, "kim@example.com");
                assert_eq!(password, "pw");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "warden",
            "navigate",
            "/sites",
            "--store",
            "/tmp/session.json",
        ])
        .unwrap();

        assert_eq!(cli.store, Some(PathBuf::from("/tmp/session.json")));
        assert!(matches!(cli.command, Commands::Navigate { path } if path == "/sites"));
    }

    #[test]
    fn test_parse_request_method() {
        let cli = Cli::try_parse_from([
            "warden",
            "request",
            "patch",
            "/sites/4",
            "--body",
            r#"{"name":"north"}"#,
        ])
        .unwrap();

        match cli.command {
            Commands::Request { method, path, body } => {
                assert_eq!(method, HttpMethod::Patch);
                assert_eq!(path, "/sites/4");
                assert_eq!(body, Some(serde_json::json!({"name": "north"})));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_request_method_is_rejected() {
        let result = Cli::try_parse_from(["warden", "request", "TRACE", "/sites"]);

        let message = result.unwrap_err().to_string();
        assert!(message.contains("unsupported HTTP method: TRACE"), "{message}");
    }

    #[test]
    fn test_login_prompts_drains_buffered_events() {
        let (tx, mut events) = broadcast::channel(8);
        tx.send(SessionEvent::LoggedOut).unwrap();
        tx.send(SessionEvent::LoginRequired {
            from: "/sites".to_string(),
        })
        .unwrap();
        tx.send(SessionEvent::TokenRefreshed).unwrap();

        assert_eq!(login_prompts(&mut events), vec!["/sites".to_string()]);
        assert_eq!(login_prompts(&mut events), Vec::<String>::new());
    }

    #[test]
    fn test_login_prompts_after_sender_dropped() {
        let (tx, mut events) = broadcast::channel(8);
        tx.send(SessionEvent::LoginRequired {
            from: "/users".to_string(),
        })
        .unwrap();
        drop(tx);

        assert_eq!(login_prompts(&mut events), vec!["/users".to_string()]);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
