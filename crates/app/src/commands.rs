//! CLI commands

use std::sync::Arc;

use clap::Subcommand;
use tracing::info;
use warden_application::{
    ApplicationError, ApplicationResult, NavigationGuard, Router, SessionManager,
};
use warden_domain::{ApiRequest, HttpMethod, RouteTable, format_date};

/// What the user asked for.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in and store the session
    Login {
        /// Account e-mail
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "WARDEN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Also ask the backend whether the access token is still valid
        #[arg(long)]
        verify: bool,
    },

    /// Exchange the refresh token for a new access token
    Refresh,

    /// GET an API path with the session's credentials
    Get {
        /// Path relative to the API root, e.g. `/sites`
        path: String,
    },

    /// Send any API request with the session's credentials
    Request {
        /// HTTP method: GET, POST, PUT, PATCH or DELETE
        method: HttpMethod,

        /// Path relative to the API root
        path: String,

        /// JSON request body
        #[arg(long)]
        body: Option<serde_json::Value>,
    },

    /// Resolve a console route through the navigation guard
    Navigate {
        /// Route path, e.g. `/sites?page=2`
        path: String,
    },

    /// Render a timestamp the way the console displays it
    FormatDate {
        /// ISO 8601 date or timestamp
        value: String,
    },
}

impl Commands {
    /// Runs the command against `manager`.
    pub async fn execute(
        self,
        manager: Arc<SessionManager>,
        routes: Arc<RouteTable>,
    ) -> ApplicationResult<()> {
        match self {
            Self::Login { email, password } => {
                let result = manager.login(&email, &password).await;
                if !result.success {
                    return Err(ApplicationError::Login(result.error.unwrap_or_default()));
                }
                println!("Logged in as {email}");
            }
            Self::Logout => {
                manager.logout().await;
                println!("Logged out");
            }
            Self::Whoami { verify } => whoami(&manager, verify).await,
            Self::Refresh => {
                if !manager.refresh_access_token().await {
                    return Err(ApplicationError::Login(
                        "session expired, log in again".to_string(),
                    ));
                }
                println!("Access token refreshed");
            }
            Self::Get { path } => {
                let body: serde_json::Value = manager.get_json(&path).await?;
                print_json(&body);
            }
            Self::Request { method, path, body } => {
                let mut request = ApiRequest::new(method, path);
                request.body = body;
                let response = manager.send(request).await?;
                match response.json::<serde_json::Value>() {
                    Ok(body) => print_json(&body),
                    Err(_) => println!("{}", response.text()),
                }
            }
            Self::Navigate { path } => {
                let guard = NavigationGuard::new(manager.clone(), routes);
                let landed = Router::new(guard, manager).push(&path).await?;
                info!(requested = %path, landed = %landed, "Navigation settled");
                println!("{landed}");
            }
            Self::FormatDate { value } => println!("{}", format_date(&value)),
        }
        Ok(())
    }
}

fn print_json(body: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string())
    );
}

async fn whoami(manager: &SessionManager, verify: bool) {
    if !manager.is_authenticated() {
        println!("Not logged in");
        return;
    }

    match manager.user() {
        Some(user) => {
            println!("{} <{}> [{}]", user.name, user.email, manager.initials());
            if manager.is_admin() {
                println!("Administrator");
            }
            if !user.groups.is_empty() {
                let groups: Vec<&str> = user.groups.iter().map(String::as_str).collect();
                println!("Groups: {}", groups.join(", "));
            }
        }
        None => println!("Logged in (profile not loaded)"),
    }

    if verify {
        let valid = manager.verify_token().await;
        println!("Access token: {}", if valid { "valid" } else { "expired" });
    }
}
