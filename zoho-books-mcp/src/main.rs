//! MCP Server entry point for Zoho Books
//!
//! Loads settings from the environment (and `.env`), wires the token manager
//! to the file token cache and serves one transport: stdio (default),
//! Streamable HTTP (`--port`) or WebSocket (`--ws`).
//!
//! `--setup-oauth`, `--clear-token-cache` and `--validate-credentials` run a
//! credential maintenance task instead and exit.

mod adapters;
mod config;
mod prompts;
mod resources;
mod schemas;
mod server;
mod transport;

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgGroup, Parser};
use secrecy::ExposeSecret;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use zoho_books_core::services::{ApiClient, ServiceContext, TokenManager};
use zoho_books_core::traits::CredentialStore;
use zoho_books_provider::log_sanitizer::mask_secret;
use zoho_books_provider::{BooksApi, OAuthClient, ReqwestBackend, RetryPolicy};

use adapters::FileCredentialStore;
use config::Settings;
use server::ZohoBooksMcp;
use transport::Transport;

#[derive(Parser, Debug)]
#[command(name = "zoho-books-mcp", version, about = "MCP server for Zoho Books")]
#[command(group(ArgGroup::new("transport").args(["stdio", "port", "ws"])))]
struct Cli {
    /// Serve MCP over stdin/stdout (default)
    #[arg(long)]
    stdio: bool,

    /// Serve MCP Streamable HTTP at /mcp on this port
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,

    /// Serve MCP over WebSocket at /ws
    #[arg(long)]
    ws: bool,

    /// Address the HTTP and WebSocket transports bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port of the WebSocket transport
    #[arg(long, default_value_t = 8765)]
    ws_port: u16,

    /// Do not add permissive CORS headers to the HTTP transport
    #[arg(long)]
    disable_cors: bool,

    /// Log filter, e.g. `debug` or `zoho_books_core=trace` (overrides LOG_LEVEL and RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the consent URL, or exchange --auth-code, and store the credential
    #[arg(long, conflicts_with_all = ["clear_token_cache", "validate_credentials"])]
    setup_oauth: bool,

    /// Authorization code from the consent redirect
    #[arg(long, requires = "setup_oauth")]
    auth_code: Option<String>,

    /// Remove the cached credential of the configured organization
    #[arg(long, conflicts_with = "validate_credentials")]
    clear_token_cache: bool,

    /// Obtain an access token and report its expiry
    #[arg(long)]
    validate_credentials: bool,

    /// Read settings from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,
}

impl Cli {
    fn transport(&self) -> Transport {
        if let Some(port) = self.port {
            Transport::Http {
                addr: SocketAddr::new(self.host, port),
                cors: !self.disable_cors,
            }
        } else if self.ws {
            Transport::WebSocket {
                addr: SocketAddr::new(self.host, self.ws_port),
            }
        } else {
            Transport::Stdio
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Before logging: the env file may set LOG_LEVEL
    let env_file = load_env_file(cli.env_file.as_deref());

    // Initialize tracing to stderr (stdio transport uses stdout for protocol)
    let filter = config::log_directive(cli.log_level.as_deref())
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_ansi(false),
        )
        .with(filter)
        .init();

    match env_file {
        Ok(Some(path)) => tracing::info!("Loaded settings from {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::FAILURE;
        }
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `Ok(None)` when no explicit file was given and `./.env` does not exist.
fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load env file {}", path.display()))?;
            Ok(Some(path.to_path_buf()))
        }
        None => match dotenvy::dotenv() {
            Ok(path) => Ok(Some(path)),
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(e).context("failed to load .env"),
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_env()?;
    settings.validate(false)?;
    let key = settings.credential_key()?;

    let store = Arc::new(FileCredentialStore::new(settings.token_cache_path.clone()));
    tracing::info!("Token cache: {}", store.path().display());

    // Without a configured refresh token a cached credential must exist
    if settings.refresh_token.is_none() && !cli.setup_oauth && !cli.clear_token_cache {
        let cached = store.load(&key).await.unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable token cache: {e}");
            None
        });
        if cached.is_none() {
            settings.validate(true)?;
        }
    }

    let tokens = build_token_manager(&settings, store)?;

    if cli.setup_oauth {
        return setup_oauth(&tokens, &settings, cli.auth_code.as_deref()).await;
    }
    if cli.clear_token_cache {
        tokens.clear().await?;
        println!("Cleared the cached credential for {key}");
        return Ok(());
    }
    if cli.validate_credentials {
        let token = tokens.get_valid_access_token().await?;
        let expires_at = tokens.expires_at().await;
        println!("{}", validation_report(token.as_str(), expires_at, Utc::now()));
        return Ok(());
    }

    let books = BooksApi::new(
        Arc::new(ReqwestBackend::new(settings.request_timeout)?),
        settings.api_base_url.clone(),
        key.organization_id.clone(),
        RetryPolicy::with_max_attempts(settings.max_retries),
    );
    let ctx = Arc::new(ServiceContext::new(ApiClient::new(books, tokens)));
    let server = ZohoBooksMcp::new(&ctx);

    tracing::info!(
        "Zoho Books MCP server initialized for organization {} ({})",
        key.organization_id,
        settings.region
    );
    transport::run(cli.transport(), server).await
}

fn build_token_manager(
    settings: &Settings,
    store: Arc<FileCredentialStore>,
) -> Result<Arc<TokenManager>> {
    let (Some(client_id), Some(client_secret)) =
        (settings.client_id.as_deref(), settings.client_secret.as_ref())
    else {
        anyhow::bail!("ZOHO_CLIENT_ID and ZOHO_CLIENT_SECRET are required");
    };

    let oauth = OAuthClient::new(
        Arc::new(ReqwestBackend::new(settings.request_timeout)?),
        settings.auth_base_url.clone(),
        client_id,
        client_secret.expose_secret().clone(),
        RetryPolicy::with_max_attempts(settings.max_retries),
    );
    Ok(Arc::new(TokenManager::new(
        Arc::new(oauth),
        store,
        settings.credential_key()?,
        settings.refresh_token.clone(),
    )))
}

fn validation_report(
    access_token: &str,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    let token = mask_secret(access_token);
    match expires_at {
        Some(expires_at) => format!(
            "Credentials are valid; access token {token} expires at {expires_at} ({} minutes)",
            (expires_at - now).num_minutes()
        ),
        None => format!("Credentials are valid; access token {token}"),
    }
}

async fn setup_oauth(
    tokens: &TokenManager,
    settings: &Settings,
    auth_code: Option<&str>,
) -> Result<()> {
    let Some(code) = auth_code else {
        let url = tokens.authorization_url(&settings.redirect_uri)?;
        println!("1. Open this URL and approve access to Zoho Books:\n\n   {url}\n");
        println!(
            "2. Copy the `code` parameter from the redirect to {} and run:\n\n   \
             zoho-books-mcp --setup-oauth --auth-code <CODE>",
            settings.redirect_uri
        );
        return Ok(());
    };

    tokens
        .authorize_with_code(code, &settings.redirect_uri)
        .await
        .context("authorization code exchange failed")?;
    println!(
        "Authorization complete. The credential for {} is stored in {}",
        tokens.key(),
        settings.token_cache_path.display()
    );
    Ok(())
}
