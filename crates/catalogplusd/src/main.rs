//! catalogplusd - CatalogPlus Gateway Daemon
//!
//! HTTP front door of the library catalog: classifies callers, validates
//! requests and forwards them to the configured discovery provider.
//!
//! Usage:
//!   catalogplusd [OPTIONS] [config.toml]
//!
//! Options:
//!   --port <port>  Override the port from the config file
//!
//! If no config file is provided, defaults are used and no provider is
//! registered (every catalog request answers 503).

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use catalogplus_api::{create_router, AppState, GatewayConfig, LogMailer};
use catalogplus_core::{Mailer, ProviderRegistry};
use catalogplus_proxy::{HttpDiscoveryService, ProxyConfig};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parsed command-line arguments
struct Args {
    /// Server config file (TOML)
    config_path: Option<String>,
    /// Port override
    port: Option<u16>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut result = Args {
        config_path: None,
        port: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                match args.get(i + 1).map(|p| p.parse::<u16>()) {
                    Some(Ok(port)) => result.port = Some(port),
                    Some(Err(_)) => tracing::error!("Invalid port: {}", args[i + 1]),
                    None => tracing::error!("Missing argument for --port"),
                }
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                // Positional argument = config file
                result.config_path = Some(arg.to_string());
                i += 1;
            }
            _ => {
                tracing::warn!("Unknown argument: {}", args[i]);
                i += 1;
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"catalogplusd - CatalogPlus Gateway Daemon

Usage: catalogplusd [OPTIONS] [config.toml]

Options:
  -p, --port <port>  Override the port from the config file
  -h, --help         Print this help message

Examples:
  # Run with defaults (no provider, port 8080)
  catalogplusd

  # Run with config file
  catalogplusd config.toml

  # Run on another port
  catalogplusd -p 9090 config.toml
"#
    );
}

/// Complete daemon configuration file
#[derive(Debug, Default, Deserialize)]
struct DaemonConfig {
    #[serde(flatten)]
    gateway: GatewayConfig,
    #[serde(default)]
    provider: Option<ProviderConfig>,
    #[serde(default)]
    mailer: Option<MailerConfig>,
}

/// `[provider]` section
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ProviderConfig {
    /// Forward to a remote search front end
    Proxy(ProxyConfig),
}

/// `[mailer]` section
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum MailerConfig {
    /// Write alerts to the log
    Log,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "catalogplusd=info,catalogplus_api=info,catalogplus_proxy=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting catalogplusd (CatalogPlus Gateway Daemon)");

    let args = parse_args();

    let mut config = if let Some(ref path) = args.config_path {
        tracing::info!("Loading config from: {}", path);
        load_config_file(path)?
    } else {
        tracing::info!("No config file provided, using defaults");
        DaemonConfig::default()
    };
    if let Some(port) = args.port {
        config.gateway.service.port = port;
    }

    let mut registry = ProviderRegistry::new();
    match &config.provider {
        Some(ProviderConfig::Proxy(proxy)) => {
            tracing::info!("Forwarding to upstream {}", proxy.url);
            let provider = Arc::new(
                HttpDiscoveryService::new(proxy).context("Failed to create proxy provider")?,
            );
            registry.register_discovery(provider.clone());
            registry.register_classification(provider);
        }
        None => tracing::warn!("No provider configured, catalog requests will answer 503"),
    }
    let providers = registry.build()?;

    let mailer: Arc<dyn Mailer> = match config.mailer {
        Some(MailerConfig::Log) | None => Arc::new(LogMailer),
    };

    let port = config.gateway.service.port;
    let state = AppState::new(config.gateway, providers, Some(mailer))?;

    // Create the router
    let app = create_router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    // Run the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}

fn load_config_file(path: &str) -> anyhow::Result<DaemonConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    parse_config(&content).with_context(|| format!("Invalid config file {}", path))
}

fn parse_config(content: &str) -> anyhow::Result<DaemonConfig> {
    Ok(toml::from_str(content)?)
}
