//! `server` command: serve lookups and playback URLs over HTTP.

use crate::{
    cli::{build_env_filter, load_settings},
    server::app,
    utils::version,
};
use anyhow::Result;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Arguments for server mode
#[derive(Debug)]
pub struct ServerArgs {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub config: Option<String>,
    pub verbose: bool,
}

/// Run server mode with the given arguments
pub async fn run_server_mode(args: ServerArgs) -> Result<()> {
    // Settings come before logging so `logging.level` can apply. Flags beat
    // the environment, which beats the file, which beats the defaults.
    let mut settings = load_settings(args.config.as_deref()).unwrap_or_else(|e| {
        // No subscriber yet
        eprintln!(
            "Warning: Failed to load configuration: {}. Using defaults.",
            e
        );
        crate::Settings::default()
    });

    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    settings.logging.verbose = args.verbose;

    if tracing_subscriber::registry()
        .with(build_env_filter(args.verbose, &settings.logging.level))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_err()
    {
        eprintln!("Warning: a tracing subscriber is already installed");
    }

    tracing::info!(
        "Starting stream configuration server v{}",
        version::get_detailed_version()
    );

    let resolver = app::build_resolver(&settings)?;
    if resolver.is_none() {
        tracing::warn!("Running without a configuration database; playback URLs will not be signed");
    }

    let app = app::create_app(settings.clone(), resolver);

    let addr = parse_and_bind_address(&settings.server.host, settings.server.port).await?;

    tracing::info!(
        "Stream configuration server v{} listening on {}",
        version::get_version(),
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Resolve the listen address for `host:port`
///
/// Only literal IP addresses are accepted. The IPv6 wildcard is probed first
/// and replaced with `0.0.0.0` when the machine cannot listen on it.
pub async fn parse_and_bind_address(host: &str, port: u16) -> Result<SocketAddr> {
    let Ok(ip) = host.parse::<IpAddr>() else {
        anyhow::bail!(
            "Invalid host address: {}. Use an IP address such as '0.0.0.0' or '::'",
            host
        );
    };

    let addr = SocketAddr::new(ip, port);
    if ip != IpAddr::V6(Ipv6Addr::UNSPECIFIED) {
        tracing::debug!("Listen address {}", addr);
        return Ok(addr);
    }

    match tokio::net::TcpListener::bind(addr).await {
        Ok(probe) => {
            drop(probe);
            Ok(addr)
        }
        Err(e) => {
            tracing::warn!("IPv6 wildcard unavailable on port {} ({}), using 0.0.0.0", port, e);
            Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port))
        }
    }
}
