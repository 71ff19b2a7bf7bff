//! One-shot lookup and signing commands
//!
//! `stream` and `device` go through the same caching resolver as the
//! server, so they populate (and fall back to) the same cache file. `sign`
//! is offline and needs no configuration at all.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    Settings,
    cli::{build_env_filter, load_settings},
    playback::PlaybackUrlBuilder,
    server::build_resolver,
    source::ConfigSource,
    token::sign_stream,
    types::{Stream, StreamConfigResponse},
};
use std::sync::Arc;

/// Arguments for the `stream` command
#[derive(Debug)]
pub struct StreamArgs {
    pub stream_url: String,
    pub config: Option<String>,
    pub playback: bool,
    pub verbose: bool,
}

/// Arguments for the `device` command
#[derive(Debug)]
pub struct DeviceArgs {
    pub hostname: String,
    pub config: Option<String>,
    pub verbose: bool,
}

/// Arguments for the `sign` command
#[derive(Debug)]
pub struct SignArgs {
    pub url: String,
    pub secret: String,
    pub query_prefix: String,
    pub duration: String,
    /// Unix timestamp to sign at; defaults to now
    pub at: Option<i64>,
}

fn init_stderr_logging(verbose: bool, settings: &Settings) {
    // One-shot commands stay quiet unless asked otherwise.
    let level = if settings.logging.level == "info" {
        "error"
    } else {
        settings.logging.level.as_str()
    };

    let _ = tracing_subscriber::registry()
        .with(build_env_filter(verbose, level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn resolver_from(settings: &Settings) -> Result<Arc<dyn ConfigSource>> {
    build_resolver(settings)?.context(
        "no configuration database configured; set DB_ADDRESS or couch.address",
    )
}

/// Resolve a stream and print its configuration, or its playback URL
pub async fn run_stream(args: StreamArgs) -> Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    init_stderr_logging(args.verbose, &settings);

    let resolver = resolver_from(&settings)?;

    let output = if args.playback {
        let playback = PlaybackUrlBuilder::with_source(resolver)
            .build(&args.stream_url, Utc::now())
            .await?;
        serde_json::to_string_pretty(&playback)?
    } else {
        let stream = resolver.get_stream_config(&args.stream_url).await?;
        serde_json::to_string_pretty(&StreamConfigResponse::from(&stream))?
    };

    println!("{}", output);
    Ok(())
}

/// Resolve a device and print its attributes
pub async fn run_device(args: DeviceArgs) -> Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    init_stderr_logging(args.verbose, &settings);

    let resolver = resolver_from(&settings)?;
    let device = resolver.get_device_config(&args.hostname).await?;

    println!("{}", serde_json::to_string_pretty(&device)?);
    Ok(())
}

/// Print the token suffix for the given stream parameters
pub fn run_sign(args: SignArgs) -> Result<()> {
    println!("{}", sign_args(&args)?);
    Ok(())
}

fn sign_args(args: &SignArgs) -> Result<String> {
    let now = match args.at {
        Some(at) => DateTime::<Utc>::from_timestamp(at, 0)
            .with_context(|| format!("timestamp {} is out of range", at))?,
        None => Utc::now(),
    };

    let stream = Stream::new(&args.url, &args.secret, &args.query_prefix, &args.duration);
    Ok(sign_stream(&stream, now)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_args_for(duration: &str, at: Option<i64>) -> SignArgs {
        SignArgs {
            url: "https://example/a".to_string(),
            secret: "sec".to_string(),
            query_prefix: "tok".to_string(),
            duration: duration.to_string(),
            at,
        }
    }

    #[test]
    fn test_sign_at_fixed_time() {
        let token = sign_args(&sign_args_for("1h", Some(1672531200))).unwrap();
        assert_eq!(
            token,
            "?tokstarttime=1672531200&tokendtime=1672534800\
             &tokhash=QIYkBCXDirlJWazYPT1_BUVOPPPQm4hRGTP00pE0jrU="
        );
    }

    #[test]
    fn test_sign_now() {
        let token = sign_args(&sign_args_for("30m", None)).unwrap();
        assert!(token.starts_with("?tokstarttime="));
        assert!(token.contains("&tokhash="));
    }

    #[test]
    fn test_sign_invalid_duration() {
        let err = sign_args(&sign_args_for("soon", Some(0))).unwrap_err();
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_resolver_requires_address() {
        let Err(err) = resolver_from(&Settings::default()) else {
            panic!("expected an error without DB_ADDRESS");
        };
        assert!(err.to_string().contains("DB_ADDRESS"));
    }
}
