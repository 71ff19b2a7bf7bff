//! Command-line interface for the stream configuration service
//!
//! # Usage
//!
//! ## Server Mode
//! ```bash
//! stream-config server --port 9013 --host 0.0.0.0
//! ```
//!
//! ## Lookups
//! ```bash
//! stream-config stream "rtsp://cam.local/live" --playback
//! stream-config device ITB-1101-CP1
//! ```
//!
//! ## Offline signing
//! ```bash
//! stream-config sign --url https://cdn/live.m3u8 --secret s3cr3t \
//!     --query-prefix zbyutoken --duration 1h
//! ```

use clap::{Parser, Subcommand};

use stream_config_service::cli::{
    lookup::{DeviceArgs, SignArgs, StreamArgs, run_device, run_sign, run_stream},
    server::{ServerArgs, run_server_mode},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "stream-config")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server mode
    Server {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Configuration file path
        #[arg(long)]
        config: Option<String>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Resolve a stream's configuration
    Stream {
        /// Stream URL used as the lookup key
        #[arg(value_name = "STREAM_URL")]
        stream_url: String,

        /// Configuration file path
        #[arg(long)]
        config: Option<String>,

        /// Print the (signed) playback URL instead of the configuration
        #[arg(long)]
        playback: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Resolve a device's configuration
    Device {
        /// Device hostname used as the lookup key
        #[arg(value_name = "HOSTNAME")]
        hostname: String,

        /// Configuration file path
        #[arg(long)]
        config: Option<String>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print a token suffix for a stream without contacting any service
    Sign {
        /// Base stream URL
        #[arg(long)]
        url: String,

        /// Signing secret
        #[arg(long)]
        secret: String,

        /// Query parameter prefix
        #[arg(long)]
        query_prefix: String,

        /// Token validity, e.g. "1h" or "90m"
        #[arg(long, default_value = "1h")]
        duration: String,

        /// Unix timestamp to sign at (defaults to now)
        #[arg(long, allow_hyphen_values = true)]
        at: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Server {
            port,
            host,
            config,
            verbose,
        } => {
            let args = ServerArgs {
                port,
                host,
                config,
                verbose,
            };
            run_server_mode(args).await
        }
        Commands::Stream {
            stream_url,
            config,
            playback,
            verbose,
        } => {
            let args = StreamArgs {
                stream_url,
                config,
                playback,
                verbose,
            };
            run_stream(args).await
        }
        Commands::Device {
            hostname,
            config,
            verbose,
        } => {
            let args = DeviceArgs {
                hostname,
                config,
                verbose,
            };
            run_device(args).await
        }
        Commands::Sign {
            url,
            secret,
            query_prefix,
            duration,
            at,
        } => run_sign(SignArgs {
            url,
            secret,
            query_prefix,
            duration,
            at,
        }),
    }
}
