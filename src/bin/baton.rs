mod commands;

use baton_library::{ClientConfig, SpotifyClient};
use clap::Parser;
use commands::{execute_command, utils::credential_provider, Commands};
use std::path::PathBuf;

/// Spotify playlist library downloader
#[derive(Parser)]
#[command(
    name = "baton",
    about = "Download your Spotify playlists into a local track index",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    /// Spotify access token
    #[arg(long, global = true, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// JSON file holding {"access_token": ...}, re-read before every request
    #[arg(long, global = true, env = "BATON_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let credentials = match credential_provider(args.token, args.token_file) {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            eprintln!();
            eprintln!("Provide a token in one of these ways:");
            eprintln!("  SPOTIFY_ACCESS_TOKEN=your_access_token");
            eprintln!("  BATON_TOKEN_FILE=/path/to/token.json");
            eprintln!("  --token or --token-file on the command line");
            std::process::exit(1);
        }
    };

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };
    log::debug!("Using API at {}", config.base_url);

    let http_client = http_client::native::NativeClient::new();
    let client = SpotifyClient::with_config(Box::new(http_client), credentials, config);

    if let Err(e) = execute_command(args.command, &client).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
