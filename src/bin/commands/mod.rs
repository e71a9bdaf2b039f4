pub mod get;
pub mod play;
pub mod playlists;
pub mod utils;

use baton_library::SpotifyClient;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Download playlists and build the track index
    ///
    /// Walks every playlist (or only the ones named with --playlist), folds
    /// their tracks into one index keyed by track, and saves it as JSON.
    /// Playlists that fail to download are reported and skipped. Ctrl-C stops
    /// the download and saves what was collected so far.
    ///
    /// Usage examples:
    /// # Download the whole library to the default location
    /// baton get
    ///
    /// # Download two playlists into a custom file
    /// baton get --playlist "Road Trip" --playlist 37i9dQZF1DXcBWIGoYBM5M --output library.json
    ///
    /// # Walk several playlists at once
    /// baton get --concurrency 4
    Get {
        /// Where to save the index (defaults to the XDG data directory)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Only download these playlists (id or exact name, repeatable)
        #[arg(long = "playlist", short = 'p')]
        playlists: Vec<String>,

        /// Number of playlists downloaded at the same time
        #[arg(long, default_value = "1")]
        concurrency: usize,

        /// Tracks requested per page (1-100)
        #[arg(long, default_value = "100")]
        page_size: u32,

        /// Don't show the progress spinner
        #[arg(long)]
        no_progress: bool,
    },

    /// List your playlists
    ///
    /// Usage examples:
    /// # List every playlist
    /// baton playlists
    ///
    /// # List the first 10
    /// baton playlists --limit 10
    Playlists {
        /// Maximum number of playlists to show (0 for no limit)
        #[arg(long, default_value = "0")]
        limit: usize,
    },

    /// Start playing one of your playlists
    ///
    /// Usage examples:
    /// # Play on the active device
    /// baton play "Road Trip"
    ///
    /// # Play on a specific device
    /// baton play 37i9dQZF1DXcBWIGoYBM5M --device 74ASZWbe4lXaubB36ztrGX
    Play {
        /// Playlist id or exact name
        playlist: String,

        /// Device to play on (defaults to the active device)
        #[arg(long)]
        device: Option<String>,
    },
}

pub async fn execute_command(
    command: Commands,
    client: &SpotifyClient,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Get {
            output,
            playlists,
            concurrency,
            page_size,
            no_progress,
        } => {
            let options = get::GetOptions {
                output,
                playlists,
                concurrency,
                page_size,
                show_progress: !no_progress,
            };
            get::handle_get_command(client, options).await
        }

        Commands::Playlists { limit } => playlists::handle_playlists_command(client, limit).await,

        Commands::Play { playlist, device } => {
            play::handle_play_command(client, &playlist, device.as_deref()).await
        }
    }
}
