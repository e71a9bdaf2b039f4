use super::utils::matches_playlist;
use baton_library::{PlaybackControl, PlaylistSelection, SpotifyClient};

/// Handle the play command
///
/// Loads playlists page by page until one matches, then starts it.
pub async fn handle_play_command(
    client: &SpotifyClient,
    query: &str,
    device: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut selection = PlaylistSelection::new(client, 50);

    let index = loop {
        if let Some(index) = selection
            .playlists()
            .iter()
            .position(|playlist| matches_playlist(playlist, query))
        {
            break index;
        }
        if !selection.has_more() || selection.load_next_page().await? == 0 {
            return Err(format!("no playlist named or identified by '{query}'").into());
        }
    };

    let status = match device {
        Some(device) => {
            let request = selection.playback_request(index)?.on_device(device);
            client.start_playback(&request).await?;
            format!("Now playing {} on device {device}", request.context_uri)
        }
        None => selection.play(index, client).await?,
    };
    println!("▶️  {status}");
    Ok(())
}
