use super::utils::describe_playlist;
use baton_library::{AsyncPaginatedIterator, PageQuery, Pager, SimplePlaylist, SpotifyClient};

/// Handle the playlists command
pub async fn handle_playlists_command(
    client: &SpotifyClient,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pager = Pager::<_, SimplePlaylist>::new(client, PageQuery::my_playlists(50));
    let mut count = 0;

    while let Some(playlist) = pager.next().await? {
        count += 1;
        println!("{count:>4}. {}", describe_playlist(&playlist));

        if limit > 0 && count >= limit {
            break;
        }
    }

    match pager.total_items() {
        Some(total) => println!("\n{count} of {total} playlists shown"),
        None => println!("No playlists found"),
    }
    Ok(())
}
