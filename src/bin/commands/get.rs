use super::utils::{describe_playlist, matches_playlist};
use baton_library::{
    Aggregation, AggregatorConfig, CancellationState, LibraryAggregator, LibraryStore,
    ProgressSpinner, SimplePlaylist, SpotifyClient,
};
use std::path::PathBuf;

pub struct GetOptions {
    pub output: Option<PathBuf>,
    pub playlists: Vec<String>,
    pub concurrency: usize,
    pub page_size: u32,
    pub show_progress: bool,
}

/// Handle the get command
pub async fn handle_get_command(
    client: &SpotifyClient,
    options: GetOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = match &options.output {
        Some(path) => LibraryStore::new(path),
        None => LibraryStore::default_location()?,
    };

    let cancel = CancellationState::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("⚠️  Interrupted, saving what was downloaded so far");
            trigger.cancel();
        }
    });

    let spinner = if options.show_progress {
        ProgressSpinner::new("Fetching playlists")
    } else {
        ProgressSpinner::hidden()
    };

    let config = AggregatorConfig::new()
        .with_concurrency(options.concurrency)
        .with_page_limits(50, options.page_size);
    let aggregator = LibraryAggregator::new(client)
        .with_config(config)
        .with_cancellation(cancel)
        .with_reporter(&spinner);

    let aggregation = if options.playlists.is_empty() {
        aggregator.run().await?
    } else {
        let chosen = choose_playlists(&aggregator, &options.playlists).await?;
        aggregator.run_playlists(&chosen).await
    };

    store.save(&aggregation.index)?;
    report(&aggregation, &store);
    Ok(())
}

async fn choose_playlists(
    aggregator: &LibraryAggregator<'_, SpotifyClient>,
    queries: &[String],
) -> Result<Vec<SimplePlaylist>, Box<dyn std::error::Error>> {
    let available = aggregator.list_playlists().await?;

    let mut chosen = Vec::new();
    for query in queries {
        match available
            .items()
            .iter()
            .find(|playlist| matches_playlist(playlist, query))
        {
            Some(playlist) => {
                log::debug!("Selected {}", describe_playlist(playlist));
                chosen.push(playlist.clone());
            }
            None => eprintln!("⚠️  No playlist named or identified by '{query}'"),
        }
    }

    if chosen.is_empty() {
        return Err("none of the requested playlists were found".into());
    }
    Ok(chosen)
}

fn report(aggregation: &Aggregation, store: &LibraryStore) {
    println!(
        "✅ Saved {} tracks ({} playlist entries) to {}",
        aggregation.index.len(),
        aggregation.index.membership_count(),
        store.path().display()
    );

    for failure in &aggregation.failures {
        eprintln!(
            "❌ {} ({}): {}",
            failure.playlist_name, failure.playlist_id, failure.error
        );
    }
    if !aggregation.is_complete() {
        eprintln!(
            "⚠️  Library is incomplete: {} playlist(s) failed{}",
            aggregation.failures.len(),
            if aggregation.cancelled {
                ", download was cancelled"
            } else {
                ""
            }
        );
    }
}
