use baton_library::{CredentialProvider, SimplePlaylist, StaticToken, TokenFile};
use std::path::PathBuf;

/// Pick the token source from the command line (or its env fallbacks).
///
/// An explicit token wins over a token file.
pub fn credential_provider(
    token: Option<String>,
    token_file: Option<PathBuf>,
) -> Result<Box<dyn CredentialProvider>, Box<dyn std::error::Error>> {
    match (token, token_file) {
        (Some(token), _) if !token.trim().is_empty() => Ok(Box::new(StaticToken::new(token))),
        (_, Some(path)) => {
            if !path.exists() {
                return Err(format!("token file {} does not exist", path.display()).into());
            }
            Ok(Box::new(TokenFile::new(path)))
        }
        _ => Err("no Spotify access token configured".into()),
    }
}

/// Whether `query` names this playlist, by id or exact name.
pub fn matches_playlist(playlist: &SimplePlaylist, query: &str) -> bool {
    playlist.id == query || playlist.name == query
}

/// One line description of a playlist for terminal output.
pub fn describe_playlist(playlist: &SimplePlaylist) -> String {
    format!(
        "{} by {} ({} tracks) [{}]",
        playlist.name,
        playlist.owner.label(),
        playlist.tracks.total,
        playlist.id
    )
}
