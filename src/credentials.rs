//! Bearer token sources.
//!
//! The library never runs an OAuth flow or refreshes tokens. These providers
//! hand out whatever token is currently configured; when it has expired the
//! API answers 401 and the fetch fails with [`FetchError::AuthFailure`].

use crate::error::FetchError;
use crate::fetcher::CredentialProvider;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable read by [`EnvToken::default`].
pub const ACCESS_TOKEN_ENV: &str = "SPOTIFY_ACCESS_TOKEN";

/// A fixed token.
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken").finish_non_exhaustive()
    }
}

impl CredentialProvider for StaticToken {
    fn current_access_token(&self) -> Result<String, FetchError> {
        non_empty(self.token.clone(), || "empty access token".to_string())
    }
}

/// A token read from an environment variable on every request.
#[derive(Debug, Clone)]
pub struct EnvToken {
    variable: String,
}

impl EnvToken {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new(ACCESS_TOKEN_ENV)
    }
}

impl CredentialProvider for EnvToken {
    fn current_access_token(&self) -> Result<String, FetchError> {
        let token = std::env::var(&self.variable)
            .map_err(|e| FetchError::AuthFailure(format!("{}: {e}", self.variable)))?;
        non_empty(token, || format!("{} is empty", self.variable))
    }
}

#[derive(Deserialize)]
struct StoredToken {
    access_token: String,
}

/// A token stored as JSON (`{"access_token": "..."}`) in a file.
///
/// The file is re-read on every request, so a token refreshed by another
/// process is picked up without restarting.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialProvider for TokenFile {
    fn current_access_token(&self) -> Result<String, FetchError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            FetchError::AuthFailure(format!("reading {}: {e}", self.path.display()))
        })?;
        let stored: StoredToken = serde_json::from_str(&content).map_err(|e| {
            FetchError::AuthFailure(format!("parsing {}: {e}", self.path.display()))
        })?;
        non_empty(stored.access_token, || {
            format!("no access token in {}", self.path.display())
        })
    }
}

fn non_empty(token: String, missing: impl FnOnce() -> String) -> Result<String, FetchError> {
    if token.trim().is_empty() {
        Err(FetchError::AuthFailure(missing()))
    } else {
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_static_token() {
        assert_eq!(
            StaticToken::new("abc").current_access_token().unwrap(),
            "abc"
        );
        assert!(matches!(
            StaticToken::new("  ").current_access_token(),
            Err(FetchError::AuthFailure(_))
        ));
    }

    #[test]
    fn test_missing_env_token_is_auth_failure() {
        let provider = EnvToken::new("BATON_TEST_TOKEN_THAT_IS_NEVER_SET");
        assert!(matches!(
            provider.current_access_token(),
            Err(FetchError::AuthFailure(_))
        ));
    }

    #[test]
    fn test_token_file_is_reread() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"access_token": "first", "expires_in": 3600}}"#).unwrap();
        let provider = TokenFile::new(file.path());
        assert_eq!(provider.current_access_token().unwrap(), "first");

        std::fs::write(file.path(), r#"{"access_token": "second"}"#).unwrap();
        assert_eq!(provider.current_access_token().unwrap(), "second");
    }

    #[test]
    fn test_token_file_errors() {
        let provider = TokenFile::new("/nonexistent/baton/token.json");
        assert!(matches!(
            provider.current_access_token(),
            Err(FetchError::AuthFailure(_))
        ));

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not json").unwrap();
        assert!(matches!(
            TokenFile::new(file.path()).current_access_token(),
            Err(FetchError::AuthFailure(_))
        ));
    }
}
