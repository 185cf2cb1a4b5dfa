use crate::config::AppConfig;
use crate::error::DashboardError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bearer token for the Alva API.
#[derive(Clone)]
pub struct Credentials {
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("token", &"<redacted>").finish()
    }
}

#[derive(Deserialize)]
struct CredentialFile {
    token: Option<String>,
}

/// Env value first, then the first credential file carrying a non-empty `token`.
pub fn discover_credentials(env_token: Option<String>, paths: &[PathBuf]) -> Result<Credentials, DashboardError> {
    if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
        return Ok(Credentials { token });
    }

    for path in paths {
        let Ok(raw) = fs::read_to_string(path) else {
            continue;
        };
        match serde_json::from_str::<CredentialFile>(&raw) {
            Ok(CredentialFile { token: Some(token) }) if !token.trim().is_empty() => {
                debug!(path = %path.display(), "Loaded credentials from file");
                return Ok(Credentials { token });
            }
            _ => continue,
        }
    }

    Err(DashboardError::MissingCredentials { searched: paths.to_vec() })
}

/// Relative paths are tried next to `base` first, then as given; absolute paths are kept.
pub fn expand_search_paths(paths: &[PathBuf], base: Option<&Path>) -> Vec<PathBuf> {
    let mut out = Vec::with_capacity(paths.len() * 2);
    for path in paths {
        if let Some(base) = base.filter(|_| path.is_relative()) {
            out.push(base.join(path));
        }
        out.push(path.clone());
    }
    out
}

pub fn load_credentials(config: &AppConfig) -> Result<Credentials, DashboardError> {
    let exe = std::env::current_exe().ok();
    let base = exe.as_deref().and_then(Path::parent);
    let paths = expand_search_paths(&config.credential_paths, base);
    discover_credentials(std::env::var(&config.credential_env).ok(), &paths)
}
