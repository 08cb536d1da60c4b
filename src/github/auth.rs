//! GitHub token resolution.
//!
//! Order:
//! 1. `github.token` from the train config file
//! 2. TRAIN_GHTOKEN env var
//! 3. GITHUB_TOKEN env var
//! 4. GH_TOKEN env var
//! 5. `gh auth token` (gh CLI)

use std::env;
use std::process::Command;

use tracing::debug;

use crate::error::GitHubError;

/// Environment variables consulted after the config file, in order.
const TOKEN_ENV_VARS: [&str; 3] = ["TRAIN_GHTOKEN", "GITHUB_TOKEN", "GH_TOKEN"];

/// Get a GitHub token, preferring the one stored in the config file.
pub fn resolve_token(config_token: Option<&str>) -> Result<String, GitHubError> {
    if let Some(token) = config_token.map(str::trim).filter(|t| !t.is_empty()) {
        debug!("using token from config file");
        return Ok(token.to_string());
    }

    for var in TOKEN_ENV_VARS {
        if let Ok(token) = env::var(var) {
            let token = token.trim();
            if !token.is_empty() {
                debug!(var, "using token from environment");
                return Ok(token.to_string());
            }
        }
    }

    if let Some(token) = get_token_from_gh_cli() {
        debug!("using token from gh CLI");
        return Ok(token);
    }

    Err(GitHubError::AuthenticationFailed)
}

/// Try to get a token from the gh CLI.
fn get_token_from_gh_cli() -> Option<String> {
    which::which("gh").ok()?;

    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;

    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }

    None
}
