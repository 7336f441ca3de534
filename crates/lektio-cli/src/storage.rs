//! Session construction over a file-backed token store.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use lektio::{ApiUrl, Config, FileTokenStore, Session};

/// Build a session backed by the per-user token file.
///
/// The API base URL comes from `--api-url` when given, otherwise from
/// `LEKTIO_API_URL`.
pub fn build_session(api_url: Option<&str>) -> Result<Session> {
    let config = match api_url {
        Some(raw) => Config::new(ApiUrl::new(raw).context("Invalid API URL")?),
        None => Config::from_env()
            .context("No API URL configured; pass --api-url or set LEKTIO_API_URL")?,
    };

    let store = token_store()?;
    Ok(Session::new(config, Arc::new(store)))
}

/// Open the token store under the platform data directory.
fn token_store() -> Result<FileTokenStore> {
    let dirs =
        ProjectDirs::from("", "", "lektio").context("Could not determine config directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(FileTokenStore::new(data_dir.join("tokens.json")))
}
