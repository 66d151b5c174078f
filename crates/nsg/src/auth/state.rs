//! The session file: portal URL plus an exported session.

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use netschool_core::{auth::ExportedSession, Client};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::portal_client;

#[derive(Serialize, Deserialize)]
struct SessionFile {
    url: String,
    session: ExportedSession,
}

pub(crate) async fn save(client: &Client, path: &Path) -> Result<()> {
    let file = SessionFile {
        url: client
            .internal
            .http()
            .origin()
            .as_str()
            .trim_end_matches('/')
            .to_owned(),
        session: client.auth().export_session().await?,
    };
    std::fs::write(path, serde_json::to_string_pretty(&file)?)
        .wrap_err_with(|| format!("Could not write {}", path.display()))?;
    info!(path = %path.display(), "Session saved");
    Ok(())
}

pub(crate) async fn restore(path: &Path) -> Result<Client> {
    let raw = std::fs::read_to_string(path).wrap_err_with(|| {
        format!("Could not read {}, log in with `nsg login` first", path.display())
    })?;
    let file: SessionFile = serde_json::from_str(&raw)?;

    let client = portal_client(&file.url)?;
    client
        .auth()
        .import_session(&serde_json::to_string(&file.session)?)
        .await?;
    Ok(client)
}

pub(crate) fn delete(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
