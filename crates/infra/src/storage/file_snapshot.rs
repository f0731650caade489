//! Session snapshots as JSON files
//!
//! One file per ERP domain, `<dir>/<domain>_cookies.json`, holding the flat
//! cookie map (including `oAuthToken`). Writes go to a temporary file that is
//! renamed over the target, so a crash never leaves a truncated snapshot.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use consinco_core::SnapshotStore;
use consinco_domain::constants::SNAPSHOT_FILE_SUFFIX;
use consinco_domain::{ConsincoError, CookieJar, Result};
use tokio::fs;
use tracing::debug;

use crate::errors::InfraError;

/// [`SnapshotStore`] backed by a directory of JSON files
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding the snapshot for `domain`.
    pub fn path_for(&self, domain: &str) -> PathBuf {
        self.dir.join(format!("{domain}{SNAPSHOT_FILE_SUFFIX}"))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, domain: &str) -> Result<Option<CookieJar>> {
        let path = self.path_for(domain);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(storage_error("reading", &path, err)),
        };

        let cookies: CookieJar = serde_json::from_str(&contents).map_err(|err| {
            ConsincoError::Storage(format!("parsing snapshot {}: {err}", path.display()))
        })?;

        debug!(path = %path.display(), cookies = cookies.len(), "Loaded session snapshot");
        Ok(Some(cookies))
    }

    async fn save(&self, domain: &str, cookies: &CookieJar) -> Result<()> {
        let path = self.path_for(domain);
        let json = serde_json::to_string_pretty(cookies).map_err(|err| {
            let infra: InfraError = err.into();
            ConsincoError::from(infra)
        })?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| storage_error("creating directory for", &path, err))?;

        let tmp_path = path.with_extension(format!("json.tmp.{}", std::process::id()));
        fs::write(&tmp_path, json.as_bytes())
            .await
            .map_err(|err| storage_error("writing", &tmp_path, err))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(&tmp_path, perms)
                .await
                .map_err(|err| storage_error("restricting permissions of", &tmp_path, err))?;
        }

        fs::rename(&tmp_path, &path).await.map_err(|err| storage_error("replacing", &path, err))?;

        debug!(path = %path.display(), cookies = cookies.len(), "Persisted session snapshot");
        Ok(())
    }
}

fn storage_error(action: &str, path: &Path, err: std::io::Error) -> ConsincoError {
    ConsincoError::Storage(format!("{action} {}: {err}", path.display()))
}
