//! In-memory snapshot store

use std::collections::HashMap;

use async_trait::async_trait;
use consinco_domain::{CookieJar, Result};
use parking_lot::Mutex;

use super::ports::SnapshotStore;

/// Process-local [`SnapshotStore`]; nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: Mutex<HashMap<String, CookieJar>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a jar for `domain`.
    #[must_use]
    pub fn with_snapshot(self, domain: impl Into<String>, cookies: CookieJar) -> Self {
        self.snapshots.lock().insert(domain.into(), cookies);
        self
    }

    /// Jar currently stored for `domain`.
    pub fn get(&self, domain: &str) -> Option<CookieJar> {
        self.snapshots.lock().get(domain).cloned()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self, domain: &str) -> Result<Option<CookieJar>> {
        Ok(self.get(domain))
    }

    async fn save(&self, domain: &str, cookies: &CookieJar) -> Result<()> {
        self.snapshots.lock().insert(domain.to_string(), cookies.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_domain_loads_none() {
        let store = InMemorySnapshotStore::new();
        assert_eq!(store.load("erp.example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_replaces_previous_jar() {
        let first: CookieJar = [("a", "1")].into_iter().collect();
        let second: CookieJar = [("b", "2")].into_iter().collect();
        let store = InMemorySnapshotStore::new().with_snapshot("erp.example.com", first);

        store.save("erp.example.com", &second).await.unwrap();

        assert_eq!(store.load("erp.example.com").await.unwrap(), Some(second));
    }
}
