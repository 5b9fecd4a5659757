use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// TTL (seconds) for tenant-supplied cloud credential ciphertext held for an
/// in-flight job.
pub const CREDENTIALS_TTL_SECONDS: i64 = 1800;

/// Ciphertext-at-rest storage for per-job credentials, keyed by job id.
/// Deliberately write-only from the caller's perspective — callers never
/// see plaintext here, only whatever ciphertext they handed in.
#[async_trait]
pub trait SecretStore: Send + Sync + 'static {
    async fn put(&self, key: &str, ciphertext: &str, ttl_seconds: i64);
    async fn get(&self, key: &str) -> Option<String>;
    async fn delete(&self, key: &str);
}

#[derive(Default)]
pub struct InMemorySecretStore {
    entries: Mutex<HashMap<String, (String, DateTime<Utc>)>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn put(&self, key: &str, ciphertext: &str, ttl_seconds: i64) {
        let expires_at = Utc::now() + Duration::seconds(ttl_seconds);
        self.entries.lock().unwrap().insert(key.to_string(), (ciphertext.to_string(), expires_at));
    }

    async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Utc::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn delete(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_returns_ciphertext() {
        let store = InMemorySecretStore::new();
        store.put("job-1", "enc(...)", CREDENTIALS_TTL_SECONDS).await;
        assert_eq!(store.get("job-1").await, Some("enc(...)".to_string()));
    }

    #[tokio::test]
    async fn expired_entry_is_evicted_on_read() {
        let store = InMemorySecretStore::new();
        store.put("job-1", "enc(...)", -1).await;
        assert_eq!(store.get("job-1").await, None);
    }
}
