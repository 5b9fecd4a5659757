use std::sync::Arc;

use dashmap::DashMap;
use rse_config::blob_paths;
use rse_domain::{Cloud, LicenseKey, Rule};

use crate::collector::{build_mappings, EventMapping};
use crate::error::EventMappingError;
use crate::io::EventMappingBlobIo;

/// Clouds an event mapping is ever published for — Kubernetes has no
/// event-driven scanning mode.
pub const EVENT_MAPPING_CLOUDS: &[Cloud] = &[Cloud::Aws, Cloud::Azure, Cloud::Google];

/// Mapping version tag used when a license carries no explicit rule-metadata
/// version of its own — every license's mapping blobs are republished under
/// this sentinel on each metadata refresh, so readers never need to track a
/// separate version number per license (`License` carries no version field
/// of its own, so the blob layout's `<version>` path segment collapses to
/// one sentinel instead of a per-license generation stamp).
pub const LATEST_MAPPING_VERSION: &str = "latest";

/// Rebuilds every rule's event mapping and publishes the three gzipped
/// blobs at `mappings/<licenseKey>/<version>/events/{aws,azure,google}.json.gz`.
/// Called on metadata refresh (license or version change).
pub async fn publish(
    io: &EventMappingBlobIo,
    license_key: &LicenseKey,
    version: &str,
    rules: &[Rule],
) -> Result<(), EventMappingError> {
    let mappings = build_mappings(rules);
    for &cloud in EVENT_MAPPING_CLOUDS {
        let mapping = mappings.get(&cloud).cloned().unwrap_or_default();
        let key = blob_paths::event_mapping_key(license_key.as_str(), version, &cloud.to_string());
        io.write(&key, &mapping).await?;
    }
    Ok(())
}

/// Memoized `(licenseKey, version, cloud)`-keyed reader over the published
/// blobs, backed by a concurrent cache.
pub struct S3EventMappingProvider {
    io: EventMappingBlobIo,
    cache: DashMap<(LicenseKey, String, Cloud), Arc<EventMapping>>,
}

impl S3EventMappingProvider {
    pub fn new(io: EventMappingBlobIo) -> Self {
        Self { io, cache: DashMap::new() }
    }

    pub async fn get(
        &self,
        license_key: &LicenseKey,
        version: &str,
        cloud: Cloud,
    ) -> Result<Arc<EventMapping>, EventMappingError> {
        let cache_key = (license_key.clone(), version.to_string(), cloud);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached.clone());
        }
        let key = blob_paths::event_mapping_key(license_key.as_str(), version, &cloud.to_string());
        let mapping = self.io.read(&key).await?.unwrap_or_default();
        let mapping = Arc::new(mapping);
        self.cache.insert(cache_key, mapping.clone());
        Ok(mapping)
    }

    /// Drop every cached entry for `(license_key, version)` — called after
    /// `publish` so the next `get` re-reads the fresh blob.
    pub fn invalidate(&self, license_key: &LicenseKey, version: &str) {
        self.cache.retain(|(lk, v, _), _| !(lk == license_key && v == version));
    }
}
