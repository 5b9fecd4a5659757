use std::io::{Read, Seek, SeekFrom, Write};

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::RulesetError;

/// Gzip-over-S3 read/write for a ruleset's policy bundle
/// (`{"policies": [...]}`), keyed by the paths in `rse_config::blob_paths`.
pub struct RulesetBundleIo {
    client: Client,
    bucket: String,
}

impl RulesetBundleIo {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self { client, bucket: bucket.into() }
    }

    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), bucket)
    }

    pub async fn write_bundle(&self, key: &str, bundle: &serde_json::Value) -> Result<(), RulesetError> {
        let bytes = serde_json::to_vec(bundle).map_err(|e| RulesetError::Blob(e.to_string()))?;
        let file = tempfile::tempfile().map_err(|e| RulesetError::Blob(e.to_string()))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(&bytes).map_err(|e| RulesetError::Blob(e.to_string()))?;
        let mut file = encoder.finish().map_err(|e| RulesetError::Blob(e.to_string()))?;
        file.seek(SeekFrom::Start(0)).map_err(|e| RulesetError::Blob(e.to_string()))?;
        let mut gz_bytes = Vec::new();
        file.read_to_end(&mut gz_bytes).map_err(|e| RulesetError::Blob(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_encoding("gzip")
            .content_type("application/json")
            .body(ByteStream::from(gz_bytes))
            .send()
            .await
            .map_err(|e| RulesetError::Blob(e.to_string()))?;
        Ok(())
    }

    pub async fn read_bundle(&self, key: &str) -> Result<Option<serde_json::Value>, RulesetError> {
        let output = match self.client.get_object().bucket(&self.bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(RulesetError::Blob(service_err.to_string()));
            }
        };
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| RulesetError::Blob(e.to_string()))?
            .into_bytes();
        let mut decoder = flate2::read::GzDecoder::new(&bytes[..]);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).map_err(|e| RulesetError::Blob(e.to_string()))?;
        serde_json::from_slice(&out).map_err(|e| RulesetError::Blob(e.to_string()))
    }

    /// A presigned GET URL handed to the License Manager on release.
    pub async fn presigned_download_url(
        &self,
        key: &str,
        expires_in: std::time::Duration,
    ) -> Result<String, RulesetError> {
        let presigning_config = aws_sdk_s3::presigning::PresigningConfig::expires_in(expires_in)
            .map_err(|e| RulesetError::Blob(e.to_string()))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| RulesetError::Blob(e.to_string()))?;
        Ok(presigned.uri().to_string())
    }
}
