use std::io::{Read, Seek, SeekFrom, Write};

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::collector::EventMapping;
use crate::error::EventMappingError;

/// Gzip-over-S3 read/write for one `mappings/<licenseKey>/<version>/events/<cloud>.json.gz`
/// blob, mirroring `rse_rulesets::RulesetBundleIo`'s tempfile-buffered gzip
/// write.
pub struct EventMappingBlobIo {
    client: Client,
    bucket: String,
}

impl EventMappingBlobIo {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self { client, bucket: bucket.into() }
    }

    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), bucket)
    }

    pub async fn write(&self, key: &str, mapping: &EventMapping) -> Result<(), EventMappingError> {
        let bytes = serde_json::to_vec(mapping)?;
        let file = tempfile::tempfile().map_err(|e| EventMappingError::Blob(e.to_string()))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(&bytes).map_err(|e| EventMappingError::Blob(e.to_string()))?;
        let mut file = encoder.finish().map_err(|e| EventMappingError::Blob(e.to_string()))?;
        file.seek(SeekFrom::Start(0)).map_err(|e| EventMappingError::Blob(e.to_string()))?;
        let mut gz_bytes = Vec::new();
        file.read_to_end(&mut gz_bytes).map_err(|e| EventMappingError::Blob(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_encoding("gzip")
            .content_type("application/json")
            .body(ByteStream::from(gz_bytes))
            .send()
            .await
            .map_err(|e| EventMappingError::Blob(e.to_string()))?;
        Ok(())
    }

    pub async fn read(&self, key: &str) -> Result<Option<EventMapping>, EventMappingError> {
        let output = match self.client.get_object().bucket(&self.bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(EventMappingError::Blob(service_err.to_string()));
            }
        };
        let bytes =
            output.body.collect().await.map_err(|e| EventMappingError::Blob(e.to_string()))?.into_bytes();
        let mut decoder = flate2::read::GzDecoder::new(&bytes[..]);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).map_err(|e| EventMappingError::Blob(e.to_string()))?;
        Ok(Some(serde_json::from_slice(&out)?))
    }
}
