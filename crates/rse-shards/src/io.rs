use std::io::{Read, Seek, SeekFrom, Write};

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::collection::RuleMeta;
use crate::error::ShardsError;
use crate::part::ShardPart;
use crate::shard::Shard;

/// Gzip-over-S3 I/O for one collection prefix `P`: shard `n` lives at
/// `P/n.json` (gzipped JSON array of parts), meta at `P/meta.json`.
pub struct ShardsS3Io {
    client: Client,
    bucket: String,
    root: String,
}

impl ShardsS3Io {
    pub fn new(client: Client, bucket: impl Into<String>, root: impl Into<String>) -> Self {
        Self { client, bucket: bucket.into(), root: root.into() }
    }

    pub async fn from_env(bucket: impl Into<String>, root: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), bucket, root)
    }

    fn shard_key(&self, n: u32) -> String {
        format!("{}/{n}.json", self.root.trim_end_matches('/'))
    }

    fn meta_key(&self) -> String {
        format!("{}/meta.json", self.root.trim_end_matches('/'))
    }

    pub async fn write_shard(&self, n: u32, shard: &Shard) -> Result<(), ShardsError> {
        let parts: Vec<&ShardPart> = shard.iter().collect();
        let bytes = serde_json::to_vec(&parts)?;
        self.gz_put(&self.shard_key(n), &bytes).await
    }

    pub async fn read_shard(&self, n: u32) -> Result<Option<Vec<ShardPart>>, ShardsError> {
        let Some(bytes) = self.gz_get(&self.shard_key(n)).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub async fn write_meta(&self, meta: &std::collections::HashMap<String, RuleMeta>) -> Result<(), ShardsError> {
        let bytes = serde_json::to_vec(meta)?;
        self.gz_put(&self.meta_key(), &bytes).await
    }

    pub async fn read_meta(&self) -> Result<std::collections::HashMap<String, RuleMeta>, ShardsError> {
        match self.gz_get(&self.meta_key()).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Default::default()),
        }
    }

    async fn gz_put(&self, key: &str, bytes: &[u8]) -> Result<(), ShardsError> {
        // Buffer through a tempfile-backed gzip writer to bound memory on
        // large shards, mirroring ShardsS3IO.write's tempfile gz buffer.
        let file = tempfile::tempfile().map_err(|e| ShardsError::Io(e.to_string()))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(bytes).map_err(|e| ShardsError::Io(e.to_string()))?;
        let mut file = encoder.finish().map_err(|e| ShardsError::Io(e.to_string()))?;
        file.seek(SeekFrom::Start(0)).map_err(|e| ShardsError::Io(e.to_string()))?;

        let mut gz_bytes = Vec::new();
        file.read_to_end(&mut gz_bytes).map_err(|e| ShardsError::Io(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_encoding("gzip")
            .content_type("application/json")
            .body(ByteStream::from(gz_bytes))
            .send()
            .await
            .map_err(|e| ShardsError::Io(e.to_string()))?;
        Ok(())
    }

    async fn gz_get(&self, key: &str) -> Result<Option<Vec<u8>>, ShardsError> {
        let output = match self.client.get_object().bucket(&self.bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(ShardsError::Io(service_err.to_string()));
            }
        };
        let bytes = output.body.collect().await.map_err(|e| ShardsError::Io(e.to_string()))?.into_bytes();

        let mut decoder = GzDecoder::new(&bytes[..]);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).map_err(|e| ShardsError::Io(e.to_string()))?;
        Ok(Some(out))
    }
}
