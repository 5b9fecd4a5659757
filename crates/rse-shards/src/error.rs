use rse_domain::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShardsError {
    #[error("shard io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("shard index {index} out of range for distributor with {count} shards")]
    ShardIndexOutOfRange { index: u32, count: u32 },
}

impl ShardsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShardsError::Io(_) => ErrorKind::ServiceUnavailable,
            ShardsError::Serialization(_) => ErrorKind::InternalError,
            ShardsError::ShardIndexOutOfRange { .. } => ErrorKind::InternalError,
        }
    }
}
