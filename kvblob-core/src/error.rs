use thiserror::Error;

pub type Result<T> = std::result::Result<T, BlobError>;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob name: {0}")]
    InvalidName(String),

    #[error("invalid open mode: {0}")]
    InvalidMode(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("malformed chunk header: {0}")]
    MalformedHeader(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("writer is closed")]
    WriterClosed,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<redis::RedisError> for BlobError {
    fn from(err: redis::RedisError) -> Self {
        BlobError::Backend(err.to_string())
    }
}

impl From<etcd_client::Error> for BlobError {
    fn from(err: etcd_client::Error) -> Self {
        BlobError::Backend(err.to_string())
    }
}

impl From<config::ConfigError> for BlobError {
    fn from(err: config::ConfigError) -> Self {
        BlobError::Config(err.to_string())
    }
}
