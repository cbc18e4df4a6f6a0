use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("remote API error: {0}")]
    Remote(String),

    #[error("upload protocol error: {0}")]
    UploadProtocol(String),

    #[error("metadata store error: {0}")]
    Metadata(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
