use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Warehouse error (HTTP {status}): {message}")]
    Warehouse { status: u16, message: String },

    #[error("Failed to decode warehouse response: {0}")]
    Decode(String),

    #[error("HTTP error: {0}")]
    Http(String),
}
