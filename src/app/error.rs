use thiserror::Error;

#[derive(Error, Debug)]
pub enum MurmurError {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MurmurError>;
