use thiserror::Error;

pub type HoardResult<T> = Result<T, HoardError>;

#[derive(Debug, Error)]
pub enum HoardError {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
