pub mod config;
pub mod error;

pub use config::{HoardConfig, LogConfig, LogFormat, StoreConfig};
pub use error::{HoardError, HoardResult};
