use std::path::PathBuf;

use hoard_crypto::CipherError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is already open")]
    AlreadyOpen,

    #[error("store is not open")]
    NotOpen,

    #[error("cannot open {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a store file (bad magic)")]
    BadMagic,

    #[error("unsupported store format: version {major}.{minor}, cipher {cipher}, hash {hash}")]
    UnsupportedVersion {
        major: u8,
        minor: u8,
        cipher: u8,
        hash: u8,
    },

    #[error("existence index is truncated")]
    TruncatedIndex,

    #[error("encrypted body of {len} bytes is not block aligned")]
    BlockAlignment { len: usize },

    #[error("no secure random source available for padding")]
    RandomSourceUnavailable,

    /// A wrong password and a corrupted body report the same error.
    #[error("wrong password or corrupted store")]
    IntegrityMismatch,

    #[error("store payload is malformed: {0}")]
    CorruptPayload(#[from] DecodeError),

    #[error("password stretches to a weak cipher key")]
    WeakKey,

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid entry pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),
}

/// Failures reading the big-endian datastream encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of data: needed {needed} bytes, {available} left")]
    UnexpectedEnd { needed: usize, available: usize },

    #[error("string byte length {0} is odd")]
    OddStringLength(u32),

    #[error("string is not valid UTF-16")]
    InvalidUtf16,
}
