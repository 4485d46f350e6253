use thiserror::Error;

pub type CipherResult<T> = Result<T, CipherError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("cipher used before a key was set")]
    NotKeyed,

    #[error("buffer of {len} bytes is not a multiple of the {block}-byte block size")]
    Misaligned { len: usize, block: usize },

    #[error("unsupported key length: {bits} bits")]
    InvalidKeyLength { bits: usize },

    #[error("weak key: substitution table has repeated entries")]
    WeakKey,

    #[error("cipher chain already in use for the opposite direction")]
    ModeConflict,

    #[error("no secure random source available")]
    RandomUnavailable,
}
