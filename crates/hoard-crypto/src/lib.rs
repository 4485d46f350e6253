//! hoard-crypto: cipher stack for the hoard secret store
//!
//! Pipeline (sync direction):
//! ```text
//! password ──stretch (SHA-1, 2000 rounds per 16-byte chunk)──▶ key (20 / 40 / 56 bytes)
//! body     ──CBC (zero IV)──▶ Blowfish (64-bit blocks, LE words) ──▶ ciphertext
//! ```
//!
//! The zero IV is safe only because the store prefixes every body with a block
//! of fresh random bytes; see `hoard-store`.

pub mod blowfish;
pub mod cbc;
pub mod cipher;
pub mod error;
pub mod kdf;
pub mod random;

pub use blowfish::Blowfish;
pub use cbc::CipherBlockChain;
pub use cipher::BlockCipher;
pub use error::{CipherError, CipherResult};
pub use kdf::{stretch_password, StretchedKey};
pub use random::{OsRandom, RandomSource};

/// Blowfish block size in bytes (64-bit blocks)
pub const BLOCK_SIZE: usize = 8;

/// Size of a SHA-1 digest
pub const DIGEST_SIZE: usize = 20;
