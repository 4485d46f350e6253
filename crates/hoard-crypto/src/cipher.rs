//! The block-cipher seam shared by [`Blowfish`](crate::Blowfish) and the
//! [`CipherBlockChain`](crate::CipherBlockChain) wrapper.

use crate::error::CipherResult;

/// A keyed transform over whole blocks, applied in place.
///
/// `encrypt` and `decrypt` return the number of bytes processed, which is
/// always the full buffer. They fail without touching the buffer when no key
/// is set or when its length is not a multiple of [`block_size`](Self::block_size).
pub trait BlockCipher {
    fn block_size(&self) -> usize;

    /// Install `bits` bits of key material taken from the front of `key`.
    fn set_key(&mut self, key: &[u8], bits: usize) -> CipherResult<()>;

    fn is_keyed(&self) -> bool;

    fn encrypt(&mut self, buf: &mut [u8]) -> CipherResult<usize>;

    fn decrypt(&mut self, buf: &mut [u8]) -> CipherResult<usize>;
}
