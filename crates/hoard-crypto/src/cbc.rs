//! Cipher-block chaining over any [`BlockCipher`].
//!
//! The register starts at zero (fixed IV) and carries across calls, so a
//! buffer encrypted in several pieces equals the same buffer encrypted at
//! once. A chain serves one direction only until [`CipherBlockChain::reset`].

use zeroize::Zeroize;

use crate::cipher::BlockCipher;
use crate::error::{CipherError, CipherResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Encrypt,
    Decrypt,
}

pub struct CipherBlockChain<C: BlockCipher> {
    cipher: C,
    register: Vec<u8>,
    direction: Option<Direction>,
}

impl<C: BlockCipher> CipherBlockChain<C> {
    pub fn new(cipher: C) -> Self {
        let register = vec![0u8; cipher.block_size()];
        Self {
            cipher,
            register,
            direction: None,
        }
    }

    /// Zero the register and release the direction lock.
    pub fn reset(&mut self) {
        self.register.zeroize();
        self.register.resize(self.cipher.block_size(), 0);
        self.direction = None;
    }

    fn begin(&mut self, direction: Direction, len: usize) -> CipherResult<usize> {
        if !self.cipher.is_keyed() {
            return Err(CipherError::NotKeyed);
        }
        let block = self.cipher.block_size();
        if len % block != 0 {
            return Err(CipherError::Misaligned { len, block });
        }
        match self.direction {
            Some(current) if current != direction => Err(CipherError::ModeConflict),
            _ => {
                self.direction = Some(direction);
                Ok(block)
            }
        }
    }
}

impl<C: BlockCipher> BlockCipher for CipherBlockChain<C> {
    fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    fn set_key(&mut self, key: &[u8], bits: usize) -> CipherResult<()> {
        self.reset();
        self.cipher.set_key(key, bits)
    }

    fn is_keyed(&self) -> bool {
        self.cipher.is_keyed()
    }

    fn encrypt(&mut self, buf: &mut [u8]) -> CipherResult<usize> {
        let block = self.begin(Direction::Encrypt, buf.len())?;
        for chunk in buf.chunks_exact_mut(block) {
            for (byte, prev) in chunk.iter_mut().zip(&self.register) {
                *byte ^= prev;
            }
            self.cipher.encrypt(chunk)?;
            self.register.copy_from_slice(chunk);
        }
        Ok(buf.len())
    }

    fn decrypt(&mut self, buf: &mut [u8]) -> CipherResult<usize> {
        let block = self.begin(Direction::Decrypt, buf.len())?;
        let mut next = vec![0u8; block];
        for chunk in buf.chunks_exact_mut(block) {
            next.copy_from_slice(chunk);
            self.cipher.decrypt(chunk)?;
            for (byte, prev) in chunk.iter_mut().zip(&self.register) {
                *byte ^= prev;
            }
            std::mem::swap(&mut self.register, &mut next);
        }
        next.zeroize();
        Ok(buf.len())
    }
}

impl<C: BlockCipher> Drop for CipherBlockChain<C> {
    fn drop(&mut self) {
        self.register.zeroize();
    }
}
