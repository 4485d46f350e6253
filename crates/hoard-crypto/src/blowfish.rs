//! Blowfish: 64-bit blocks, 16 Feistel rounds, 32 to 448-bit keys.
//!
//! Block layout: each 8-byte block is read as two little-endian `u32` words
//! (left, right). The stored format was defined on little-endian hosts, so the
//! explicit `from_le_bytes` / `to_le_bytes` conversion is what keeps files
//! portable to big-endian machines.
//!
//! Key material is folded into the round keys big-endian, exactly as in the
//! reference algorithm, so the published test vectors hold word-for-word.

mod tables;

use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::cipher::BlockCipher;
use crate::error::{CipherError, CipherResult};
use crate::BLOCK_SIZE;

use self::tables::{P_INIT, S_INIT};

pub const MIN_KEY_BITS: usize = 32;
pub const MAX_KEY_BITS: usize = 448;

const ROUNDS: usize = 16;

/// A Blowfish instance with its own keyed copy of the round-key and
/// substitution tables. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Blowfish {
    p: [u32; ROUNDS + 2],
    s: [[u32; 256]; 4],
    keyed: bool,
}

impl Blowfish {
    /// An unkeyed cipher. Every block operation fails until [`set_key`](BlockCipher::set_key).
    pub fn new() -> Self {
        Self {
            p: P_INIT,
            s: S_INIT,
            keyed: false,
        }
    }

    /// Shorthand for `new()` followed by `set_key(key, key.len() * 8)`.
    pub fn with_key(key: &[u8]) -> CipherResult<Self> {
        let mut bf = Self::new();
        bf.set_key(key, key.len() * 8)?;
        Ok(bf)
    }

    fn f(&self, x: u32) -> u32 {
        let [a, b, c, d] = x.to_be_bytes();
        (self.s[0][a as usize].wrapping_add(self.s[1][b as usize]) ^ self.s[2][c as usize])
            .wrapping_add(self.s[3][d as usize])
    }

    fn encipher(&self, mut left: u32, mut right: u32) -> (u32, u32) {
        for i in 0..ROUNDS {
            left ^= self.p[i];
            right ^= self.f(left);
            std::mem::swap(&mut left, &mut right);
        }
        std::mem::swap(&mut left, &mut right);
        right ^= self.p[ROUNDS];
        left ^= self.p[ROUNDS + 1];
        (left, right)
    }

    fn decipher(&self, mut left: u32, mut right: u32) -> (u32, u32) {
        for i in (2..ROUNDS + 2).rev() {
            left ^= self.p[i];
            right ^= self.f(left);
            std::mem::swap(&mut left, &mut right);
        }
        std::mem::swap(&mut left, &mut right);
        right ^= self.p[1];
        left ^= self.p[0];
        (left, right)
    }

    /// Accept the freshly expanded tables, or wipe them if any S-box repeats a word.
    fn finish_schedule(&mut self, bits: usize) -> CipherResult<()> {
        if has_repeated_entry(&self.s) {
            debug!(bits, "rejecting weak Blowfish key");
            self.zeroize();
            return Err(CipherError::WeakKey);
        }
        self.keyed = true;
        Ok(())
    }

    fn check(&self, len: usize) -> CipherResult<()> {
        if !self.keyed {
            return Err(CipherError::NotKeyed);
        }
        if len % BLOCK_SIZE != 0 {
            return Err(CipherError::Misaligned {
                len,
                block: BLOCK_SIZE,
            });
        }
        Ok(())
    }

    fn apply(&self, buf: &mut [u8], op: fn(&Self, u32, u32) -> (u32, u32)) {
        for block in buf.chunks_exact_mut(BLOCK_SIZE) {
            let (head, tail) = block.split_at_mut(4);
            let left = u32::from_le_bytes([head[0], head[1], head[2], head[3]]);
            let right = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);
            let (left, right) = op(self, left, right);
            head.copy_from_slice(&left.to_le_bytes());
            tail.copy_from_slice(&right.to_le_bytes());
        }
    }
}

impl Default for Blowfish {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Blowfish {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blowfish")
            .field("keyed", &self.keyed)
            .field("tables", &"[REDACTED]")
            .finish()
    }
}

impl BlockCipher for Blowfish {
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn set_key(&mut self, key: &[u8], bits: usize) -> CipherResult<()> {
        if bits % 8 != 0 || !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&bits) || key.len() < bits / 8
        {
            return Err(CipherError::InvalidKeyLength { bits });
        }
        let key = &key[..bits / 8];

        self.keyed = false;
        self.p = P_INIT;
        self.s = S_INIT;

        // Round keys XOR the key bytes; the key wraps when it runs short.
        let mut j = 0;
        for slot in self.p.iter_mut() {
            let mut data = 0u32;
            for _ in 0..4 {
                data = (data << 8) | u32::from(key[j]);
                j = (j + 1) % key.len();
            }
            *slot ^= data;
        }

        let (mut left, mut right) = (0u32, 0u32);
        for i in (0..ROUNDS + 2).step_by(2) {
            (left, right) = self.encipher(left, right);
            self.p[i] = left;
            self.p[i + 1] = right;
        }
        for t in 0..4 {
            for i in (0..256).step_by(2) {
                (left, right) = self.encipher(left, right);
                self.s[t][i] = left;
                self.s[t][i + 1] = right;
            }
        }

        self.finish_schedule(bits)
    }

    fn is_keyed(&self) -> bool {
        self.keyed
    }

    fn encrypt(&mut self, buf: &mut [u8]) -> CipherResult<usize> {
        self.check(buf.len())?;
        self.apply(buf, Self::encipher);
        Ok(buf.len())
    }

    fn decrypt(&mut self, buf: &mut [u8]) -> CipherResult<usize> {
        self.check(buf.len())?;
        self.apply(buf, Self::decipher);
        Ok(buf.len())
    }
}

/// True if any substitution table holds the same word twice.
fn has_repeated_entry(tables: &[[u32; 256]; 4]) -> bool {
    tables.iter().any(|table| {
        let mut sorted = *table;
        sorted.sort_unstable();
        let repeated = sorted.windows(2).any(|w| w[0] == w[1]);
        sorted.zeroize();
        repeated
    })
}
