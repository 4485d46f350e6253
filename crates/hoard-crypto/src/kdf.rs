//! Password stretching: SHA-1 iterated over 16-byte password chunks → cipher key

use sha1::digest::generic_array::GenericArray;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::DIGEST_SIZE;

/// Total SHA-1 applications per password chunk.
pub const STRETCH_ROUNDS: usize = 2000;

const CHUNK_LEN: usize = 16;
const MAX_CHUNKS: usize = 4;

const SHA1_BLOCK: usize = 64;
const SHA1_INIT: [u32; 5] = [0x6745_2301, 0xEFCD_AB89, 0x98BA_DCFE, 0x1032_5476, 0xC3D2_E1F0];

/// Cipher key material stretched from a password.
///
/// 20, 40 or 56 bytes depending on the password length. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct StretchedKey {
    bytes: Vec<u8>,
}

impl StretchedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Key length in bits, as handed to [`BlockCipher::set_key`](crate::BlockCipher::set_key).
    pub fn bits(&self) -> usize {
        self.bytes.len() * 8
    }
}

impl std::fmt::Debug for StretchedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StretchedKey")
            .field("len", &self.bytes.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Stretch `password` into Blowfish key material.
///
/// The password is split into chunks `[0,16)`, `[16,32)`, `[32,48)` and
/// `[48,..)`; each present chunk is hashed [`STRETCH_ROUNDS`] times. Digests
/// are then concatenated by password length:
///
/// | password bytes | key layout          | key bytes |
/// |----------------|---------------------|-----------|
/// | 0..=16         | 20                  | 20        |
/// | 17..=32        | 20 + 20             | 40        |
/// | 33..=48        | 20 + 20 + 16        | 56        |
/// | 49..           | 14 + 14 + 14 + 14   | 56        |
pub fn stretch_password(password: &[u8]) -> StretchedKey {
    let mut digests: Vec<Zeroizing<[u8; DIGEST_SIZE]>> = Vec::with_capacity(MAX_CHUNKS);
    digests.push(stretch_chunk(&password[..password.len().min(CHUNK_LEN)]));
    for i in 1..MAX_CHUNKS {
        let start = i * CHUNK_LEN;
        if password.len() <= start {
            break;
        }
        let end = if i == MAX_CHUNKS - 1 {
            password.len()
        } else {
            password.len().min(start + CHUNK_LEN)
        };
        digests.push(stretch_chunk(&password[start..end]));
    }

    let take: &[usize] = match digests.len() {
        1 => &[20],
        2 => &[20, 20],
        3 => &[20, 20, 16],
        _ => &[14, 14, 14, 14],
    };

    let mut bytes = Vec::with_capacity(take.iter().sum());
    for (digest, n) in digests.iter().zip(take) {
        bytes.extend_from_slice(&digest[..*n]);
    }
    StretchedKey { bytes }
}

fn stretch_chunk(chunk: &[u8]) -> Zeroizing<[u8; DIGEST_SIZE]> {
    let mut digest = Zeroizing::new([0u8; DIGEST_SIZE]);
    let mut input = Zeroizing::new([0u8; DIGEST_SIZE]);

    sha1_into(chunk, &mut digest);
    for _ in 1..STRETCH_ROUNDS {
        input.copy_from_slice(&*digest);
        sha1_into(&*input, &mut digest);
    }
    digest
}

/// SHA-1 of `data` into `out`.
///
/// Runs the bare compression function over buffers owned here so the
/// chaining state and the padded tail are wiped on return. `sha1::Sha1`
/// keeps its block buffer past `finalize_into_reset` with no way to scrub it.
fn sha1_into(data: &[u8], out: &mut [u8; DIGEST_SIZE]) {
    let mut state = Zeroizing::new(SHA1_INIT);

    let mut blocks = data.chunks_exact(SHA1_BLOCK);
    for block in &mut blocks {
        sha1::compress(&mut state, std::slice::from_ref(GenericArray::from_slice(block)));
    }

    // Message tail, 0x80, zero fill, then the 64-bit big-endian bit length
    let rest = blocks.remainder();
    let mut tail = Zeroizing::new([0u8; 2 * SHA1_BLOCK]);
    tail[..rest.len()].copy_from_slice(rest);
    tail[rest.len()] = 0x80;
    let tail_len = if rest.len() + 9 <= SHA1_BLOCK {
        SHA1_BLOCK
    } else {
        2 * SHA1_BLOCK
    };
    let bit_len = (data.len() as u64).wrapping_mul(8);
    tail[tail_len - 8..tail_len].copy_from_slice(&bit_len.to_be_bytes());
    for block in tail[..tail_len].chunks_exact(SHA1_BLOCK) {
        sha1::compress(&mut state, std::slice::from_ref(GenericArray::from_slice(block)));
    }

    for (dst, word) in out.chunks_exact_mut(4).zip(state.iter()) {
        dst.copy_from_slice(&word.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            hex(stretch_password(b"abc").as_bytes()),
            "ee0ecc902e5449f043f672dd6b910f6ea8e6bf3e"
        );
        assert_eq!(
            hex(stretch_password(b"").as_bytes()),
            "a8b7261a9a88711d29925652655cbd0624a590cc"
        );
        assert_eq!(
            hex(stretch_password(&[b'a'; 20]).as_bytes()),
            "92d93af2a2eb29d5cf111a07494a8514c926e502\
             119d9e885c8635873a5c106b89ff944a1f6bcae6"
        );
    }

    #[test]
    fn test_key_lengths_by_password_length() {
        let cases = [
            (0, 20),
            (1, 20),
            (16, 20),
            (17, 40),
            (32, 40),
            (33, 56),
            (48, 56),
            (49, 56),
            (200, 56),
        ];
        for (pw_len, key_len) in cases {
            let key = stretch_password(&vec![b'x'; pw_len]);
            assert_eq!(key.len(), key_len, "password of {pw_len} bytes");
            assert_eq!(key.bits(), key_len * 8);
        }
    }

    #[test]
    fn test_three_chunk_layout() {
        // Chunks 1 and 2 are identical, so their 20-byte digests repeat
        let key = stretch_password(&[b'b'; 40]);
        let bytes = key.as_bytes();
        assert_eq!(&bytes[..20], &bytes[20..40]);
        assert_eq!(
            hex(bytes),
            "b3f453e406b852cc8d92732d48787b0011688e8c\
             b3f453e406b852cc8d92732d48787b0011688e8c\
             e1ae963a503b168872958a095b9ca5e1"
        );
    }

    #[test]
    fn test_four_chunk_layout() {
        let key = stretch_password(&[b'c'; 60]);
        let bytes = key.as_bytes();
        assert_eq!(&bytes[..14], &bytes[14..28]);
        assert_eq!(&bytes[..14], &bytes[28..42]);
        // Last chunk is 12 bytes long, so its digest differs
        assert_ne!(&bytes[..14], &bytes[42..]);
    }

    #[test]
    fn test_tail_beyond_48_bytes_counts() {
        let mut a = vec![b'z'; 80];
        let b = a.clone();
        a[79] = b'y';
        assert_ne!(
            stretch_password(&a).as_bytes(),
            stretch_password(&b).as_bytes(),
            "the fourth chunk runs to the end of the password"
        );
    }

    #[test]
    fn test_sha1_into_matches_hasher() {
        use sha1::{Digest, Sha1};

        // Lengths either side of the one- and two-block padding split
        for len in [0usize, 1, 20, 55, 56, 63, 64, 65, 119, 120, 200] {
            let data: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
            let mut out = [0u8; DIGEST_SIZE];
            sha1_into(&data, &mut out);
            assert_eq!(out.as_slice(), Sha1::digest(&data).as_slice(), "{len} bytes");
        }
    }

    #[test]
    fn test_deterministic() {
        let k1 = stretch_password(b"correct horse battery staple");
        let k2 = stretch_password(b"correct horse battery staple");
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_debug_redacted() {
        let key = stretch_password(b"abc");
        let dbg = format!("{key:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("ee0ecc"));
    }
}
