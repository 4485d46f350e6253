//! On-disk layout.
//!
//! ```text
//! magic (12) | major minor cipher hash (4) | index | encrypted body
//!
//! index: u32 folders, per folder: md5(name) (16) | u32 n | n x md5(key) (16)
//! body:  CBC-Blowfish of
//!        random (8) | u32 treeLen | tree | random pad (1..=8) | sha1(tree) (20)
//! tree:  until exhausted: QString folder | u32 n | n x (QString key | i32 kind | QByteArray value)
//! ```

use std::collections::HashSet;

use hoard_crypto::{RandomSource, BLOCK_SIZE, DIGEST_SIZE};
use sha1::{Digest, Sha1};
use tracing::warn;
use zeroize::{Zeroize, Zeroizing};

use crate::codec::{self, DataReader, DataWriter};
use crate::entry::{Entry, EntryKind};
use crate::error::{DecodeError, StoreError, StoreResult};
use crate::index::{name_digest, DigestIndex, NAME_DIGEST_SIZE};
use crate::store::{Folder, Tree};

pub const MAGIC: &[u8; 12] = b"KWALLET\n\r\0\r\n";

/// Size of the file `sync` writes for an empty store.
pub const MIN_FILE_SIZE: u64 = (12 + 4 + 4 + 5 * BLOCK_SIZE) as u64;

pub const MAX_INDEX_FOLDERS: u32 = 0xFFFF;

const LENGTH_FIELD: usize = 4;

/// Random prefix, length field and trailing hash.
const BODY_OVERHEAD: usize = BLOCK_SIZE + LENGTH_FIELD + DIGEST_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherId {
    BlowfishCbc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashId {
    Sha1,
}

/// The four format bytes after the magic. Only one combination exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub major: u8,
    pub minor: u8,
    pub cipher: CipherId,
    pub hash: HashId,
}

impl FormatDescriptor {
    pub const CURRENT: Self = Self {
        major: 0,
        minor: 0,
        cipher: CipherId::BlowfishCbc,
        hash: HashId::Sha1,
    };

    fn to_bytes(self) -> [u8; 4] {
        let cipher = match self.cipher {
            CipherId::BlowfishCbc => 0,
        };
        let hash = match self.hash {
            HashId::Sha1 => 0,
        };
        [self.major, self.minor, cipher, hash]
    }

    fn from_bytes([major, minor, cipher, hash]: [u8; 4]) -> StoreResult<Self> {
        let unsupported = StoreError::UnsupportedVersion {
            major,
            minor,
            cipher,
            hash,
        };
        if (major, minor) != (Self::CURRENT.major, Self::CURRENT.minor) {
            return Err(unsupported);
        }
        let cipher = match cipher {
            0 => CipherId::BlowfishCbc,
            _ => return Err(unsupported),
        };
        let hash = match hash {
            0 => HashId::Sha1,
            _ => return Err(unsupported),
        };
        Ok(Self {
            major,
            minor,
            cipher,
            hash,
        })
    }
}

pub(crate) fn write_header(w: &mut DataWriter) {
    w.put_raw(MAGIC);
    w.put_raw(&FormatDescriptor::CURRENT.to_bytes());
}

pub(crate) fn read_header(r: &mut DataReader<'_>) -> StoreResult<FormatDescriptor> {
    match r.raw(MAGIC.len()) {
        Ok(magic) if magic == MAGIC => {}
        _ => return Err(StoreError::BadMagic),
    }
    let bytes = r.array::<4>().map_err(|_| StoreError::BadMagic)?;
    FormatDescriptor::from_bytes(bytes)
}

pub(crate) fn index_len(tree: &Tree) -> usize {
    4 + tree
        .values()
        .map(|entries| NAME_DIGEST_SIZE + 4 + entries.len() * NAME_DIGEST_SIZE)
        .sum::<usize>()
}

/// One record per folder, one digest per entry, in tree order.
pub(crate) fn encode_index(tree: &Tree, w: &mut DataWriter) {
    w.put_u32(tree.len() as u32);
    for (folder, entries) in tree {
        w.put_raw(&name_digest(folder));
        w.put_u32(entries.len() as u32);
        for key in entries.keys() {
            w.put_raw(&name_digest(key));
        }
    }
}

pub(crate) fn decode_index(r: &mut DataReader<'_>) -> StoreResult<DigestIndex> {
    let truncated = |_: DecodeError| StoreError::TruncatedIndex;

    let folders = r.u32().map_err(truncated)?;
    if folders > MAX_INDEX_FOLDERS {
        return Err(StoreError::TruncatedIndex);
    }

    let mut index = DigestIndex::default();
    for _ in 0..folders {
        let folder = r.array::<NAME_DIGEST_SIZE>().map_err(truncated)?;
        let count = r.u32().map_err(truncated)? as usize;
        if count.saturating_mul(NAME_DIGEST_SIZE) > r.remaining() {
            return Err(StoreError::TruncatedIndex);
        }
        let mut keys = HashSet::with_capacity(count);
        for _ in 0..count {
            keys.insert(r.array::<NAME_DIGEST_SIZE>().map_err(truncated)?);
        }
        index.insert_record(folder, keys);
    }
    Ok(index)
}

fn tree_len(tree: &Tree) -> usize {
    tree.iter()
        .map(|(folder, entries)| {
            codec::string_len(folder)
                + 4
                + entries
                    .iter()
                    .map(|(key, entry)| codec::string_len(key) + 4 + codec::bytes_len(entry.value()))
                    .sum::<usize>()
        })
        .sum()
}

pub(crate) fn encode_tree(tree: &Tree) -> Zeroizing<Vec<u8>> {
    let len = tree_len(tree);
    let mut w = DataWriter::with_capacity(len);
    for (folder, entries) in tree {
        w.put_string(folder);
        w.put_u32(entries.len() as u32);
        for (key, entry) in entries {
            w.put_string(key);
            w.put_i32(entry.kind().code());
            w.put_bytes(entry.value());
        }
    }
    debug_assert_eq!(w.len(), len);
    Zeroizing::new(w.into_inner())
}

/// A repeated folder name replaces the earlier record.
pub(crate) fn decode_tree(bytes: &[u8]) -> Result<Tree, DecodeError> {
    let mut r = DataReader::new(bytes);
    let mut tree = Tree::new();
    let mut dropped = 0usize;

    while !r.is_empty() {
        let folder = r.string()?;
        let count = r.u32()?;
        let mut entries = Folder::new();
        for _ in 0..count {
            let key = r.string()?;
            let code = r.i32()?;
            let mut value = r.bytes()?;
            match EntryKind::from_code(code) {
                Some(kind @ (EntryKind::Password | EntryKind::Stream | EntryKind::Map)) => {
                    entries.insert(key.clone(), Entry::new(key, kind, value));
                }
                _ => {
                    value.zeroize();
                    dropped += 1;
                    warn!(kind = code, "discarding entry of unsupported kind");
                }
            }
        }
        tree.insert(folder, entries);
    }

    if dropped > 0 {
        warn!(entries = dropped, "entries lost on load");
    }
    Ok(tree)
}

/// Plaintext body for `tree_bytes`, ready to encrypt. The caller bounds the
/// tree to `u32::MAX` bytes.
pub(crate) fn seal_body<R: RandomSource + ?Sized>(
    tree_bytes: &[u8],
    random: &mut R,
) -> StoreResult<Zeroizing<Vec<u8>>> {
    let unpadded = BODY_OVERHEAD + tree_bytes.len();
    let pad = BLOCK_SIZE - unpadded % BLOCK_SIZE;

    let mut noise = Zeroizing::new(vec![0u8; BLOCK_SIZE + pad]);
    random
        .fill(&mut noise)
        .map_err(|_| StoreError::RandomSourceUnavailable)?;

    let mut body = Zeroizing::new(Vec::with_capacity(unpadded + pad));
    body.extend_from_slice(&noise[..BLOCK_SIZE]);
    body.extend_from_slice(&(tree_bytes.len() as u32).to_be_bytes());
    body.extend_from_slice(tree_bytes);
    body.extend_from_slice(&noise[BLOCK_SIZE..]);
    body.extend_from_slice(&Sha1::digest(tree_bytes));
    debug_assert_eq!(body.len() % BLOCK_SIZE, 0);
    Ok(body)
}

/// The tree bytes inside a decrypted body, once the length and hash check out.
pub(crate) fn unseal_body(plain: &[u8]) -> StoreResult<&[u8]> {
    if plain.len() < BODY_OVERHEAD {
        return Err(StoreError::IntegrityMismatch);
    }
    let mut len_field = [0u8; LENGTH_FIELD];
    len_field.copy_from_slice(&plain[BLOCK_SIZE..BLOCK_SIZE + LENGTH_FIELD]);
    let tree_len = u32::from_be_bytes(len_field) as usize;
    if tree_len > plain.len() - BODY_OVERHEAD {
        return Err(StoreError::IntegrityMismatch);
    }

    let start = BLOCK_SIZE + LENGTH_FIELD;
    let tree = &plain[start..start + tree_len];
    let stored = &plain[plain.len() - DIGEST_SIZE..];
    let mut computed = Sha1::digest(tree);
    let matches = computed.as_slice() == stored;
    computed.as_mut_slice().zeroize();
    if !matches {
        return Err(StoreError::IntegrityMismatch);
    }
    Ok(tree)
}
