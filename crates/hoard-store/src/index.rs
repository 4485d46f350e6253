//! Plaintext existence index: MD5 digests of folder names and entry keys.
//!
//! Lets a client answer "does folder F / entry K exist?" without the password.
//! The index is a set per folder, so writing the same key twice never grows it.

use std::collections::{HashMap, HashSet};

use crate::store::Tree;

pub const NAME_DIGEST_SIZE: usize = 16;

pub type NameDigest = [u8; NAME_DIGEST_SIZE];

/// MD5 of the UTF-8 bytes of `name`.
pub fn name_digest(name: &str) -> NameDigest {
    md5::compute(name.as_bytes()).0
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DigestIndex {
    folders: HashMap<NameDigest, HashSet<NameDigest>>,
}

impl DigestIndex {
    pub fn from_tree(tree: &Tree) -> Self {
        let folders = tree
            .iter()
            .map(|(folder, entries)| {
                let keys = entries.keys().map(|k| name_digest(k)).collect();
                (name_digest(folder), keys)
            })
            .collect();
        Self { folders }
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn clear(&mut self) {
        self.folders.clear();
    }

    pub fn contains_folder(&self, folder: &str) -> bool {
        self.folders.contains_key(&name_digest(folder))
    }

    pub fn contains_entry(&self, folder: &str, key: &str) -> bool {
        self.folders
            .get(&name_digest(folder))
            .is_some_and(|keys| keys.contains(&name_digest(key)))
    }

    pub fn insert_folder(&mut self, folder: &str) {
        self.folders.entry(name_digest(folder)).or_default();
    }

    pub fn remove_folder(&mut self, folder: &str) -> bool {
        self.folders.remove(&name_digest(folder)).is_some()
    }

    pub fn insert_entry(&mut self, folder: &str, key: &str) {
        self.folders
            .entry(name_digest(folder))
            .or_default()
            .insert(name_digest(key));
    }

    pub fn remove_entry(&mut self, folder: &str, key: &str) {
        if let Some(keys) = self.folders.get_mut(&name_digest(folder)) {
            keys.remove(&name_digest(key));
        }
    }

    /// Replaces any earlier record for the same folder digest.
    pub(crate) fn insert_record(&mut self, folder: NameDigest, keys: HashSet<NameDigest>) {
        self.folders.insert(folder, keys);
    }
}
