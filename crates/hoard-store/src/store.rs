//! `SecretStore`: the in-memory tree, its plaintext index, and the file they
//! are read from and written to.
//!
//! Nothing touches disk except [`SecretStore::open`], [`SecretStore::sync`]
//! and [`SecretStore::load_index`]. Every mutation updates tree and index
//! together.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use hoard_core::StoreConfig;
use hoard_crypto::{
    stretch_password, BlockCipher, Blowfish, CipherBlockChain, CipherError, OsRandom,
    RandomSource, BLOCK_SIZE,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::codec::{DataReader, DataWriter};
use crate::entry::{Entry, EntryKind};
use crate::error::{StoreError, StoreResult};
use crate::format::{self, MAX_INDEX_FOLDERS, MIN_FILE_SIZE};
use crate::index::DigestIndex;

/// Entries of one folder, by key.
pub type Folder = BTreeMap<String, Entry>;

/// The whole persisted content: folders by name.
pub type Tree = BTreeMap<String, Folder>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStatus {
    /// An existing file was decrypted.
    Opened,
    /// No usable file was found and a new empty store was written.
    Created,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Write a fresh store when `open` finds none.
    pub create_missing: bool,
    /// Unix permissions for written files.
    pub file_mode: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            create_missing: true,
            file_mode: 0o600,
        }
    }
}

impl From<&StoreConfig> for StoreOptions {
    fn from(config: &StoreConfig) -> Self {
        Self {
            create_missing: config.create_missing,
            file_mode: config.file_mode,
        }
    }
}

pub struct SecretStore {
    path: PathBuf,
    name: String,
    options: StoreOptions,
    random: Box<dyn RandomSource + Send>,
    open: bool,
    tree: Tree,
    index: DigestIndex,
}

impl SecretStore {
    /// A closed store bound to `path`. Nothing is read until `open`.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            options: StoreOptions::default(),
            random: Box::new(OsRandom),
            open: false,
            tree: Tree::new(),
            index: DigestIndex::default(),
        }
    }

    /// The store `name` under the configured directory.
    pub fn from_config(config: &StoreConfig, name: &str) -> Self {
        Self::new(config.path_for(name), name).with_options(StoreOptions::from(config))
    }

    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the padding source. `OsRandom` by default.
    pub fn with_random_source(mut self, random: impl RandomSource + Send + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// True when `path` holds a file large enough to be a store. Smaller
    /// files, including empty ones, count as absent rather than corrupt.
    pub fn exists(path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|meta| meta.is_file() && meta.len() >= MIN_FILE_SIZE)
            .unwrap_or(false)
    }

    /// Decrypt the store with `password`.
    ///
    /// The existence index is loaded before any key work, so it stays
    /// populated even when the password turns out to be wrong. On any error
    /// the store remains closed with an empty tree.
    pub fn open(&mut self, password: &SecretString) -> StoreResult<OpenStatus> {
        if self.open {
            return Err(StoreError::AlreadyOpen);
        }
        self.tree.clear();
        self.index.clear();

        if !Self::exists(&self.path) {
            return self.create(password);
        }

        let data = std::fs::read(&self.path).map_err(|source| StoreError::FileOpen {
            path: self.path.clone(),
            source,
        })?;
        let mut reader = DataReader::new(&data);
        format::read_header(&mut reader)?;
        self.index = format::decode_index(&mut reader)?;

        let body = reader.rest();
        if body.len() % BLOCK_SIZE != 0 {
            return Err(StoreError::BlockAlignment { len: body.len() });
        }

        let mut plain = Zeroizing::new(body.to_vec());
        let key = stretch_password(password.expose_secret().as_bytes());
        let mut chain = CipherBlockChain::new(Blowfish::new());
        chain
            .set_key(key.as_bytes(), key.bits())
            .map_err(open_key_error)?;
        drop(key);
        chain.decrypt(&mut plain)?;

        let tree_bytes = format::unseal_body(&plain)?;
        self.tree = format::decode_tree(tree_bytes)?;
        // The plaintext index is unauthenticated and may list dropped kinds
        self.index = DigestIndex::from_tree(&self.tree);
        self.open = true;

        info!(
            path = %self.path.display(),
            folders = self.tree.len(),
            "store opened"
        );
        Ok(OpenStatus::Opened)
    }

    fn create(&mut self, password: &SecretString) -> StoreResult<OpenStatus> {
        if !self.options.create_missing {
            return Err(StoreError::FileOpen {
                path: self.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no store file"),
            });
        }
        if self.path.exists() {
            warn!(path = %self.path.display(), "replacing undersized store file");
        }

        self.open = true;
        if let Err(e) = self.sync(password) {
            self.open = false;
            return Err(e);
        }
        info!(path = %self.path.display(), "store created");
        Ok(OpenStatus::Created)
    }

    /// Read only the header and existence index. No password, no decryption;
    /// the store stays closed and only the `*_does_not_exist` queries answer.
    pub fn load_index(&mut self) -> StoreResult<()> {
        if self.open {
            return Err(StoreError::AlreadyOpen);
        }
        self.index.clear();

        let data = std::fs::read(&self.path).map_err(|source| StoreError::FileOpen {
            path: self.path.clone(),
            source,
        })?;
        let mut reader = DataReader::new(&data);
        format::read_header(&mut reader)?;
        self.index = format::decode_index(&mut reader)?;

        debug!(
            path = %self.path.display(),
            folders = self.index.len(),
            "existence index loaded"
        );
        Ok(())
    }

    /// Encrypt the tree under `password` and atomically replace the file.
    ///
    /// `password` need not be the one used to open. A failed write leaves the
    /// previous file untouched.
    pub fn sync(&mut self, password: &SecretString) -> StoreResult<()> {
        self.ensure_open()?;
        if self.tree.len() > MAX_INDEX_FOLDERS as usize {
            return Err(self.write_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "too many folders for the existence index",
            )));
        }

        let tree_bytes = format::encode_tree(&self.tree);
        if u32::try_from(tree_bytes.len()).is_err() {
            return Err(self.write_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "store contents exceed 4 GiB",
            )));
        }
        let mut body = format::seal_body(&tree_bytes, self.random.as_mut())?;
        drop(tree_bytes);

        let key = stretch_password(password.expose_secret().as_bytes());
        let mut chain = CipherBlockChain::new(Blowfish::new());
        chain
            .set_key(key.as_bytes(), key.bits())
            .map_err(sync_key_error)?;
        drop(key);
        chain.encrypt(&mut body)?;

        let mut file = DataWriter::with_capacity(16 + format::index_len(&self.tree) + body.len());
        format::write_header(&mut file);
        format::encode_index(&self.tree, &mut file);
        file.put_raw(&body);
        let bytes = file.into_inner();

        write_atomic(&self.path, &bytes, self.options.file_mode)
            .map_err(|source| self.write_error(source))?;

        debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            folders = self.tree.len(),
            "store synced"
        );
        Ok(())
    }

    /// Re-encrypt under a new password. The tree is unchanged.
    pub fn change_password(&mut self, new_password: &SecretString) -> StoreResult<()> {
        self.sync(new_password)?;
        info!(path = %self.path.display(), "store password changed");
        Ok(())
    }

    /// Discard the decrypted tree, syncing first when a password is given.
    /// If that sync fails the store stays open.
    pub fn close(&mut self, password: Option<&SecretString>) -> StoreResult<()> {
        if let Some(password) = password {
            if self.open {
                self.sync(password)?;
            }
        }
        self.tree.clear();
        self.index.clear();
        if self.open {
            info!(path = %self.path.display(), "store closed");
        }
        self.open = false;
        Ok(())
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(StoreError::NotOpen)
        }
    }

    fn write_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }

    pub fn folder_list(&self) -> Vec<String> {
        self.tree.keys().cloned().collect()
    }

    pub fn has_folder(&self, folder: &str) -> bool {
        self.tree.contains_key(folder)
    }

    /// Keys in `folder`; empty when the folder is absent.
    pub fn entry_list(&self, folder: &str) -> Vec<String> {
        self.tree
            .get(folder)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_entry(&self, folder: &str, key: &str) -> bool {
        self.tree
            .get(folder)
            .is_some_and(|entries| entries.contains_key(key))
    }

    pub fn read_entry(&self, folder: &str, key: &str) -> Option<&Entry> {
        self.tree.get(folder)?.get(key)
    }

    /// Entries in `folder` whose key matches the wildcard `pattern`
    /// (`*`, `?`, `[...]`).
    pub fn read_entry_list(&self, folder: &str, pattern: &str) -> StoreResult<Vec<&Entry>> {
        let pattern = glob::Pattern::new(pattern)?;
        Ok(self
            .tree
            .get(folder)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(key, _)| pattern.matches(key))
                    .map(|(_, entry)| entry)
                    .collect()
            })
            .unwrap_or_default())
    }

    pub fn entry_kind(&self, folder: &str, key: &str) -> Option<EntryKind> {
        self.read_entry(folder, key).map(Entry::kind)
    }

    /// `Ok(false)` when the folder already exists.
    pub fn create_folder(&mut self, folder: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        if self.tree.contains_key(folder) {
            return Ok(false);
        }
        self.tree.insert(folder.to_owned(), Folder::new());
        self.index.insert_folder(folder);
        Ok(true)
    }

    /// Drop `folder` and every entry in it. `Ok(false)` when absent.
    pub fn remove_folder(&mut self, folder: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        if self.tree.remove(folder).is_none() {
            return Ok(false);
        }
        self.index.remove_folder(folder);
        Ok(true)
    }

    /// Insert `entry` into `folder`, creating the folder if needed. An entry
    /// with the same key is overwritten and the key count stays the same.
    pub fn write_entry(&mut self, folder: &str, entry: Entry) -> StoreResult<()> {
        self.ensure_open()?;
        if !self.tree.contains_key(folder) {
            self.tree.insert(folder.to_owned(), Folder::new());
            self.index.insert_folder(folder);
        }
        let Some(entries) = self.tree.get_mut(folder) else {
            return Ok(());
        };
        match entries.get_mut(entry.key()) {
            Some(existing) => *existing = entry,
            None => {
                self.index.insert_entry(folder, entry.key());
                entries.insert(entry.key().to_owned(), entry);
            }
        }
        Ok(())
    }

    /// `Ok(false)` when the folder or key is absent.
    pub fn remove_entry(&mut self, folder: &str, key: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        let removed = self
            .tree
            .get_mut(folder)
            .and_then(|entries| entries.remove(key))
            .is_some();
        if removed {
            self.index.remove_entry(folder, key);
        }
        Ok(removed)
    }

    /// Move `old` to `new` within `folder`. `Ok(false)` when `old` is absent
    /// or `new` is taken.
    pub fn rename_entry(&mut self, folder: &str, old: &str, new: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        let Some(entries) = self.tree.get_mut(folder) else {
            return Ok(false);
        };
        if entries.contains_key(new) {
            return Ok(false);
        }
        let Some(mut entry) = entries.remove(old) else {
            return Ok(false);
        };
        entry.set_key(new);
        entries.insert(new.to_owned(), entry);
        self.index.remove_entry(folder, old);
        self.index.insert_entry(folder, new);
        Ok(true)
    }

    /// Index-only answer; works without the password.
    pub fn folder_does_not_exist(&self, folder: &str) -> bool {
        !self.index.contains_folder(folder)
    }

    /// Index-only answer; works without the password.
    pub fn entry_does_not_exist(&self, folder: &str, key: &str) -> bool {
        !self.index.contains_entry(folder, key)
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> &DigestIndex {
        &self.index
    }
}

impl std::fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStore")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("open", &self.open)
            .field("folders", &self.tree.len())
            .finish_non_exhaustive()
    }
}

/// A key the cipher refuses could never have written the file being opened.
fn open_key_error(_: CipherError) -> StoreError {
    StoreError::IntegrityMismatch
}

fn sync_key_error(e: CipherError) -> StoreError {
    match e {
        CipherError::WeakKey => StoreError::WeakKey,
        other => StoreError::Cipher(other),
    }
}

/// Write `data` to a temp file beside `path`, fsync it, then rename it over
/// `path`. The temp file is removed on any error.
fn write_atomic(path: &Path, data: &[u8], mode: u32) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".hoard-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(data)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    sync_dir(dir);
    Ok(())
}

/// Best effort: persist the rename itself.
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Ok(handle) = std::fs::File::open(dir) {
        let _ = handle.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pw(s: &str) -> SecretString {
        SecretString::from(s)
    }

    fn open_store(dir: &TempDir) -> SecretStore {
        let mut store = SecretStore::new(dir.path().join("test.kwl"), "test");
        assert_eq!(store.open(&pw("pw")).unwrap(), OpenStatus::Created);
        store
    }

    #[test]
    fn test_starts_closed() {
        let store = SecretStore::new("/nonexistent/x.kwl", "x");
        assert!(!store.is_open());
        assert!(store.folder_list().is_empty());
        assert!(store.folder_does_not_exist("anything"));
        assert_eq!(store.name(), "x");
    }

    #[test]
    fn test_mutations_need_open_store() {
        let mut store = SecretStore::new("/nonexistent/x.kwl", "x");
        assert!(matches!(store.create_folder("f"), Err(StoreError::NotOpen)));
        assert!(matches!(
            store.write_entry("f", Entry::new_stream("k", vec![])),
            Err(StoreError::NotOpen)
        ));
        assert!(matches!(store.remove_entry("f", "k"), Err(StoreError::NotOpen)));
        assert!(matches!(store.remove_folder("f"), Err(StoreError::NotOpen)));
        assert!(matches!(
            store.rename_entry("f", "a", "b"),
            Err(StoreError::NotOpen)
        ));
        assert!(matches!(store.sync(&pw("pw")), Err(StoreError::NotOpen)));
    }

    #[test]
    fn test_create_folder_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        assert!(store.create_folder("f").unwrap());
        let index = store.index().clone();
        assert!(!store.create_folder("f").unwrap());
        assert_eq!(store.folder_list(), vec!["f".to_string()]);
        assert_eq!(store.index(), &index);
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        store.write_entry("f", Entry::new_password("k", "one")).unwrap();
        store.write_entry("f", Entry::new_password("k", "two")).unwrap();

        assert_eq!(store.entry_list("f").len(), 1);
        let value = store.read_entry("f", "k").unwrap().password().unwrap();
        assert_eq!(value.expose_secret(), "two");
    }

    #[test]
    fn test_write_creates_folder() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        store.write_entry("new", Entry::new_stream("k", vec![1])).unwrap();
        assert!(store.has_folder("new"));
        assert!(!store.folder_does_not_exist("new"));
        assert!(!store.entry_does_not_exist("new", "k"));
    }

    #[test]
    fn test_index_tracks_tree() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        store.create_folder("a").unwrap();
        store.write_entry("a", Entry::new_stream("x", vec![1])).unwrap();
        store.write_entry("a", Entry::new_stream("y", vec![2])).unwrap();
        store.write_entry("b", Entry::new_stream("z", vec![3])).unwrap();
        assert_eq!(store.index(), &DigestIndex::from_tree(&store.tree));

        assert!(store.rename_entry("a", "x", "w").unwrap());
        assert!(store.remove_entry("a", "y").unwrap());
        assert!(store.remove_folder("b").unwrap());
        assert_eq!(store.index(), &DigestIndex::from_tree(&store.tree));

        // Rewrite then remove leaves no stale digest behind
        store.write_entry("a", Entry::new_stream("w", vec![4])).unwrap();
        store.remove_entry("a", "w").unwrap();
        assert!(store.entry_does_not_exist("a", "w"));
    }

    #[test]
    fn test_rename_rules() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store.write_entry("f", Entry::new_password("a", "1")).unwrap();
        store.write_entry("f", Entry::new_password("b", "2")).unwrap();

        assert!(!store.rename_entry("f", "missing", "c").unwrap());
        assert!(!store.rename_entry("f", "a", "b").unwrap());
        assert!(!store.rename_entry("nofolder", "a", "c").unwrap());

        assert!(store.rename_entry("f", "a", "c").unwrap());
        assert!(!store.has_entry("f", "a"));
        let moved = store.read_entry("f", "c").unwrap();
        assert_eq!(moved.key(), "c");
        assert_eq!(moved.password().unwrap().expose_secret(), "1");
    }

    #[test]
    fn test_missing_removals_return_false() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        assert!(!store.remove_folder("nope").unwrap());
        assert!(!store.remove_entry("nope", "k").unwrap());
        store.create_folder("f").unwrap();
        assert!(!store.remove_entry("f", "k").unwrap());
    }

    #[test]
    fn test_read_entry_list_wildcards() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        for key in ["mail.example", "mail.test", "web.example"] {
            store.write_entry("f", Entry::new_stream(key, vec![])).unwrap();
        }

        let keys = |pattern: &str| -> Vec<String> {
            store
                .read_entry_list("f", pattern)
                .unwrap()
                .iter()
                .map(|e| e.key().to_string())
                .collect()
        };
        assert_eq!(keys("mail.*"), vec!["mail.example", "mail.test"]);
        assert_eq!(keys("*.example"), vec!["mail.example", "web.example"]);
        assert_eq!(keys("web.exampl?"), vec!["web.example"]);
        assert!(keys("nothing*").is_empty());
        assert!(store.read_entry_list("missing", "*").unwrap().is_empty());
        assert!(matches!(
            store.read_entry_list("f", "[unclosed"),
            Err(StoreError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_entry_kind() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store.write_entry("f", Entry::new_map("m", &BTreeMap::new())).unwrap();
        assert_eq!(store.entry_kind("f", "m"), Some(EntryKind::Map));
        assert_eq!(store.entry_kind("f", "x"), None);
    }

    #[test]
    fn test_open_twice() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        assert!(matches!(store.open(&pw("pw")), Err(StoreError::AlreadyOpen)));
        assert!(matches!(store.load_index(), Err(StoreError::AlreadyOpen)));
    }

    #[test]
    fn test_close_discards() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store.write_entry("f", Entry::new_stream("k", vec![1])).unwrap();
        store.close(None).unwrap();

        assert!(!store.is_open());
        assert!(store.folder_list().is_empty());
        assert!(store.folder_does_not_exist("f"));

        // Never synced, so reopening finds only the empty store
        store.open(&pw("pw")).unwrap();
        assert!(!store.has_folder("f"));
    }

    #[test]
    fn test_create_disabled() {
        let dir = TempDir::new().unwrap();
        let mut store = SecretStore::new(dir.path().join("absent.kwl"), "absent").with_options(
            StoreOptions {
                create_missing: false,
                ..StoreOptions::default()
            },
        );
        match store.open(&pw("pw")) {
            Err(StoreError::FileOpen { source, .. }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("expected FileOpen, got {other:?}"),
        }
        assert!(!store.is_open());
        assert!(!dir.path().join("absent.kwl").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_mode_applied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_from_config_uses_dir_and_options() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig {
            dir: dir.path().to_path_buf(),
            extension: "kwl".into(),
            create_missing: false,
            file_mode: 0o640,
            ..StoreConfig::default()
        };

        let mut store = SecretStore::from_config(&config, "work");
        assert_eq!(store.path(), dir.path().join("work.kwl"));
        assert_eq!(store.name(), "work");
        assert_eq!(
            store.options,
            StoreOptions {
                create_missing: false,
                file_mode: 0o640,
            }
        );
        assert!(matches!(
            store.open(&pw("pw")),
            Err(StoreError::FileOpen { .. })
        ));
    }

    #[test]
    fn test_key_error_mapping() {
        assert!(matches!(
            open_key_error(CipherError::WeakKey),
            StoreError::IntegrityMismatch
        ));
        assert!(matches!(
            open_key_error(CipherError::InvalidKeyLength { bits: 8 }),
            StoreError::IntegrityMismatch
        ));
        assert!(matches!(
            sync_key_error(CipherError::WeakKey),
            StoreError::WeakKey
        ));
        assert!(matches!(
            sync_key_error(CipherError::InvalidKeyLength { bits: 8 }),
            StoreError::Cipher(CipherError::InvalidKeyLength { bits: 8 })
        ));
    }

    #[test]
    fn test_debug_hides_contents() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store.write_entry("Secret Folder", Entry::new_password("k", "v")).unwrap();
        let dbg = format!("{store:?}");
        assert!(dbg.contains("folders: 1"));
        assert!(!dbg.contains("Secret Folder"));
    }
}
