//! hoard-store: password-protected secret store persisted to a single file
//!
//! A store holds named folders of [`Entry`] values. The file carries a
//! plaintext index of MD5 name digests next to the encrypted body, so
//! existence questions can be answered without the password:
//!
//! ```text
//! open(pw)  : header ─▶ index (always) ─▶ stretch(pw) ─▶ CBC decrypt ─▶ SHA-1 check ─▶ tree
//! sync(pw)  : tree ─▶ bytes + random pad + SHA-1 ─▶ stretch(pw) ─▶ CBC encrypt ─▶ temp file ─▶ rename
//! ```

mod codec;
pub mod entry;
pub mod error;
pub mod format;
pub mod index;
pub mod store;

pub use entry::{Entry, EntryKind};
pub use error::{DecodeError, StoreError, StoreResult};
pub use format::{FormatDescriptor, MAGIC, MIN_FILE_SIZE};
pub use index::{name_digest, DigestIndex, NameDigest};
pub use store::{Folder, OpenStatus, SecretStore, StoreOptions, Tree};
