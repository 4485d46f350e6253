//! Named secret values and their kinds.

use std::collections::BTreeMap;

use secrecy::SecretString;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec::{self, DataReader, DataWriter};
use crate::error::DecodeError;

/// On-disk tag for an entry's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Unknown,
    /// Value is a single encoded string.
    Password,
    /// Value is opaque bytes.
    Stream,
    /// Value is an encoded string-to-string map.
    Map,
}

impl EntryKind {
    pub fn code(self) -> i32 {
        match self {
            EntryKind::Unknown => 0,
            EntryKind::Password => 1,
            EntryKind::Stream => 2,
            EntryKind::Map => 3,
        }
    }

    /// `None` for codes this format does not define.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(EntryKind::Unknown),
            1 => Some(EntryKind::Password),
            2 => Some(EntryKind::Stream),
            3 => Some(EntryKind::Map),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Unknown => "unknown",
            EntryKind::Password => "password",
            EntryKind::Stream => "stream",
            EntryKind::Map => "map",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key, a kind and an opaque value. Key and value are zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Entry {
    key: String,
    value: Vec<u8>,
    #[zeroize(skip)]
    kind: EntryKind,
}

impl Entry {
    pub fn new(key: impl Into<String>, kind: EntryKind, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value,
            kind,
        }
    }

    pub fn new_password(key: impl Into<String>, password: &str) -> Self {
        let mut entry = Self::new(key, EntryKind::Password, Vec::new());
        entry.set_password(password);
        entry
    }

    pub fn new_stream(key: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(key, EntryKind::Stream, bytes)
    }

    pub fn new_map(key: impl Into<String>, map: &BTreeMap<String, String>) -> Self {
        let mut entry = Self::new(key, EntryKind::Map, Vec::new());
        entry.set_map(map);
        entry
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub(crate) fn set_key(&mut self, key: &str) {
        self.key.zeroize();
        self.key.push_str(key);
    }

    /// Replace the value; the previous bytes are scrubbed.
    pub fn set_value(&mut self, value: Vec<u8>) {
        self.value.zeroize();
        self.value = value;
    }

    pub fn set_password(&mut self, password: &str) {
        let mut w = DataWriter::with_capacity(codec::string_len(password));
        w.put_string(password);
        self.set_value(w.into_inner());
        self.kind = EntryKind::Password;
    }

    /// Decode the value as a password string, whatever the entry's kind.
    pub fn password(&self) -> Result<SecretString, DecodeError> {
        DataReader::new(&self.value)
            .string()
            .map(SecretString::from)
    }

    /// Encoded as a `u32` count followed by key/value string pairs. Pairs are
    /// written in descending key order, matching the ordered-map stream layout.
    pub fn set_map(&mut self, map: &BTreeMap<String, String>) {
        let len = 4 + map
            .iter()
            .map(|(k, v)| codec::string_len(k) + codec::string_len(v))
            .sum::<usize>();
        let mut w = DataWriter::with_capacity(len);
        w.put_u32(map.len() as u32);
        for (k, v) in map.iter().rev() {
            w.put_string(k);
            w.put_string(v);
        }
        self.set_value(w.into_inner());
        self.kind = EntryKind::Map;
    }

    /// Decode the value as a string map. A missing count reads as an empty map.
    pub fn map(&self) -> Result<BTreeMap<String, String>, DecodeError> {
        let mut map = BTreeMap::new();
        if self.value.is_empty() {
            return Ok(map);
        }
        let mut r = DataReader::new(&self.value);
        let count = r.u32()?;
        for _ in 0..count {
            let k = r.string()?;
            let v = r.string()?;
            map.insert(k, v);
        }
        Ok(map)
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("value", &format_args!("[REDACTED; {} bytes]", self.value.len()))
            .finish()
    }
}
