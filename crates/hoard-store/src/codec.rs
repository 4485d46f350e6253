//! Big-endian primitives in Qt's `QDataStream` layout.
//!
//! ```text
//! u32 / i32   4 bytes, big-endian
//! QByteArray  u32 length | bytes        (0xFFFFFFFF = null, read as empty)
//! QString     u32 byte length | UTF-16BE (0xFFFFFFFF = null, read as empty)
//! ```

use zeroize::Zeroize;

use crate::error::DecodeError;

const NULL_LEN: u32 = 0xFFFF_FFFF;

/// Encoded size of `s` as a QString.
pub(crate) fn string_len(s: &str) -> usize {
    4 + 2 * s.encode_utf16().count()
}

/// Encoded size of `bytes` as a QByteArray.
pub(crate) fn bytes_len(bytes: &[u8]) -> usize {
    4 + bytes.len()
}

pub(crate) struct DataWriter {
    buf: Vec<u8>,
}

impl DataWriter {
    /// Callers holding secrets size the buffer up front so it never reallocates
    /// and leaves stale copies behind.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub(crate) fn put_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub(crate) fn put_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) {
        self.put_u32(bytes.len() as u32);
        self.put_raw(bytes);
    }

    pub(crate) fn put_string(&mut self, s: &str) {
        let units = s.encode_utf16().count();
        self.put_u32((units * 2) as u32);
        for unit in s.encode_utf16() {
            self.buf.extend_from_slice(&unit.to_be_bytes());
        }
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

pub(crate) struct DataReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DataReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Everything not yet consumed.
    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub(crate) fn raw(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::UnexpectedEnd {
                needed: n,
                available: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.raw(N)?);
        Ok(out)
    }

    pub(crate) fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub(crate) fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    pub(crate) fn bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        match self.u32()? {
            NULL_LEN => Ok(Vec::new()),
            len => Ok(self.raw(len as usize)?.to_vec()),
        }
    }

    pub(crate) fn string(&mut self) -> Result<String, DecodeError> {
        let len = match self.u32()? {
            NULL_LEN => return Ok(String::new()),
            len if len % 2 != 0 => return Err(DecodeError::OddStringLength(len)),
            len => len,
        };
        let raw = self.raw(len as usize)?;
        let mut units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        let decoded = String::from_utf16(&units).map_err(|_| DecodeError::InvalidUtf16);
        units.zeroize();
        decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_layout() {
        let mut w = DataWriter::with_capacity(16);
        w.put_string("ab");
        assert_eq!(w.into_inner(), vec![0, 0, 0, 4, 0, b'a', 0, b'b']);
    }

    #[test]
    fn test_non_bmp_string_uses_surrogates() {
        let s = "key\u{1F511}";
        let mut w = DataWriter::with_capacity(string_len(s));
        w.put_string(s);
        assert_eq!(w.len(), string_len(s));
        assert_eq!(w.len(), 4 + 2 * 5);

        let bytes = w.into_inner();
        assert_eq!(DataReader::new(&bytes).string().unwrap(), s);
    }

    #[test]
    fn test_null_markers_read_as_empty() {
        let null = [0xffu8, 0xff, 0xff, 0xff];
        assert_eq!(DataReader::new(&null).string().unwrap(), "");
        assert!(DataReader::new(&null).bytes().unwrap().is_empty());
    }

    #[test]
    fn test_bytes_layout() {
        let mut w = DataWriter::with_capacity(bytes_len(b"xyz"));
        w.put_bytes(b"xyz");
        assert_eq!(w.into_inner(), vec![0, 0, 0, 3, b'x', b'y', b'z']);
    }

    #[test]
    fn test_negative_i32() {
        let mut w = DataWriter::with_capacity(4);
        w.put_i32(-2);
        let bytes = w.into_inner();
        assert_eq!(bytes, vec![0xff, 0xff, 0xff, 0xfe]);
        assert_eq!(DataReader::new(&bytes).i32().unwrap(), -2);
    }

    #[test]
    fn test_truncated_reads() {
        let mut r = DataReader::new(&[0, 0, 0, 9, 1, 2]);
        assert_eq!(
            r.bytes(),
            Err(DecodeError::UnexpectedEnd {
                needed: 9,
                available: 2
            })
        );
        assert_eq!(
            DataReader::new(&[0, 0]).u32(),
            Err(DecodeError::UnexpectedEnd {
                needed: 4,
                available: 2
            })
        );
    }

    #[test]
    fn test_odd_string_length() {
        let data = [0, 0, 0, 3, 0, b'a', 0];
        assert_eq!(
            DataReader::new(&data).string(),
            Err(DecodeError::OddStringLength(3))
        );
    }

    #[test]
    fn test_lone_surrogate_rejected() {
        let data = [0, 0, 0, 2, 0xd8, 0x00];
        assert_eq!(
            DataReader::new(&data).string(),
            Err(DecodeError::InvalidUtf16)
        );
    }

    #[test]
    fn test_rest_and_remaining() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let mut r = DataReader::new(&data);
        r.raw(2).unwrap();
        assert_eq!(r.remaining(), 4);
        assert_eq!(r.rest(), &[3, 4, 5, 6]);
        assert!(!r.is_empty());
        r.raw(4).unwrap();
        assert!(r.is_empty());
    }
}
