//! Secure random bytes for body padding.
//!
//! Source order: the OS CSPRNG (`getrandom` via [`OsRng`]), then
//! `/dev/urandom`, then `/dev/random`. There is no non-cryptographic fallback:
//! when every source fails the caller gets [`CipherError::RandomUnavailable`].

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::warn;

use crate::error::{CipherError, CipherResult};

/// Fills buffers with cryptographically secure bytes.
pub trait RandomSource {
    fn fill(&mut self, buf: &mut [u8]) -> CipherResult<()>;
}

/// The platform source chain described in the module docs.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

#[cfg(unix)]
const DEVICE_FALLBACKS: &[&str] = &["/dev/urandom", "/dev/random"];
#[cfg(not(unix))]
const DEVICE_FALLBACKS: &[&str] = &[];

impl RandomSource for OsRandom {
    fn fill(&mut self, buf: &mut [u8]) -> CipherResult<()> {
        match OsRng.try_fill_bytes(buf) {
            Ok(()) => return Ok(()),
            Err(e) => warn!(error = %e, "OS random source failed, trying device files"),
        }

        for device in DEVICE_FALLBACKS {
            match read_device(device, buf) {
                Ok(()) => return Ok(()),
                Err(e) => warn!(device, error = %e, "random device unavailable"),
            }
        }

        Err(CipherError::RandomUnavailable)
    }
}

fn read_device(path: &str, buf: &mut [u8]) -> std::io::Result<()> {
    use std::io::Read;

    std::fs::File::open(path)?.read_exact(buf)
}
