//! Gzip framing for bulk email jobs
//!
//! Bulk jobs travel as gzip-compressed UTF-8 JSON. The server only checks the
//! two-byte gzip signature before decompressing; clients use [`gzip_json`] to
//! produce a compatible body.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use tracing::debug;

use crate::error::{PortalError, Result};

/// First two bytes of every gzip member (RFC 1952, ID1/ID2).
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Returns true when `data` starts with the gzip signature.
#[inline]
pub fn is_gzip(data: &[u8]) -> bool {
    data.len() >= GZIP_MAGIC.len() && data[..2] == GZIP_MAGIC
}

/// Gzip-compress raw bytes with the default compression level.
pub fn gzip_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| PortalError::Compression(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| PortalError::Compression(e.to_string()))?;
    debug!("Compressed {} -> {} bytes", data.len(), compressed.len());
    Ok(compressed)
}

/// Serialize `value` as JSON and gzip it.
pub fn gzip_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(value)?;
    gzip_bytes(&json)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use proptest::prelude::*;
    use std::io::Read;

    #[test]
    fn test_is_gzip() {
        assert!(is_gzip(&[0x1f, 0x8b, 0x08]));
        assert!(!is_gzip(&[0x00, 0x8b, 0x08]));
        assert!(!is_gzip(&[0x1f]));
        assert!(!is_gzip(&[]));
    }

    #[test]
    fn test_gzip_json_has_signature() {
        let compressed = gzip_json(&serde_json::json!({ "emails": [] })).unwrap();
        assert!(is_gzip(&compressed));
    }

    proptest! {
        #[test]
        fn gzip_bytes_is_reversible(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let compressed = gzip_bytes(&data).unwrap();
            let mut decoder = GzDecoder::new(compressed.as_slice());
            let mut out = Vec::new();
            decoder.read_to_end(&mut out).unwrap();
            prop_assert_eq!(out, data);
        }
    }
}
