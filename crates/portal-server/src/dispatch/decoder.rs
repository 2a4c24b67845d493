//! Request body decoding for bulk jobs
//!
//! A bulk job arrives as a raw byte stream holding gzip-compressed UTF-8
//! JSON. Decoding is all-or-nothing: chunks are buffered until the stream
//! ends, then the whole buffer is checked, decompressed and parsed. Nothing
//! downstream ever sees a partial payload.
//!
//! # Examples
//!
//! ```rust,ignore
//! use portal_server::dispatch::decoder::{decode_stream, DecodeLimits};
//!
//! let body = axum::body::Body::from(compressed);
//! let value = decode_stream(body.into_data_stream(), DecodeLimits::default()).await?;
//! ```

use std::fmt::Display;
use std::io::Read;

use bytes::Bytes;
use flate2::read::GzDecoder;
use futures::{Stream, StreamExt};
pub use portal_common::compression::is_gzip;
use tracing::debug;

use super::error::IngestError;
use crate::config::{DispatchConfig, DEFAULT_MAX_DECOMPRESSED_BYTES, DEFAULT_MAX_PAYLOAD_BYTES};

/// Size bounds applied while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Largest accepted compressed body
    pub max_payload_bytes: usize,
    /// Largest accepted decompressed document
    pub max_decompressed_bytes: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
        }
    }
}

impl From<&DispatchConfig> for DecodeLimits {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            max_payload_bytes: config.max_payload_bytes,
            max_decompressed_bytes: config.max_decompressed_bytes,
        }
    }
}

/// Drain `stream` into one buffer.
///
/// Chunks are only joined after the stream reports its end. A stream error
/// or an oversized body aborts collection.
pub async fn collect_stream<S, E>(stream: S, max_bytes: usize) -> Result<Vec<u8>, IngestError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    futures::pin_mut!(stream);

    let mut chunks: Vec<Bytes> = Vec::new();
    let mut total = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| IngestError::Stream(e.to_string()))?;
        total = total.saturating_add(chunk.len());
        if total > max_bytes {
            return Err(IngestError::PayloadTooLarge { limit: max_bytes });
        }
        chunks.push(chunk);
    }

    debug!(chunks = chunks.len(), bytes = total, "Request body received");
    Ok(chunks.concat())
}

/// Decompress a complete gzip buffer, refusing output beyond `limit` bytes.
pub fn decompress_gzip(data: &[u8], limit: usize) -> Result<Vec<u8>, IngestError> {
    let decoder = GzDecoder::new(data);
    let mut decompressed = Vec::new();
    // One extra byte tells "exactly at the limit" apart from "over it".
    decoder
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut decompressed)
        .map_err(|e| IngestError::DecompressionFailed(e.to_string()))?;

    if decompressed.len() > limit {
        return Err(IngestError::PayloadTooLarge { limit });
    }

    debug!("Decompressed {} -> {} bytes", data.len(), decompressed.len());
    Ok(decompressed)
}

/// Check, decompress and parse an already buffered body.
pub async fn decode_bytes(
    buffer: Vec<u8>,
    limits: DecodeLimits,
) -> Result<serde_json::Value, IngestError> {
    if !is_gzip(&buffer) {
        return Err(IngestError::NotCompressed);
    }

    let limit = limits.max_decompressed_bytes;
    let decompressed = tokio::task::spawn_blocking(move || decompress_gzip(&buffer, limit))
        .await
        .map_err(|e| IngestError::DecompressionFailed(format!("decompression task failed: {}", e)))??;

    let text = std::str::from_utf8(&decompressed)
        .map_err(|e| IngestError::MalformedPayload(format!("invalid UTF-8: {}", e)))?;

    serde_json::from_str(text).map_err(|e| IngestError::MalformedPayload(e.to_string()))
}

/// Decode a bulk job body from its chunk stream.
pub async fn decode_stream<S, E>(
    stream: S,
    limits: DecodeLimits,
) -> Result<serde_json::Value, IngestError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let buffer = collect_stream(stream, limits.max_payload_bytes).await?;
    decode_bytes(buffer, limits).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use futures::stream;
    use portal_common::compression::{gzip_bytes, gzip_json};
    use proptest::prelude::*;
    use serde_json::json;

    fn chunked(data: Vec<u8>, size: usize) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
        let chunks: Vec<_> = data
            .chunks(size.max(1))
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        stream::iter(chunks)
    }

    #[tokio::test]
    async fn test_decode_chunked_payload() {
        let doc = json!({ "emails": [{ "to": "a@b.co", "subject": "Hola" }] });
        let compressed = gzip_json(&doc).unwrap();

        let value = decode_stream(chunked(compressed, 3), DecodeLimits::default())
            .await
            .unwrap();
        assert_eq!(value, doc);
    }

    #[tokio::test]
    async fn test_rejects_uncompressed() {
        let body = br#"{"emails":[]}"#.to_vec();
        let err = decode_stream(chunked(body, 4), DecodeLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::NotCompressed));
    }

    #[tokio::test]
    async fn test_rejects_empty_body() {
        let err = decode_stream(chunked(Vec::new(), 1), DecodeLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::NotCompressed));
    }

    #[tokio::test]
    async fn test_rejects_corrupt_gzip() {
        // Valid gzip header followed by a deflate block with a reserved type.
        let mut compressed = gzip_json(&json!({ "emails": [] })).unwrap();
        compressed.truncate(10);
        compressed.extend_from_slice(&[0xff; 16]);
        let err = decode_bytes(compressed, DecodeLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::DecompressionFailed(_)));
    }

    #[tokio::test]
    async fn test_rejects_malformed_json() {
        let compressed = gzip_bytes(b"{\"emails\": [").unwrap();
        let err = decode_bytes(compressed, DecodeLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_rejects_invalid_utf8() {
        let compressed = gzip_bytes(&[0xff, 0xfe, 0xfd]).unwrap();
        let err = decode_bytes(compressed, DecodeLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_stream_error_aborts() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(&[0x1f, 0x8b])),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let err = decode_stream(stream::iter(chunks), DecodeLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Stream(_)));
    }

    #[tokio::test]
    async fn test_enforces_payload_limits() {
        let compressed = gzip_bytes(&vec![b' '; 4096]).unwrap();

        let limits = DecodeLimits {
            max_payload_bytes: 8,
            max_decompressed_bytes: 1 << 20,
        };
        let err = decode_stream(chunked(compressed.clone(), 4), limits)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::PayloadTooLarge { limit: 8 }));

        let limits = DecodeLimits {
            max_payload_bytes: 1 << 20,
            max_decompressed_bytes: 1024,
        };
        let err = decode_stream(chunked(compressed, 64), limits)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::PayloadTooLarge { limit: 1024 }));
    }

    #[test]
    fn test_decompress_at_exact_limit() {
        let data = vec![b'x'; 100];
        let compressed = gzip_bytes(&data).unwrap();
        assert_eq!(decompress_gzip(&compressed, 100).unwrap(), data);
        assert!(decompress_gzip(&compressed, 99).is_err());
    }

    #[test]
    fn test_decompress_with_unbounded_limit() {
        let data = vec![b'x'; 100];
        let compressed = gzip_bytes(&data).unwrap();
        assert_eq!(decompress_gzip(&compressed, usize::MAX).unwrap(), data);
    }

    proptest! {
        #[test]
        fn non_gzip_prefix_is_rejected(
            first in any::<u8>().prop_filter("not gzip id1", |b| *b != 0x1f),
            rest in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let mut body = vec![first];
            body.extend(rest);
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let result = rt.block_on(decode_bytes(body, DecodeLimits::default()));
            prop_assert!(matches!(result, Err(IngestError::NotCompressed)));
        }

        #[test]
        fn chunking_does_not_change_result(chunk in 1usize..64, n in 0usize..20) {
            let doc = json!({
                "emails": (0..n).map(|i| json!({ "to": format!("m{}@example.com", i), "subject": "s" })).collect::<Vec<_>>()
            });
            let compressed = gzip_json(&doc).unwrap();
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let value = rt.block_on(decode_stream(chunked(compressed, chunk), DecodeLimits::default())).unwrap();
            prop_assert_eq!(value, doc);
        }
    }
}
