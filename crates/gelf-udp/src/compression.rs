// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Payload compression between serialization and chunking.
//!
//! The scheme is a pure function of configuration, never of content, and
//! there is no fallback path. The receiver does not need to be told which
//! scheme was used: each one is identifiable from its leading bytes (see
//! [`crate::decoder::sniff_compression`]).

use std::io::{Read, Write};
use std::str::FromStr;

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;

use crate::errors::ParseError;

/// Compression applied to the serialized envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompressionKind {
    /// Deflate with a zlib header (leading byte 0x78).
    #[default]
    Zlib,
    /// Deflate with a gzip member header (leading bytes 0x1f 0x8b).
    Gzip,
    /// Payload passed through unchanged.
    None,
}

impl FromStr for CompressionKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zlib" => Ok(CompressionKind::Zlib),
            "gzip" => Ok(CompressionKind::Gzip),
            "none" => Ok(CompressionKind::None),
            other => Err(ParseError::UnknownCompression(other.to_string())),
        }
    }
}

impl CompressionKind {
    /// Compresses a serialized envelope.
    pub fn compress(self, payload: &[u8]) -> std::io::Result<Vec<u8>> {
        match self {
            CompressionKind::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(payload)?;
                encoder.finish()
            }
            CompressionKind::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(payload)?;
                encoder.finish()
            }
            CompressionKind::None => Ok(payload.to_vec()),
        }
    }

    /// Inverse of [`CompressionKind::compress`] for the same scheme.
    pub fn decompress(self, payload: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            CompressionKind::Zlib => {
                ZlibDecoder::new(payload).read_to_end(&mut out)?;
            }
            CompressionKind::Gzip => {
                GzDecoder::new(payload).read_to_end(&mut out)?;
            }
            CompressionKind::None => out.extend_from_slice(payload),
        }
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL_KINDS: [CompressionKind; 3] = [
        CompressionKind::Zlib,
        CompressionKind::Gzip,
        CompressionKind::None,
    ];

    #[test]
    fn test_from_str() {
        assert_eq!(
            "zlib".parse::<CompressionKind>().unwrap(),
            CompressionKind::Zlib
        );
        assert_eq!(
            "gzip".parse::<CompressionKind>().unwrap(),
            CompressionKind::Gzip
        );
        assert_eq!(
            "none".parse::<CompressionKind>().unwrap(),
            CompressionKind::None
        );
        assert!("deflate".parse::<CompressionKind>().is_err());
    }

    #[test]
    fn test_zlib_output_starts_with_zlib_header() {
        let compressed = CompressionKind::Zlib.compress(b"hello").unwrap();
        assert_eq!(compressed[0], 0x78);
        // The second byte depends on the compression level but is one of
        // the defined zlib flag bytes.
        assert!([0x01, 0x9c, 0xda].contains(&compressed[1]));
    }

    #[test]
    fn test_gzip_output_starts_with_gzip_magic() {
        let compressed = CompressionKind::Gzip.compress(b"hello").unwrap();
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_none_passes_bytes_through() {
        let payload = b"{\"version\":\"1.1\"}".to_vec();
        assert_eq!(CompressionKind::None.compress(&payload).unwrap(), payload);
        assert_eq!(
            CompressionKind::None.decompress(&payload).unwrap(),
            payload
        );
    }

    #[test]
    fn test_round_trip_empty_input() {
        for kind in ALL_KINDS {
            let compressed = kind.compress(&[]).unwrap();
            assert_eq!(kind.decompress(&compressed).unwrap(), Vec::<u8>::new());
        }
    }

    #[test]
    fn test_decompress_rejects_garbage() {
        assert!(CompressionKind::Zlib.decompress(b"not zlib").is_err());
        assert!(CompressionKind::Gzip.decompress(b"not gzip").is_err());
    }

    proptest! {
        #[test]
        fn round_trip_arbitrary_bytes(payload in proptest::collection::vec(any::<u8>(), 0..4096)) {
            for kind in ALL_KINDS {
                let compressed = kind.compress(&payload).unwrap();
                prop_assert_eq!(kind.decompress(&compressed).unwrap(), payload.clone());
            }
        }
    }
}
