// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Receiver-side payload decoding.
//!
//! A complete payload is either plain JSON text or a zlib/gzip stream of
//! it. Which one is decided by magic bytes alone; the wire carries no
//! other marker.

use crate::compression::CompressionKind;
use crate::envelope::GelfMessage;
use crate::errors::DecodeError;

// zlib streams open with CMF 0x78 (deflate, 32K window); gzip members open
// with the fixed two-byte 0x1f 0x8b header.
const ZLIB_MAGIC: u8 = 0x78;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Detects the compression scheme from the leading bytes of a payload.
#[must_use]
pub fn sniff_compression(payload: &[u8]) -> CompressionKind {
    if payload.starts_with(&GZIP_MAGIC) {
        CompressionKind::Gzip
    } else if payload.first() == Some(&ZLIB_MAGIC) {
        CompressionKind::Zlib
    } else {
        CompressionKind::None
    }
}

/// Decodes a complete payload into a GELF document.
///
/// Decompression and JSON parse failures are both recoverable decode
/// errors: datagrams come off an open network and a bad one must not take
/// the receiver down.
pub fn decode_payload(payload: &[u8]) -> Result<GelfMessage, DecodeError> {
    let plain = sniff_compression(payload).decompress(payload)?;
    Ok(serde_json::from_slice(&plain)?)
}
