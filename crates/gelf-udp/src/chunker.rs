// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Splitting oversized payloads into chunked datagrams.
//!
//! UDP caps how much fits in one datagram, so payloads beyond the
//! configured chunk size are split into parts, each framed with a 12-byte
//! header carrying a shared random message id, the part index, and the
//! total count. The count field is a single byte with a protocol ceiling
//! of 128 chunks; payloads that cannot fit are dropped by the caller.

use bytes::{BufMut, Bytes, BytesMut};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::errors::EncodeError;

/// Leading bytes identifying a chunked GELF datagram.
pub const CHUNK_MAGIC: [u8; 2] = [0x1e, 0x0f];

/// Frame header layout: magic (2) + message id (8) + index (1) + count (1).
pub const CHUNK_HEADER_LEN: usize = 12;

/// Hard ceiling on chunks per message; the count field is one byte and the
/// protocol defines 128 as the maximum.
pub const MAX_CHUNKS: usize = 128;

/// Default datagram payload budget. Conservative enough to clear common
/// path MTUs without IP fragmentation.
pub const DEFAULT_CHUNK_SIZE: usize = 1452;

/// Source of fresh 8-byte message ids for chunked messages.
///
/// Injected rather than global so tests can pin ids. Production code uses
/// [`OsRandomIds`]: ids must not collide across concurrently in-flight
/// messages, and the population is small enough that a weak generator
/// would be a real risk.
pub trait MessageIdSource {
    fn next_id(&mut self) -> [u8; 8];
}

/// Message ids drawn from the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandomIds;

impl MessageIdSource for OsRandomIds {
    fn next_id(&mut self) -> [u8; 8] {
        let mut id = [0u8; 8];
        OsRng.fill_bytes(&mut id);
        id
    }
}

/// Splits one payload into wire datagrams.
///
/// A payload within `chunk_size` goes out as a single unframed datagram,
/// byte-identical to the payload; small messages stay indistinguishable
/// from non-chunked traffic. Larger payloads are cut into
/// `chunk_size - 12` byte parts (last part may be shorter) under one fresh
/// message id. A payload beyond `(chunk_size - 12) * 128` cannot be
/// represented in the count byte and is rejected with its byte size so the
/// caller can emit a diagnostic.
pub fn chunk_payload(
    payload: &[u8],
    chunk_size: usize,
    ids: &mut dyn MessageIdSource,
) -> Result<Vec<Bytes>, EncodeError> {
    let part_size = match chunk_size.checked_sub(CHUNK_HEADER_LEN) {
        Some(part_size) if part_size > 0 => part_size,
        _ => return Err(EncodeError::ChunkSizeTooSmall { chunk_size }),
    };
    let max_message_size = part_size * MAX_CHUNKS;

    if payload.len() > max_message_size {
        return Err(EncodeError::PayloadTooLarge {
            size: payload.len(),
            max: max_message_size,
        });
    }
    if payload.len() <= chunk_size {
        return Ok(vec![Bytes::copy_from_slice(payload)]);
    }

    let message_id = ids.next_id();
    let count = payload.len().div_ceil(part_size);

    let chunks = payload
        .chunks(part_size)
        .enumerate()
        .map(|(index, part)| {
            let mut framed = BytesMut::with_capacity(CHUNK_HEADER_LEN + part.len());
            framed.put_slice(&CHUNK_MAGIC);
            framed.put_slice(&message_id);
            #[allow(clippy::cast_possible_truncation)]
            framed.put_u8(index as u8);
            #[allow(clippy::cast_possible_truncation)]
            framed.put_u8(count as u8);
            framed.put_slice(part);
            framed.freeze()
        })
        .collect();
    Ok(chunks)
}
