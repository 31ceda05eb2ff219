// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Receiver-side chunk reassembly.
//!
//! Chunks are addressed by the (message id, index) carried in their frame
//! header, so arrival order does not matter. Header fields are extracted
//! with explicit bounds checks: truncated or inconsistent frames are
//! errors, never out-of-bounds access.

use std::collections::HashMap;

use crate::chunker::{CHUNK_HEADER_LEN, CHUNK_MAGIC, MAX_CHUNKS};
use crate::errors::DecodeError;

/// What one accepted datagram amounted to.
#[derive(Debug, PartialEq, Eq)]
pub enum Reassembly {
    /// The datagram carried a whole payload, or completed a chunked
    /// message.
    Complete(Vec<u8>),
    /// The datagram was a chunk of a message that is still missing
    /// pieces.
    Pending,
}

/// Regroups chunked datagrams into complete payloads.
///
/// Entries for messages that never complete are retained until the process
/// exits: the protocol defines no eviction, so a lost chunk permanently
/// strands its siblings here. Hosts that care can watch
/// [`ChunkAssembler::pending`].
#[derive(Debug, Default)]
pub struct ChunkAssembler {
    partials: HashMap<[u8; 8], Partial>,
}

#[derive(Debug)]
struct Partial {
    slots: Vec<Option<Vec<u8>>>,
    filled: usize,
}

impl ChunkAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages currently awaiting missing chunks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.partials.len()
    }

    /// Feeds one datagram through reassembly.
    ///
    /// Unframed datagrams pass through whole. Framed datagrams are slotted
    /// by index, tolerating duplicates (last copy wins); the completed
    /// payload is returned once every slot is filled, and the buffer entry
    /// is dropped at that same moment.
    pub fn accept(&mut self, datagram: &[u8]) -> Result<Reassembly, DecodeError> {
        if !datagram.starts_with(&CHUNK_MAGIC) {
            return Ok(Reassembly::Complete(datagram.to_vec()));
        }
        if datagram.len() < CHUNK_HEADER_LEN {
            return Err(DecodeError::TruncatedFrame {
                len: datagram.len(),
            });
        }

        let mut message_id = [0u8; 8];
        message_id.copy_from_slice(&datagram[2..10]);
        let index = datagram[10];
        let count = datagram[11];
        let body = &datagram[CHUNK_HEADER_LEN..];

        if count == 0 || usize::from(count) > MAX_CHUNKS {
            return Err(DecodeError::InvalidChunkCount { count });
        }
        if index >= count {
            return Err(DecodeError::IndexOutOfRange { index, count });
        }

        let partial = self.partials.entry(message_id).or_insert_with(|| Partial {
            slots: vec![None; usize::from(count)],
            filled: 0,
        });

        if partial.slots.len() != usize::from(count) {
            #[allow(clippy::cast_possible_truncation)]
            return Err(DecodeError::CountMismatch {
                got: count,
                expected: partial.slots.len() as u8,
            });
        }

        let slot = &mut partial.slots[usize::from(index)];
        if slot.is_none() {
            partial.filled += 1;
        }
        *slot = Some(body.to_vec());

        if partial.filled < partial.slots.len() {
            return Ok(Reassembly::Pending);
        }

        match self.partials.remove(&message_id) {
            Some(complete) => {
                let payload: Vec<u8> = complete.slots.into_iter().flatten().flatten().collect();
                Ok(Reassembly::Complete(payload))
            }
            // The entry was inserted above; this arm never runs.
            None => Ok(Reassembly::Pending),
        }
    }
}
