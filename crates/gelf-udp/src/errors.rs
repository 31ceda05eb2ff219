// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while interpreting externally supplied values.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unrecognized log level: {0}")]
    UnknownLevel(String),

    #[error("unrecognized compression mode: {0}")]
    UnknownCompression(String),
}

/// Errors raised while turning a log event into wire datagrams.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to serialize envelope: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("compression failed: {0}")]
    Compress(#[from] std::io::Error),

    #[error("chunk size {chunk_size} cannot fit the 12-byte chunk header")]
    ChunkSizeTooSmall { chunk_size: usize },

    #[error("payload of {size} bytes exceeds the {max} byte chunking ceiling")]
    PayloadTooLarge { size: usize, max: usize },
}

/// Errors raised while decoding datagrams back into records.
///
/// All of these are recoverable: datagrams come off an open network, so a
/// malformed one is logged and discarded rather than taking the receiver
/// down.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("chunk frame truncated: {len} bytes is shorter than the 12-byte header")]
    TruncatedFrame { len: usize },

    #[error("chunk count {count} is outside 1..=128")]
    InvalidChunkCount { count: u8 },

    #[error("chunk index {index} is out of range for count {count}")]
    IndexOutOfRange { index: u8, count: u8 },

    #[error("chunk count {got} disagrees with count {expected} of an in-flight message")]
    CountMismatch { got: u8, expected: u8 },

    #[error("decompression failed: {0}")]
    Decompress(#[from] std::io::Error),

    #[error("payload is not a valid GELF document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when constructing sockets or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum CreationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to acquire UDP socket: {0}")]
    Socket(#[from] std::io::Error),
}

/// Sender-side shipping failures.
#[derive(Debug, thiserror::Error)]
pub enum ShipError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("failed to send datagram: {0}")]
    Send(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = EncodeError::PayloadTooLarge {
            size: 12810,
            max: 12800,
        };
        assert_eq!(
            error.to_string(),
            "payload of 12810 bytes exceeds the 12800 byte chunking ceiling"
        );

        let error = DecodeError::IndexOutOfRange {
            index: 5,
            count: 3,
        };
        assert_eq!(
            error.to_string(),
            "chunk index 5 is out of range for count 3"
        );

        let error = ParseError::UnknownLevel("fatal".to_string());
        assert_eq!(error.to_string(), "unrecognized log level: fatal");
    }

    #[test]
    fn test_error_debug() {
        let error = DecodeError::TruncatedFrame { len: 4 };
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("TruncatedFrame"));
    }

    #[test]
    fn test_creation_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use");
        let error = CreationError::from(io_error);
        assert!(error.to_string().starts_with("failed to acquire UDP socket"));
    }
}
