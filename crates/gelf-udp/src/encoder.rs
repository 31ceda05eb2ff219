// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Sender-side pipeline: one log event in, wire datagrams out.

use bytes::Bytes;

use crate::chunker::{self, MessageIdSource};
use crate::config::EncoderConfig;
use crate::envelope::{GelfMessage, LogEvent};
use crate::errors::EncodeError;

/// Encodes one log event into the datagrams to put on the wire.
///
/// This is the whole sender pipeline: build the envelope, serialize it,
/// apply the configured compression, split the result into UDP-sized
/// units. It holds no state of its own; the configuration is a snapshot
/// and message ids come from the injected source.
pub fn encode_event(
    event: &LogEvent,
    config: &EncoderConfig,
    ids: &mut dyn MessageIdSource,
) -> Result<Vec<Bytes>, EncodeError> {
    let envelope = GelfMessage::build(event, config);
    let serialized = serde_json::to_vec(&envelope)?;
    let compressed = config.compression.compress(&serialized)?;
    chunker::chunk_payload(&compressed, config.chunk_size, ids)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::compression::CompressionKind;
    use crate::envelope::LogLevel;
    use chrono::{TimeZone, Utc};
    use rand::distributions::Alphanumeric;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeMap;

    struct FixedIds;

    impl MessageIdSource for FixedIds {
        fn next_id(&mut self) -> [u8; 8] {
            [0xab; 8]
        }
    }

    fn test_event(message: String) -> LogEvent {
        LogEvent {
            level: LogLevel::Info,
            message,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 45).unwrap(),
            fields: BTreeMap::new(),
        }
    }

    fn random_message(len: usize) -> String {
        rand::rngs::StdRng::seed_from_u64(42)
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }

    #[test]
    fn test_small_event_fits_one_datagram() {
        let config = EncoderConfig {
            app_host: "svc".to_string(),
            compression: CompressionKind::Zlib,
            ..EncoderConfig::default()
        };

        let datagrams = encode_event(&test_event("hello".to_string()), &config, &mut FixedIds)
            .unwrap();

        assert_eq!(datagrams.len(), 1);
        // zlib payload, no chunk frame.
        assert_eq!(datagrams[0][0], 0x78);
    }

    #[test]
    fn test_large_event_is_chunked_at_default_chunk_size() {
        // Alphanumeric noise does not compress below the datagram budget,
        // so even the default chunk size has to split it.
        let config = EncoderConfig {
            app_host: "svc".to_string(),
            compression: CompressionKind::None,
            ..EncoderConfig::default()
        };

        let datagrams =
            encode_event(&test_event(random_message(4000)), &config, &mut FixedIds).unwrap();

        assert!(datagrams.len() > 1);
        for datagram in &datagrams {
            assert_eq!(&datagram[..2], &[0x1e, 0x0f]);
        }
    }

    #[test]
    fn test_uncompressed_single_datagram_is_plain_json() {
        let config = EncoderConfig {
            app_host: "svc".to_string(),
            compression: CompressionKind::None,
            ..EncoderConfig::default()
        };

        let datagrams = encode_event(&test_event("hello".to_string()), &config, &mut FixedIds)
            .unwrap();

        assert_eq!(datagrams.len(), 1);
        let value: serde_json::Value = serde_json::from_slice(&datagrams[0]).unwrap();
        assert_eq!(value["short_message"], "hello");
    }

    #[test]
    fn test_oversize_event_produces_no_datagrams() {
        let config = EncoderConfig {
            app_host: "svc".to_string(),
            compression: CompressionKind::None,
            chunk_size: 112,
            ..EncoderConfig::default()
        };

        let err = encode_event(&test_event(random_message(20_000)), &config, &mut FixedIds)
            .unwrap_err();

        assert!(matches!(err, EncodeError::PayloadTooLarge { max: 12800, .. }));
    }
}
