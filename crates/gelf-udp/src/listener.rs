// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! GELF UDP listener.
//!
//! Receives datagrams, runs them through chunk reassembly and payload
//! decoding, and forwards decoded records to the record service. One
//! logical reader owns the assembler, so no two datagrams ever mutate the
//! same reassembly entry concurrently.

use std::collections::VecDeque;
use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::{debug, error, trace};

use crate::assembler::{ChunkAssembler, Reassembly};
use crate::decoder;
use crate::errors::CreationError;
use crate::record_service::RecordHandle;

// Receive buffer size. Matches the largest chunk size seen in the wild for
// GELF traffic; a datagram bigger than this is truncated by the socket.
const BUFFER_SIZE: usize = 8192;

/// Configuration for the GELF listener.
pub struct ListenerConfig {
    /// Host to bind the UDP socket to (e.g. "0.0.0.0").
    pub host: String,
    /// Port to bind to (GELF convention is 12201).
    pub port: u16,
}

// BufferReader abstracts the datagram source so tests can replay fixed
// input without a socket.
enum BufferReader {
    UdpSocket(UdpSocket),

    /// Mirror reader for testing - replays queued datagrams
    #[allow(dead_code)]
    MirrorTest(tokio::sync::Mutex<VecDeque<Vec<u8>>>, SocketAddr),
}

impl BufferReader {
    async fn read(&self) -> std::io::Result<(Vec<u8>, SocketAddr)> {
        match self {
            BufferReader::UdpSocket(socket) => {
                // UDP socket: blocks until a packet arrives
                let mut buf = [0; BUFFER_SIZE];
                let (amt, src) = socket.recv_from(&mut buf).await?;
                Ok((buf[..amt].to_vec(), src))
            }
            BufferReader::MirrorTest(queue, addr) => {
                let datagram = queue.lock().await.pop_front().unwrap_or_default();
                Ok((datagram, *addr))
            }
        }
    }
}

/// GELF UDP server: receive, reassemble, decode, forward records.
pub struct GelfListener {
    cancel_token: tokio_util::sync::CancellationToken,
    record_handle: RecordHandle,
    buffer_reader: BufferReader,
    assembler: ChunkAssembler,
}

impl GelfListener {
    /// Binds the UDP socket and prepares the receive loop.
    ///
    /// Decoded records are forwarded through `record_handle`. Binding
    /// failure is fatal: the listener cannot operate without a bound
    /// socket.
    pub async fn new(
        config: &ListenerConfig,
        record_handle: RecordHandle,
        cancel_token: tokio_util::sync::CancellationToken,
    ) -> Result<GelfListener, CreationError> {
        let addr = format!("{}:{}", config.host, config.port);
        let socket = UdpSocket::bind(addr).await?;

        Ok(GelfListener {
            cancel_token,
            record_handle,
            buffer_reader: BufferReader::UdpSocket(socket),
            assembler: ChunkAssembler::new(),
        })
    }

    /// Main event loop that continuously receives and processes datagrams.
    pub async fn spin(mut self) {
        let mut spin_cancelled = false;
        while !spin_cancelled {
            self.consume_datagram().await;
            spin_cancelled = self.cancel_token.is_cancelled();
        }
    }

    /// Receives one datagram and runs it through reassembly and decoding.
    async fn consume_datagram(&mut self) {
        let (datagram, src) = match self.buffer_reader.read().await {
            Ok(read) => read,
            Err(e) => {
                error!("Failed to read from UDP socket: {e}");
                return;
            }
        };
        trace!("Received {} byte datagram from {}", datagram.len(), src);

        let payload = match self.assembler.accept(&datagram) {
            Ok(Reassembly::Complete(payload)) => payload,
            Ok(Reassembly::Pending) => {
                trace!(
                    "Buffered chunk from {}; {} message(s) awaiting completion",
                    src,
                    self.assembler.pending()
                );
                return;
            }
            Err(e) => {
                // Malformed frames come off the open network; drop the
                // datagram and keep serving.
                debug!("Discarding malformed datagram from {}: {}", src, e);
                return;
            }
        };

        match decoder::decode_payload(&payload) {
            Ok(record) => {
                if let Err(e) = self.record_handle.insert(record) {
                    error!("Failed to send record to record service: {e}");
                }
            }
            Err(e) => {
                error!("Failed to decode payload from {}: {}", src, e);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::chunker::{chunk_payload, MessageIdSource};
    use crate::compression::CompressionKind;
    use crate::envelope::GelfMessage;
    use crate::record_service::RecordService;
    use std::net::{IpAddr, Ipv4Addr};
    use tracing_test::traced_test;

    struct FixedIds;

    impl MessageIdSource for FixedIds {
        fn next_id(&mut self) -> [u8; 8] {
            [0xc4; 8]
        }
    }

    const DOCUMENT: &str = r#"{"version":"1.1","host":"svc","short_message":"hello","timestamp":1715949045.0,"level":7}"#;

    async fn setup_and_consume(datagrams: Vec<Vec<u8>>) -> Vec<GelfMessage> {
        let (service, handle) = RecordService::new();
        let service_task = tokio::spawn(service.run());

        let count = datagrams.len();
        let mut listener = GelfListener {
            cancel_token: tokio_util::sync::CancellationToken::new(),
            record_handle: handle.clone(),
            buffer_reader: BufferReader::MirrorTest(
                tokio::sync::Mutex::new(datagrams.into()),
                SocketAddr::new(IpAddr::V4(Ipv4Addr::new(111, 112, 113, 114)), 0),
            ),
            assembler: ChunkAssembler::new(),
        };
        for _ in 0..count {
            listener.consume_datagram().await;
        }

        let records = handle.flush().await.expect("Failed to flush");

        handle.shutdown().expect("Failed to shutdown");
        service_task.await.expect("Service task failed");

        records
    }

    #[tokio::test]
    async fn test_listener_decodes_plain_datagram() {
        let records = setup_and_consume(vec![DOCUMENT.as_bytes().to_vec()]).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].short_message, "hello");
        assert_eq!(records[0].level, 7);
    }

    #[tokio::test]
    async fn test_listener_decodes_compressed_datagram() {
        let compressed = CompressionKind::Gzip.compress(DOCUMENT.as_bytes()).unwrap();
        let records = setup_and_consume(vec![compressed]).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].host, "svc");
    }

    #[tokio::test]
    async fn test_listener_reassembles_chunks_out_of_order() {
        let payload = CompressionKind::None
            .compress(format!("{{\"version\":\"1.1\",\"host\":\"svc\",\"short_message\":\"{}\",\"timestamp\":1.0,\"level\":6}}", "y".repeat(1000)).as_bytes())
            .unwrap();
        let mut chunks: Vec<Vec<u8>> = chunk_payload(&payload, 256, &mut FixedIds)
            .unwrap()
            .into_iter()
            .map(|b| b.to_vec())
            .collect();
        assert!(chunks.len() > 1);
        chunks.reverse();

        let records = setup_and_consume(chunks).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].short_message, "y".repeat(1000));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_listener_discards_malformed_and_keeps_serving() {
        let truncated_frame = vec![0x1e, 0x0f, 1, 2, 3];
        let records = setup_and_consume(vec![
            truncated_frame,
            b"garbage that is not json".to_vec(),
            DOCUMENT.as_bytes().to_vec(),
        ])
        .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].short_message, "hello");
        assert!(logs_contain("Discarding malformed datagram"));
        assert!(logs_contain("Failed to decode payload"));
    }

    #[tokio::test]
    async fn test_listener_keeps_incomplete_message_buffered() {
        let payload = vec![0x41u8; 1000];
        let chunks: Vec<Vec<u8>> = chunk_payload(&payload, 256, &mut FixedIds)
            .unwrap()
            .into_iter()
            .map(|b| b.to_vec())
            .collect();

        // Withhold the last chunk: nothing decodes, nothing is dropped.
        let incomplete = chunks[..chunks.len() - 1].to_vec();
        let records = setup_and_consume(incomplete).await;

        assert!(records.is_empty());
    }
}
