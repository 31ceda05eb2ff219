// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Fire-and-forget UDP sending.

use tokio::net::UdpSocket;
use tracing::{debug, warn};

use crate::chunker::{MessageIdSource, OsRandomIds};
use crate::config::EncoderConfig;
use crate::encoder;
use crate::envelope::LogEvent;
use crate::errors::{CreationError, EncodeError, ShipError};

/// Sends encoded log events to one collector address.
///
/// The socket is acquired once and reused for every message. Sends are
/// fire-and-forget: the protocol accepts datagram loss, so there is no
/// acknowledgment to wait for and nothing to retry. `ship` takes
/// `&mut self`, which serializes access to the socket and the id source
/// when multiple producers share a shipper through outer ownership.
pub struct GelfShipper {
    socket: UdpSocket,
    config: EncoderConfig,
    ids: Box<dyn MessageIdSource + Send>,
}

impl GelfShipper {
    /// Binds a local UDP socket and locks it to the collector address.
    ///
    /// Socket acquisition failure is fatal: without a socket the shipper
    /// cannot operate at all.
    pub async fn connect(
        destination: &str,
        config: EncoderConfig,
    ) -> Result<GelfShipper, CreationError> {
        config.validate()?;
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(destination).await?;
        Ok(GelfShipper {
            socket,
            config,
            ids: Box::new(OsRandomIds),
        })
    }

    /// Replaces the message id source, for tests that need deterministic
    /// chunk ids.
    #[must_use]
    pub fn with_id_source(mut self, ids: Box<dyn MessageIdSource + Send>) -> GelfShipper {
        self.ids = ids;
        self
    }

    /// Encodes one event and sends its datagrams.
    ///
    /// Returns the number of datagrams handed to the socket. A message too
    /// large for the chunking ceiling is dropped here with a diagnostic
    /// carrying its byte size; that is not a shipper failure.
    pub async fn ship(&mut self, event: &LogEvent) -> Result<usize, ShipError> {
        let datagrams = match encoder::encode_event(event, &self.config, self.ids.as_mut()) {
            Ok(datagrams) => datagrams,
            Err(EncodeError::PayloadTooLarge { size, max }) => {
                warn!("Dropping oversized message: {size} bytes exceeds the {max} byte ceiling");
                return Ok(0);
            }
            Err(e) => return Err(ShipError::Encode(e)),
        };

        for datagram in &datagrams {
            self.socket.send(datagram).await?;
        }
        debug!("Shipped {} datagram(s)", datagrams.len());
        Ok(datagrams.len())
    }
}
