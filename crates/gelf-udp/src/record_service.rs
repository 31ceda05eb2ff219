// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Buffering of decoded records behind a command channel.
//!
//! The listener runs on its own task; decoded records cross over to the
//! host through this service so the receive loop never blocks on whatever
//! the host does with them. The queue is FIFO-bounded: under sustained
//! overload the oldest records are dropped, keeping memory flat.

use std::collections::VecDeque;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::envelope::GelfMessage;

/// Decoded records kept before FIFO eviction kicks in.
const MAX_RECORD_QUEUE_SIZE: usize = 50_000;

#[derive(Debug)]
pub enum RecordCommand {
    Insert(GelfMessage),
    Flush(oneshot::Sender<Vec<GelfMessage>>),
    Shutdown,
}

/// Cheap-to-clone handle for talking to a running [`RecordService`].
#[derive(Clone)]
pub struct RecordHandle {
    tx: mpsc::UnboundedSender<RecordCommand>,
}

impl RecordHandle {
    pub fn insert(
        &self,
        record: GelfMessage,
    ) -> Result<(), mpsc::error::SendError<RecordCommand>> {
        self.tx.send(RecordCommand::Insert(record))
    }

    /// Drains every buffered record.
    pub async fn flush(&self) -> Result<Vec<GelfMessage>, String> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(RecordCommand::Flush(response_tx))
            .map_err(|e| format!("Failed to send flush command: {}", e))?;

        response_rx
            .await
            .map_err(|e| format!("Failed to receive flush response: {}", e))
    }

    pub fn shutdown(&self) -> Result<(), mpsc::error::SendError<RecordCommand>> {
        self.tx.send(RecordCommand::Shutdown)
    }
}

/// Owns the record queue and processes commands until shutdown.
pub struct RecordService {
    records: VecDeque<GelfMessage>,
    max_queue_size: usize,
    rx: mpsc::UnboundedReceiver<RecordCommand>,
}

impl RecordService {
    #[must_use]
    pub fn new() -> (RecordService, RecordHandle) {
        Self::with_queue_limit(MAX_RECORD_QUEUE_SIZE)
    }

    /// Custom queue bound, for tests and special deployments.
    #[must_use]
    pub fn with_queue_limit(max_queue_size: usize) -> (RecordService, RecordHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = RecordService {
            records: VecDeque::new(),
            max_queue_size,
            rx,
        };
        let handle = RecordHandle { tx };
        (service, handle)
    }

    pub async fn run(mut self) {
        debug!("Record service started");

        while let Some(command) = self.rx.recv().await {
            match command {
                RecordCommand::Insert(record) => {
                    if self.records.len() >= self.max_queue_size {
                        self.records.pop_front();
                        warn!(
                            "Record queue full ({} items), dropping oldest record",
                            self.max_queue_size
                        );
                    }
                    self.records.push_back(record);
                }

                RecordCommand::Flush(response_tx) => {
                    let drained: Vec<GelfMessage> = self.records.drain(..).collect();
                    if response_tx.send(drained).is_err() {
                        error!("Failed to send flush response - receiver dropped");
                    }
                }

                RecordCommand::Shutdown => {
                    debug!("Record service shutting down");
                    break;
                }
            }
        }

        debug!("Record service stopped");
    }
}
