// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! GELF-over-UDP wire protocol and runtime components.
//!
//! The sender pipeline turns one structured log event into UDP datagrams:
//! envelope building ([`envelope`]), compression ([`compression`]), and
//! chunking ([`chunker`]), composed by [`encoder`] and shipped by
//! [`transport`]. The receiver pipeline regroups chunked datagrams
//! ([`assembler`]), decodes complete payloads ([`decoder`]), and forwards
//! records through the listener/record-service pair ([`listener`],
//! [`record_service`]).
//!
//! Delivery is best effort by design: datagrams are sent fire-and-forget
//! and loss is an accepted outcome of the protocol, matching UDP itself.

pub mod assembler;
pub mod chunker;
pub mod compression;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod envelope;
pub mod errors;
pub mod listener;
pub mod record_service;
pub mod transport;
