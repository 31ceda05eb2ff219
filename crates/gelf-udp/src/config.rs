// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Configuration consumed by the codec and the relay binary.

use std::collections::HashSet;
use std::env;
use std::str::FromStr;

use crate::chunker::{CHUNK_HEADER_LEN, DEFAULT_CHUNK_SIZE};
use crate::compression::CompressionKind;
use crate::errors::CreationError;

/// Default GELF UDP port.
pub const DEFAULT_GELF_PORT: u16 = 12201;

/// Snapshot of the sender-side settings consumed per event.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Application identity carried in the GELF `host` field. Not the
    /// machine hostname.
    pub app_host: String,
    /// Compression applied to serialized envelopes.
    pub compression: CompressionKind,
    /// Datagram payload budget in bytes.
    pub chunk_size: usize,
    /// Event fields surfaced as `_`-prefixed additional fields; everything
    /// else is dropped.
    pub allowed_fields: HashSet<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            app_host: "gelf".to_string(),
            compression: CompressionKind::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            allowed_fields: HashSet::new(),
        }
    }
}

impl EncoderConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), CreationError> {
        if self.app_host.trim().is_empty() {
            return Err(CreationError::InvalidConfig(
                "application host identity cannot be empty".to_string(),
            ));
        }

        if self.chunk_size <= CHUNK_HEADER_LEN {
            return Err(CreationError::InvalidConfig(format!(
                "chunk size must exceed the {CHUNK_HEADER_LEN}-byte chunk header, got {}",
                self.chunk_size
            )));
        }

        Ok(())
    }
}

/// Configuration for the relay binary.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the UDP listener binds to.
    pub bind_host: String,
    /// Listener port.
    pub port: u16,
    /// Codec settings shared with any embedded shipper.
    pub encoder: EncoderConfig,
    /// Log level (e.g. trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_GELF_PORT,
            encoder: EncoderConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl RelayConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, CreationError> {
        let bind_host = env::var("GELF_BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("GELF_PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(DEFAULT_GELF_PORT);
        let app_host = env::var("GELF_APP_HOST").unwrap_or_else(|_| "gelf".to_string());
        let compression = match env::var("GELF_COMPRESSION") {
            Ok(raw) => CompressionKind::from_str(raw.trim().to_lowercase().as_str())
                .map_err(|e| CreationError::InvalidConfig(e.to_string()))?,
            Err(_) => CompressionKind::default(),
        };
        let chunk_size = env::var("GELF_CHUNK_SIZE")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CHUNK_SIZE);
        let allowed_fields = env::var("GELF_ALLOWED_FIELDS")
            .map(|raw| parse_allowed_fields(&raw))
            .unwrap_or_default();
        let log_level = env::var("GELF_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| "info".to_string());

        let config = Self {
            bind_host,
            port,
            encoder: EncoderConfig {
                app_host,
                compression,
                chunk_size,
                allowed_fields,
            },
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), CreationError> {
        if self.port == 0 {
            return Err(CreationError::InvalidConfig(
                "listener port must be greater than 0".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(CreationError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        self.encoder.validate()
    }
}

/// Splits a comma-separated field allow-list, dropping empty entries.
///
/// # Examples
///
/// ```
/// use gelf_udp::config::parse_allowed_fields;
///
/// let fields = parse_allowed_fields("line, module,,");
/// assert!(fields.contains("line"));
/// assert!(fields.contains("module"));
/// assert_eq!(fields.len(), 2);
/// ```
#[must_use]
pub fn parse_allowed_fields(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}
