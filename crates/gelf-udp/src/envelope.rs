// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! GELF envelope building.
//!
//! Turns one log event into a GELF 1.1 document ready for serialization.
//! The `host` field carries the configured application identity, not the
//! machine hostname, and additional fields pass through an allow-list
//! before being surfaced with a `_` prefix.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::EncoderConfig;
use crate::errors::ParseError;

/// The only GELF version this codec speaks.
pub const GELF_VERSION: &str = "1.1";

// short_message keeps the first 80 code points; full_message is added once
// the UTF-8 byte length goes past 80.
const SHORT_MESSAGE_CHARS: usize = 80;
const FULL_MESSAGE_BYTES: usize = 80;

/// Severity of one log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Syslog severity code carried in the GELF `level` field.
    #[must_use]
    pub fn syslog_code(self) -> u8 {
        match self {
            LogLevel::Error => 3,
            LogLevel::Warn => 4,
            LogLevel::Info => 6,
            LogLevel::Debug => 7,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ParseError;

    /// Only the four defined levels are accepted; anything else is an
    /// error rather than a silent default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(ParseError::UnknownLevel(other.to_string())),
        }
    }
}

/// One structured log record as delivered by the host application.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    /// Must already be UTC; the shipper does not convert from local time.
    pub timestamp: DateTime<Utc>,
    pub fields: BTreeMap<String, Value>,
}

/// A GELF 1.1 document.
///
/// `additional` holds the filtered, `_`-prefixed event fields and is
/// flattened into the top-level JSON object on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GelfMessage {
    pub version: String,
    pub host: String,
    pub short_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_message: Option<String>,
    /// Seconds.microseconds since the epoch, UTC.
    pub timestamp: f64,
    pub level: u8,
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

impl GelfMessage {
    /// Builds the envelope for one event.
    ///
    /// `short_message` truncation counts Unicode code points, never bytes,
    /// so a multi-byte character is either kept whole or dropped whole.
    #[must_use]
    pub fn build(event: &LogEvent, config: &EncoderConfig) -> GelfMessage {
        #[allow(clippy::cast_precision_loss)]
        let timestamp = event.timestamp.timestamp() as f64
            + f64::from(event.timestamp.timestamp_subsec_micros()) / 1_000_000.0;

        let short_message: String = event.message.chars().take(SHORT_MESSAGE_CHARS).collect();
        let full_message = (event.message.len() > FULL_MESSAGE_BYTES).then(|| event.message.clone());

        let mut additional = Map::new();
        for (name, value) in &event.fields {
            if !config.allowed_fields.contains(name) {
                continue;
            }
            additional.insert(format!("_{name}"), additional_value(value));
        }

        GelfMessage {
            version: GELF_VERSION.to_string(),
            host: config.app_host.clone(),
            short_message,
            full_message,
            timestamp,
            level: event.level.syslog_code(),
            additional,
        }
    }
}

// GELF additional fields carry numbers and strings only; everything else is
// rendered to text.
fn additional_value(value: &Value) -> Value {
    match value {
        Value::Number(_) | Value::String(_) => value.clone(),
        other => Value::String(other.to_string()),
    }
}
