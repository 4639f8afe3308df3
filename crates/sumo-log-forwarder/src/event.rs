// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Invocation payload wire types and decoding.
//!
//! A subscription delivery carries a single `awslogs.data` field holding the
//! batch as base64-encoded, gzip-compressed JSON text. Decoding yields a
//! [`LogsEnvelope`]: the batch's message type, source log group and stream,
//! and the ordered raw log events.

use std::io::Read;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::config::Encoding;
use crate::error::DecodeError;

/// The invocation event as delivered by the log subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct ForwarderEvent {
    pub awslogs: AwsLogs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AwsLogs {
    /// Base64-encoded, gzip-compressed batch text.
    pub data: String,
}

/// Batch-level message tag. Control messages carry no log records and only
/// need acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MessageType {
    #[serde(rename = "DATA_MESSAGE")]
    Data,
    #[serde(rename = "CONTROL_MESSAGE")]
    Control,
}

/// Decoded batch wrapper. Lives for one invocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsEnvelope {
    pub message_type: MessageType,
    pub log_group: String,
    pub log_stream: String,
    pub log_events: Vec<RawLogEvent>,
}

/// One raw log record from the source stream.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLogEvent {
    /// Opaque record identifier. Dropped during classification; it carries no
    /// value downstream.
    pub id: String,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
    pub message: String,
}

/// Decodes the invocation payload into a [`LogsEnvelope`].
///
/// Any failure here is fatal for the invocation: a corrupt batch is never
/// partially delivered.
pub fn decode_event(event: &ForwarderEvent, encoding: Encoding) -> Result<LogsEnvelope, DecodeError> {
    let compressed = STANDARD.decode(&event.awslogs.data)?;

    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;

    let text = match encoding {
        Encoding::Utf8 => String::from_utf8(decompressed)?,
    };

    Ok(serde_json::from_str(&text)?)
}
