// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for configuration, payload decoding, and invocation results.

use thiserror::Error;

/// Fatal configuration problems, reported before any record is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SUMO_ENDPOINT environment variable is not set")]
    MissingEndpoint,
    #[error("Invalid SUMO_ENDPOINT environment variable: {0}")]
    InvalidEndpoint(String),
    #[error("Unsupported ENCODING environment variable: {0}")]
    UnsupportedEncoding(String),
}

/// Failures while decoding the invocation payload into a logs envelope.
///
/// All of these abort the invocation before grouping begins; there is no
/// partial delivery from a corrupt batch.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to base64-decode event payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to decompress event payload: {0}")]
    Decompress(#[from] std::io::Error),
    #[error("event payload is not valid utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("failed to parse logs envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}

/// The single failure value carried by an unsuccessful invocation.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// One entry per failed routing-key group, in completion order.
    #[error("errors: {}", .0.join(","))]
    Delivery(Vec<String>),
}
