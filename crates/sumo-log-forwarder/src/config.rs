// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Environment-based forwarder configuration, validated eagerly at startup.

use std::env;

use reqwest::Url;

use crate::error::ConfigError;

/// Text encoding of the decompressed batch payload.
///
/// The upstream contract allows an `ENCODING` label, defaulting to `utf-8`.
/// Only UTF-8 is supported here; any other label is rejected at startup so a
/// misconfigured deployment fails loudly instead of corrupting payload text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
}

impl Encoding {
    fn from_label(label: &str) -> Result<Self, ConfigError> {
        match label.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            _ => Err(ConfigError::UnsupportedEncoding(label.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Sumo Logic HTTP source endpoint. Must be HTTPS with a non-empty host
    /// and path; violations are fatal before any record is processed.
    pub endpoint: Url,
    /// Overrides the derived source category when set.
    pub source_category_override: Option<String>,
    /// Overrides the source host (otherwise the batch's log group name).
    pub source_host_override: Option<String>,
    /// Overrides the source name (otherwise the batch's log stream name).
    pub source_name_override: Option<String>,
    /// Encoding of the decompressed payload text.
    pub encoding: Encoding,
    /// Attach `logStream`/`logGroup` fields to every forwarded record.
    /// Required by the Sumo Logic AWS Lambda app, so this stays on.
    pub include_log_info: bool,
}

impl Config {
    pub fn new() -> Result<Config, ConfigError> {
        let raw_endpoint = env::var("SUMO_ENDPOINT").map_err(|_| ConfigError::MissingEndpoint)?;
        let endpoint = parse_endpoint(&raw_endpoint)?;

        let encoding = match env::var("ENCODING") {
            Ok(label) => Encoding::from_label(&label)?,
            Err(_) => Encoding::Utf8,
        };

        Ok(Config {
            endpoint,
            source_category_override: metadata_override("SOURCE_CATEGORY_OVERRIDE"),
            source_host_override: metadata_override("SOURCE_HOST_OVERRIDE"),
            source_name_override: metadata_override("SOURCE_NAME_OVERRIDE"),
            encoding,
            include_log_info: true,
        })
    }
}

/// Reads one of the `SOURCE_*_OVERRIDE` variables. Unset, empty, and the
/// literal sentinel `"none"` all mean "no override".
fn metadata_override(var: &str) -> Option<String> {
    match env::var(var) {
        Ok(value) if value.is_empty() || value == "none" => None,
        Ok(value) => Some(value),
        Err(_) => None,
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|_| ConfigError::InvalidEndpoint(raw.to_string()))?;
    let has_host = url.host_str().map(|h| !h.is_empty()).unwrap_or(false);
    if url.scheme() != "https" || !has_host || url.path().is_empty() {
        return Err(ConfigError::InvalidEndpoint(raw.to_string()));
    }
    Ok(url)
}
