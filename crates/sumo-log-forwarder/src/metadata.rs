// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Routing-key resolution.
//!
//! Every record is delivered under a `(name, category, host)` triple that
//! selects its destination source metadata. Precedence, lowest to highest:
//!
//! 1. Defaults: empty category, the batch's log group as host, the batch's
//!    log stream as name.
//! 2. Static configuration overrides (`SOURCE_*_OVERRIDE`).
//! 3. A `_sumo_metadata` object inside a structured message, which lets the
//!    emitting code pick its own metadata per record. It is consumed here and
//!    never appears in the delivered record.

use serde::Deserialize;

use crate::config::Config;
use crate::processor::ClassifiedRecord;

/// Field on a structured message carrying a per-record metadata override.
pub const METADATA_OVERRIDE_FIELD: &str = "_sumo_metadata";

/// The resolved routing triple.
///
/// Grouping and dispatch use the `:`-joined form. There is no escaping: a
/// component that itself contains `:` shifts the split on delivery and can
/// collide with another group's key. Kept as-is to match the upstream
/// collector contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataKey {
    pub name: String,
    pub category: String,
    pub host: String,
}

impl MetadataKey {
    /// The joined grouping key, `name:category:host`.
    pub fn join(&self) -> String {
        format!("{}:{}:{}", self.name, self.category, self.host)
    }
}

/// Splits a joined key back into `(name, category, host)` for the delivery
/// headers. Missing segments come back empty.
pub fn split_key(key: &str) -> (&str, &str, &str) {
    let mut parts = key.split(':');
    (
        parts.next().unwrap_or(""),
        parts.next().unwrap_or(""),
        parts.next().unwrap_or(""),
    )
}

/// Per-record metadata override carried inside the message body.
#[derive(Debug, Default, Deserialize)]
struct MetadataOverride {
    category: Option<String>,
    host: Option<String>,
    source: Option<String>,
}

/// Resolves a record's routing key, consuming any `_sumo_metadata` override
/// from the message so it is not delivered downstream.
pub fn resolve_metadata_key(
    config: &Config,
    log_group: &str,
    log_stream: &str,
    record: &mut ClassifiedRecord,
) -> MetadataKey {
    let category = config
        .source_category_override
        .clone()
        .unwrap_or_default();
    let host = config
        .source_host_override
        .clone()
        .unwrap_or_else(|| log_group.to_string());
    let name = config
        .source_name_override
        .clone()
        .unwrap_or_else(|| log_stream.to_string());

    let mut key = MetadataKey {
        name,
        category,
        host,
    };

    if let Some(map) = record.message.as_object_mut() {
        if let Some(value) = map.remove(METADATA_OVERRIDE_FIELD) {
            // A malformed override is dropped silently, like the rest of the
            // best-effort message handling.
            let overrides: MetadataOverride = serde_json::from_value(value).unwrap_or_default();
            if let Some(category) = overrides.category.filter(|v| !v.is_empty()) {
                key.category = category;
            }
            if let Some(host) = overrides.host.filter(|v| !v.is_empty()) {
                key.host = host;
            }
            if let Some(source) = overrides.source.filter(|v| !v.is_empty()) {
                key.name = source;
            }
        }
    }

    key
}
