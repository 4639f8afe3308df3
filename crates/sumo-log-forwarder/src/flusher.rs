// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Concurrent delivery of grouped records to the collector endpoint.
//!
//! One POST per routing-key group, all groups dispatched at once with no
//! parallelism cap. Each group resolves to exactly one outcome: a sent unit
//! on HTTP 200, or one error string for any other status or a transport
//! failure. The flush completes only after every group has resolved; joining
//! the spawned tasks replaces any shared completion counters, so no group can
//! be double-counted or dropped under interleaving.
//!
//! The body is newline-delimited JSON, one record per line in group order.
//! A single delivery attempt per group; retries are out of scope.

use reqwest::{StatusCode, Url};
use tokio::task::JoinSet;
use tracing::debug;

use crate::aggregator::GroupedBatch;
use crate::config::Config;
use crate::metadata::split_key;
use crate::processor::ClassifiedRecord;

/// Aggregated outcome of one flush: sent-group count plus one error message
/// per failed group, in completion order.
#[derive(Debug, Default)]
pub struct FlushSummary {
    pub sent: usize,
    pub errors: Vec<String>,
}

impl FlushSummary {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Delivers grouped batches to a fixed HTTPS collector endpoint.
#[derive(Debug, Clone)]
pub struct Flusher {
    client: reqwest::Client,
    endpoint: Url,
}

impl Flusher {
    /// The endpoint was validated at startup; no per-group configuration
    /// errors exist.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        // No request deadline is applied; the transport's defaults decide.
        Flusher {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
        }
    }

    /// Sends every group concurrently and waits for all outcomes.
    pub async fn flush(&self, groups: GroupedBatch) -> FlushSummary {
        debug!("Flushing {} record groups", groups.len());

        let mut set = JoinSet::new();
        for (key, records) in groups {
            let client = self.client.clone();
            let endpoint = self.endpoint.clone();
            set.spawn(async move { send_group(client, endpoint, key, records).await });
        }

        let mut summary = FlushSummary::default();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Ok(())) => summary.sent += 1,
                Ok(Err(message)) => summary.errors.push(message),
                Err(e) => summary.errors.push(format!("delivery task failed: {e}")),
            }
        }

        debug!(
            "messagesSent: {} messagesErrors: {}",
            summary.sent,
            summary.errors.len()
        );
        summary
    }
}

/// Delivers one group. The error string becomes that group's contribution to
/// the invocation failure message.
async fn send_group(
    client: reqwest::Client,
    endpoint: Url,
    key: String,
    records: Vec<ClassifiedRecord>,
) -> Result<(), String> {
    let (name, category, host) = split_key(&key);

    let mut body = String::new();
    for record in &records {
        match serde_json::to_string(record) {
            Ok(line) => {
                body.push_str(&line);
                body.push('\n');
            }
            Err(e) => return Err(format!("failed to serialize record: {e}")),
        }
    }

    let response = client
        .post(endpoint)
        .header("X-Sumo-Name", name)
        .header("X-Sumo-Category", category)
        .header("X-Sumo-Host", host)
        .body(body)
        .send()
        .await;

    match response {
        Ok(resp) if resp.status() == StatusCode::OK => Ok(()),
        Ok(resp) => Err(format!("HTTP Return code {}", resp.status().as_u16())),
        Err(e) => Err(e.to_string()),
    }
}
