// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Batch grouping.
//!
//! Folds an envelope's events, in original order, into a mapping from joined
//! routing key to the records delivered together under that key. The running
//! request id lives here for exactly one batch; classification is order
//! sensitive, so the fold never reorders or parallelizes.
//!
//! The returned map is locally owned and moved into the flusher. No state
//! survives the invocation.

use std::collections::HashMap;

use crate::config::Config;
use crate::event::LogsEnvelope;
use crate::metadata::resolve_metadata_key;
use crate::processor::{classify, ClassifiedRecord};

/// Joined routing key to the ordered records grouped under it.
pub type GroupedBatch = HashMap<String, Vec<ClassifiedRecord>>;

/// Classifies every event in the envelope and groups the results by routing
/// key. The full batch is built before any delivery begins.
pub fn aggregate(config: &Config, envelope: LogsEnvelope) -> GroupedBatch {
    let LogsEnvelope {
        log_group,
        log_stream,
        log_events,
        ..
    } = envelope;

    let mut groups: GroupedBatch = HashMap::new();
    let mut last_request_id: Option<String> = None;

    for event in log_events {
        let mut record = classify(config, &log_group, &log_stream, event, &mut last_request_id);
        let key = resolve_metadata_key(config, &log_group, &log_stream, &mut record);
        groups.entry(key.join()).or_default().push(record);
    }

    groups
}

#[cfg(test)]
mod tests {
    use reqwest::Url;

    use super::*;
    use crate::config::Encoding;
    use crate::event::{MessageType, RawLogEvent};
    use crate::processor::MessageBody;

    fn test_config() -> Config {
        Config {
            endpoint: Url::parse("https://collectors.example.com/receiver/v1/http/token").unwrap(),
            source_category_override: None,
            source_host_override: None,
            source_name_override: None,
            encoding: Encoding::Utf8,
            include_log_info: true,
        }
    }

    fn envelope(messages: &[&str]) -> LogsEnvelope {
        LogsEnvelope {
            message_type: MessageType::Data,
            log_group: "my-group".to_string(),
            log_stream: "my-stream".to_string(),
            log_events: messages
                .iter()
                .enumerate()
                .map(|(i, message)| RawLogEvent {
                    id: format!("id-{i}"),
                    timestamp: 1478819430523 + i as i64,
                    message: message.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn same_key_records_stay_together_in_order() {
        let config = test_config();
        let groups = aggregate(&config, envelope(&["first", "second"]));
        assert_eq!(groups.len(), 1);
        let records = &groups["my-stream::my-group"];
        assert_eq!(records[0].message, MessageBody::Text("first".to_string()));
        assert_eq!(records[1].message, MessageBody::Text("second".to_string()));
    }

    #[test]
    fn distinct_keys_split_into_distinct_groups() {
        let config = test_config();
        let groups = aggregate(
            &config,
            envelope(&[
                "plain",
                r#"{"msg": "special", "_sumo_metadata": {"category": "alerts"}}"#,
            ]),
        );
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["my-stream::my-group"].len(), 1);
        assert_eq!(groups["my-stream:alerts:my-group"].len(), 1);
    }

    #[test]
    fn request_id_propagates_across_the_batch() {
        let config = test_config();
        let groups = aggregate(
            &config,
            envelope(&["before", "RequestId: abc-123 start", "after"]),
        );
        let records = &groups["my-stream::my-group"];
        assert_eq!(records[0].request_id, None);
        assert_eq!(records[1].request_id.as_deref(), Some("abc-123"));
        assert_eq!(records[2].request_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn empty_batch_yields_no_groups() {
        let config = test_config();
        let groups = aggregate(&config, envelope(&[]));
        assert!(groups.is_empty());
    }
}
