// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-record classification and enrichment.
//!
//! Each raw log event is reshaped before grouping:
//!
//! 1. Strip a single trailing newline from the message text.
//! 2. Detect a request identifier (`RequestId:` marker, or a timestamp `Z`
//!    followed by an identifier token) and update the batch's running id.
//! 3. Detect a console-style `timestamp \t uuid \t` prefix; when present it
//!    overwrites the running id and the prefix is stripped from the message.
//! 4. Best-effort JSON decode of the remaining text, so structured messages
//!    are forwarded as nested objects rather than strings. Failure falls
//!    back to text and is never an error.
//! 5. Drop the opaque record id and attach log group/stream context and the
//!    running request id, when available.
//!
//! The running request id is owned by the caller and threaded through the
//! whole batch: records lacking their own identifier inherit the most
//! recently observed one.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::event::RawLogEvent;

lazy_static! {
    /// Console log line: `2016-11-10T23:11:54.523Z\t<uuid>\t<message>`.
    static ref CONSOLE_LINE_REGEX: Regex =
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z\t(\w+?-\w+?-\w+?-\w+?-\w+)\t")
            .expect("failed creating regex");

    /// Request identifier: a `RequestId:` marker or a timestamp's trailing
    /// `Z`, then whitespace and an identifier token.
    static ref REQUEST_ID_REGEX: Regex =
        Regex::new(r"(?:RequestId:|Z)\s+([\w-]+)").expect("failed creating regex");
}

/// A record's message body after classification: decoded JSON when the text
/// parsed, residual text otherwise. Serializes as the bare value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageBody {
    Structured(Value),
    Text(String),
}

impl MessageBody {
    /// Mutable access to the decoded JSON object, when the body is one.
    pub fn as_object_mut(&mut self) -> Option<&mut serde_json::Map<String, Value>> {
        match self {
            MessageBody::Structured(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

/// A classified record, ready for grouping and delivery.
///
/// The raw event's opaque `id` is gone; the optional context fields only
/// serialize when present, matching the delivered record shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRecord {
    pub timestamp: i64,
    pub message: MessageBody,
    #[serde(rename = "logStream", skip_serializing_if = "Option::is_none")]
    pub log_stream: Option<String>,
    #[serde(rename = "logGroup", skip_serializing_if = "Option::is_none")]
    pub log_group: Option<String>,
    #[serde(rename = "requestID", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Classifies one raw event, updating the batch's running request id.
pub fn classify(
    config: &Config,
    log_group: &str,
    log_stream: &str,
    event: RawLogEvent,
    last_request_id: &mut Option<String>,
) -> ClassifiedRecord {
    let RawLogEvent {
        timestamp,
        mut message,
        ..
    } = event;

    // Exactly one trailing line terminator, not all trailing whitespace.
    if message.ends_with('\n') {
        message.pop();
    }

    if let Some(caps) = REQUEST_ID_REGEX.captures(&message) {
        if let Some(id) = caps.get(1) {
            *last_request_id = Some(id.as_str().to_string());
        }
    }

    // Runs after the general pattern, so a console-format id wins when both
    // match.
    if let Some(caps) = CONSOLE_LINE_REGEX.captures(&message) {
        if let (Some(prefix), Some(id)) = (caps.get(0), caps.get(1)) {
            *last_request_id = Some(id.as_str().to_string());
            message = message[prefix.end()..].to_string();
        }
    }

    let body = match serde_json::from_str::<Value>(&message) {
        Ok(value) => MessageBody::Structured(value),
        Err(_) => MessageBody::Text(message),
    };

    let (log_stream, log_group) = if config.include_log_info {
        (Some(log_stream.to_string()), Some(log_group.to_string()))
    } else {
        (None, None)
    };

    ClassifiedRecord {
        timestamp,
        message: body,
        log_stream,
        log_group,
        request_id: last_request_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Url;
    use serde_json::json;

    use super::*;
    use crate::config::Encoding;

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

    fn raw(message: &str) -> RawLogEvent {
        RawLogEvent {
            id: "3195310660696698337880902507980421114328961542429EXAMPLE".to_string(),
            timestamp: 1478819430523,
            message: message.to_string(),
        }
    }

    #[test]
    fn extracts_request_id_and_carries_it_forward() {
        let config = test_config();
        let mut last = None;

        let first = classify(&config, "g", "s", raw("RequestId: abc-123 done"), &mut last);
        assert_eq!(first.request_id.as_deref(), Some("abc-123"));

        let second = classify(&config, "g", "s", raw("plain line"), &mut last);
        assert_eq!(second.request_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn no_request_id_until_one_is_seen() {
        let config = test_config();
        let mut last = None;
        let record = classify(&config, "g", "s", raw("plain line"), &mut last);
        assert_eq!(record.request_id, None);
        assert_eq!(last, None);
    }

    #[test]
    fn console_line_strips_prefix_and_overwrites_id() {
        let config = test_config();
        let mut last = Some("earlier-id".to_string());
        let record = classify(
            &config,
            "g",
            "s",
            raw("2016-11-10T23:11:54.523Z\t108af3bb-a79b-11e6-8bd7-91c363cc05d9\thello"),
            &mut last,
        );
        assert_eq!(
            record.request_id.as_deref(),
            Some("108af3bb-a79b-11e6-8bd7-91c363cc05d9")
        );
        assert_eq!(record.message, MessageBody::Text("hello".to_string()));
    }

    #[test]
    fn json_message_is_decoded() {
        let config = test_config();
        let mut last = None;
        let record = classify(&config, "g", "s", raw("{\"a\":1}"), &mut last);
        assert_eq!(record.message, MessageBody::Structured(json!({"a": 1})));
    }

    #[test]
    fn non_json_message_stays_text() {
        let config = test_config();
        let mut last = None;
        let record = classify(&config, "g", "s", raw("not json"), &mut last);
        assert_eq!(record.message, MessageBody::Text("not json".to_string()));
    }

    #[test]
    fn strips_exactly_one_trailing_newline() {
        let config = test_config();
        let mut last = None;
        let record = classify(&config, "g", "s", raw("line\n\n"), &mut last);
        assert_eq!(record.message, MessageBody::Text("line\n".to_string()));
    }

    #[test]
    fn attaches_log_info_and_drops_record_id() {
        let config = test_config();
        let mut last = None;
        let record = classify(&config, "my-group", "my-stream", raw("hello"), &mut last);
        assert_eq!(record.log_group.as_deref(), Some("my-group"));
        assert_eq!(record.log_stream.as_deref(), Some("my-stream"));

        let serialized = serde_json::to_value(&record).unwrap();
        assert_eq!(
            serialized,
            json!({
                "timestamp": 1478819430523i64,
                "message": "hello",
                "logStream": "my-stream",
                "logGroup": "my-group",
            })
        );
    }

    #[test]
    fn log_info_can_be_disabled() {
        let config = Config {
            include_log_info: false,
            ..test_config()
        };
        let mut last = None;
        let record = classify(&config, "g", "s", raw("hello"), &mut last);
        assert_eq!(record.log_group, None);
        assert_eq!(record.log_stream, None);
    }

    #[test]
    fn timestamp_like_marker_sets_request_id() {
        let config = test_config();
        let mut last = None;
        classify(
            &config,
            "g",
            "s",
            raw("END 2016-11-10T23:11:54Z abc-def-123"),
            &mut last,
        );
        assert_eq!(last.as_deref(), Some("abc-def-123"));
    }
}
