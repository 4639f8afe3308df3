// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! One-invocation orchestration: decode, group, deliver, report.

use tracing::{debug, info};

use crate::aggregator::aggregate;
use crate::config::Config;
use crate::error::InvocationError;
use crate::event::{decode_event, ForwarderEvent, MessageType};
use crate::flusher::Flusher;

/// Successful invocation result.
#[derive(Debug, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// The batch was a control message; acknowledged without delivery.
    ControlMessage,
    /// Every routing-key group was delivered.
    Forwarded { sent: usize },
}

/// Processes subscription batches, one invocation at a time.
///
/// Holds no cross-invocation state: each call decodes its own envelope,
/// builds its own grouped batch, and resolves to a single success or failure
/// value once every group delivery has completed.
pub struct Forwarder {
    config: Config,
    flusher: Flusher,
}

impl Forwarder {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let flusher = Flusher::new(&config);
        Forwarder { config, flusher }
    }

    pub async fn handle(
        &self,
        event: &ForwarderEvent,
    ) -> Result<InvocationOutcome, InvocationError> {
        let envelope = decode_event(event, self.config.encoding)?;

        if envelope.message_type == MessageType::Control {
            info!("Control message");
            return Ok(InvocationOutcome::ControlMessage);
        }

        info!("Log events: {}", envelope.log_events.len());

        let groups = aggregate(&self.config, envelope);
        debug!("Resolved {} routing keys", groups.len());

        let summary = self.flusher.flush(groups).await;
        if summary.is_success() {
            Ok(InvocationOutcome::Forwarded {
                sent: summary.sent,
            })
        } else {
            Err(InvocationError::Delivery(summary.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Url;

    use super::*;
    use crate::config::Encoding;
    use crate::error::DecodeError;
    use crate::event::AwsLogs;

    fn forwarder_for(endpoint: &str) -> Forwarder {
        Forwarder::new(Config {
            endpoint: Url::parse(endpoint).unwrap(),
            source_category_override: None,
            source_host_override: None,
            source_name_override: None,
            encoding: Encoding::Utf8,
            include_log_info: true,
        })
    }

    #[tokio::test]
    async fn corrupt_payload_fails_before_any_delivery() {
        // Unreachable endpoint: a delivery attempt would fail differently.
        let forwarder = forwarder_for("http://127.0.0.1:1/receiver");
        let event = ForwarderEvent {
            awslogs: AwsLogs {
                data: "!!not base64!!".to_string(),
            },
        };
        let err = forwarder.handle(&event).await.unwrap_err();
        assert!(matches!(
            err,
            InvocationError::Decode(DecodeError::Base64(_))
        ));
    }
}
