// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;

use tokio::io::AsyncReadExt;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use sumo_log_forwarder::config::Config;
use sumo_log_forwarder::event::ForwarderEvent;
use sumo_log_forwarder::handler::{Forwarder, InvocationOutcome};

#[tokio::main]
pub async fn main() {
    let log_level = env::var("SUMO_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("hyper=off,rustls=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    // Endpoint validation happens here, before any record is touched.
    let config = match Config::new() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating config on forwarder startup: {e}");
            std::process::exit(1);
        }
    };

    // One invocation per process: the event JSON arrives on stdin.
    let mut raw_event = String::new();
    if let Err(e) = tokio::io::stdin().read_to_string(&mut raw_event).await {
        error!("Failed to read invocation event from stdin: {e}");
        std::process::exit(1);
    }

    let event: ForwarderEvent = match serde_json::from_str(&raw_event) {
        Ok(event) => event,
        Err(e) => {
            error!("Failed to parse invocation event: {e}");
            std::process::exit(1);
        }
    };

    let forwarder = Forwarder::new(config);
    match forwarder.handle(&event).await {
        Ok(InvocationOutcome::ControlMessage) => info!("Success"),
        Ok(InvocationOutcome::Forwarded { sent }) => {
            info!("Forwarded {sent} record groups");
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
