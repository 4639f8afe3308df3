// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The list → filter → subscribe → retention workflow.

use std::env;

use thiserror::Error;
use tracing::{debug, info};

use crate::api::{LogGroup, LogGroupsApi};

/// Name of the subscription filter the configurator attaches.
pub const FILTER_NAME: &str = "SumoLogic";

/// Match-everything filter pattern.
pub const FILTER_PATTERN: &str = "";

/// Retention applied to groups that have none configured.
pub const DEFAULT_RETENTION_DAYS: i32 = 3;

#[derive(Debug, Error)]
pub enum ConfiguratorError {
    #[error("FORWARDER_FUNCTION_NAME environment variable is not set")]
    MissingFunctionName,
    #[error("FORWARDER_FUNCTION_ARN environment variable is not set")]
    MissingFunctionArn,
    #[error("management API call failed: {0}")]
    Api(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Clone)]
pub struct ConfiguratorConfig {
    /// Function name of the forwarder; its own log group is never subscribed
    /// to itself.
    pub forwarder_function_name: String,
    /// Subscription destination for every other group.
    pub forwarder_function_arn: String,
}

impl ConfiguratorConfig {
    pub fn new() -> Result<ConfiguratorConfig, ConfiguratorError> {
        let forwarder_function_name = env::var("FORWARDER_FUNCTION_NAME")
            .map_err(|_| ConfiguratorError::MissingFunctionName)?;
        let forwarder_function_arn =
            env::var("FORWARDER_FUNCTION_ARN").map_err(|_| ConfiguratorError::MissingFunctionArn)?;
        Ok(ConfiguratorConfig {
            forwarder_function_name,
            forwarder_function_arn,
        })
    }
}

/// What one run changed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub subscribed: usize,
    pub retention_set: usize,
}

/// Sequential CRUD orchestration over a [`LogGroupsApi`] implementation.
/// Aborts on the first API error.
pub struct LogGroupConfigurator<A> {
    api: A,
    config: ConfiguratorConfig,
}

impl<A: LogGroupsApi> LogGroupConfigurator<A> {
    pub fn new(api: A, config: ConfiguratorConfig) -> Self {
        LogGroupConfigurator { api, config }
    }

    pub async fn run(&self) -> Result<RunReport, ConfiguratorError> {
        let groups = self.list_log_groups().await?;
        debug!("Found {} log groups", groups.len());

        let candidates = self.filter_unsubscribed(groups).await?;
        info!("Subscribing {} log groups to the forwarder", candidates.len());

        for group in &candidates {
            self.api
                .put_subscription_filter(
                    &group.name,
                    FILTER_NAME,
                    FILTER_PATTERN,
                    &self.config.forwarder_function_arn,
                )
                .await?;
        }

        let unretained: Vec<&LogGroup> = candidates
            .iter()
            .filter(|group| group.retention_in_days.is_none())
            .collect();
        info!(
            "Setting {DEFAULT_RETENTION_DAYS}-day retention on {} log groups",
            unretained.len()
        );

        for group in &unretained {
            self.api
                .put_retention_policy(&group.name, DEFAULT_RETENTION_DAYS)
                .await?;
        }

        Ok(RunReport {
            subscribed: candidates.len(),
            retention_set: unretained.len(),
        })
    }

    /// Follows the listing pagination to exhaustion.
    async fn list_log_groups(&self) -> Result<Vec<LogGroup>, ConfiguratorError> {
        let mut groups = Vec::new();
        let mut next_token = None;
        loop {
            let page = self.api.describe_log_groups(next_token).await?;
            groups.extend(page.groups);
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        Ok(groups)
    }

    /// Keeps groups with no subscription destination that are not the
    /// forwarder's own log group.
    async fn filter_unsubscribed(
        &self,
        groups: Vec<LogGroup>,
    ) -> Result<Vec<LogGroup>, ConfiguratorError> {
        let own_group = format!("/aws/lambda/{}", self.config.forwarder_function_name);
        let mut kept = Vec::new();
        for group in groups {
            if group.name == own_group {
                continue;
            }
            let subscriptions = self.api.describe_subscription_filters(&group.name).await?;
            if subscriptions.is_empty() {
                kept.push(group);
            }
        }
        Ok(kept)
    }
}
