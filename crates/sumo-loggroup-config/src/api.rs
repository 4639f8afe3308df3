// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Management-API surface the configurator drives.
//!
//! Only the four operations the workflow needs, with pagination on listing.
//! The real transport lives with the caller.

use async_trait::async_trait;

pub type ApiResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// One log group as reported by the management API.
///
/// `retention_in_days` is `None` when the group has no retention policy
/// configured. An explicit policy, including one of zero days, is `Some`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogGroup {
    pub name: String,
    pub retention_in_days: Option<i32>,
}

/// One page of the log-group listing.
#[derive(Debug, Clone)]
pub struct LogGroupsPage {
    pub groups: Vec<LogGroup>,
    /// Token for the next page; `None` on the last page.
    pub next_token: Option<String>,
}

#[async_trait]
pub trait LogGroupsApi {
    /// Lists log groups, one page at a time.
    async fn describe_log_groups(&self, next_token: Option<String>) -> ApiResult<LogGroupsPage>;

    /// Destination ARNs of the subscription filters on a group.
    async fn describe_subscription_filters(&self, log_group: &str) -> ApiResult<Vec<String>>;

    async fn put_subscription_filter(
        &self,
        log_group: &str,
        filter_name: &str,
        filter_pattern: &str,
        destination_arn: &str,
    ) -> ApiResult<()>;

    async fn put_retention_policy(&self, log_group: &str, retention_in_days: i32) -> ApiResult<()>;
}
