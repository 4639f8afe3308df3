// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log-group onboarding for the forwarder.
//!
//! Walks every log group in the account, attaches the forwarder as a
//! subscription destination to any group that has none, and sets a default
//! retention period on groups with no retention configured. Pure sequential
//! CRUD against the management API; the forwarder core never depends on how
//! subscriptions get established.
//!
//! The management transport is abstracted behind [`api::LogGroupsApi`];
//! callers supply the real client.

pub mod api;
pub mod configurator;
