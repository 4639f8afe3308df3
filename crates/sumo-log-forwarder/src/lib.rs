// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Forwarder for CloudWatch Logs subscription batches to a Sumo Logic HTTP source.
//!
//! One invocation processes one compressed log batch to completion:
//!
//! ```text
//!    Invocation event (base64 + gzip)
//!         │
//!         v
//!   ┌──────────────┐
//!   │    Event     │  (Decode envelope and raw records)
//!   └──────┬───────┘
//!         │
//!         v
//!   ┌──────────────┐
//!   │  Processor   │  (Classify each record, carry request id)
//!   └──────┬───────┘
//!         │
//!         v
//!   ┌──────────────┐
//!   │  Aggregator  │  (Group records by metadata key)
//!   └──────┬───────┘
//!         │
//!         v
//!   ┌──────────────┐
//!   │   Flusher    │  (One concurrent POST per group, NDJSON)
//!   └──────────────┘
//! ```
//!
//! # Components
//!
//! - **[`event`]**: invocation payload decoding (base64, gzip, JSON envelope)
//! - **[`processor`]**: per-record classification and enrichment
//! - **[`metadata`]**: routing-key resolution (name, category, host)
//! - **[`aggregator`]**: ordered grouping of classified records by key
//! - **[`flusher`]**: concurrent delivery with per-group outcome aggregation
//! - **[`handler`]**: one-invocation orchestration and result mapping

pub mod aggregator;
pub mod config;
pub mod error;
pub mod event;
pub mod flusher;
pub mod handler;
pub mod metadata;
pub mod processor;
