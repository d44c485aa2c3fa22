// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Public catalog API for mining contracts: full-text and faceted search,
//! per-contract retrieval, statistical summaries, and bulk export.

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
