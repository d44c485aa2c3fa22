// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Search parameter normalization.
//!
//! Raw query-string values are loosely typed; this module turns them into a
//! validated [`SearchParameters`] value. Malformed facet tokens are skipped
//! per element with a warning, never failing the request. The only hard
//! request errors are non-numeric `size`/`from`, because those two control
//! allocation on the index side.

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_SIZE: u32 = 10;
const DEFAULT_FROM: u32 = 0;

/// Raw query-string parameters of `GET /api/search`, as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchQuery {
    pub q: Option<String>,
    pub year: Option<String>,
    pub contract_type: Option<String>,
    pub resource: Option<String>,
    pub company: Option<String>,
    pub government: Option<String>,
    pub document_type: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub annotation_category: Option<String>,
    pub annotated: Option<String>,
    pub size: Option<String>,
    pub from: Option<String>,
    pub sort_by: Option<String>,
    pub is_asc: Option<String>,
    pub download: Option<String>,
    #[serde(rename = "type")]
    pub export_type: Option<String>,
}

/// Rejected `size`/`from` input. Everything else degrades silently.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("size must be a non-negative integer, got {0:?}")]
    InvalidSize(String),
    #[error("from must be a non-negative integer, got {0:?}")]
    InvalidFrom(String),
}

/// Whitelisted sort keys. Anything else falls back to the default order
/// (signature date, descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Country,
    Year,
    ContractName,
    Resource,
    ContractType,
}

impl SortField {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "country" => Some(SortField::Country),
            "year" => Some(SortField::Year),
            "contract_name" => Some(SortField::ContractName),
            "resource" => Some(SortField::Resource),
            "contract_type" => Some(SortField::ContractType),
            _ => None,
        }
    }
}

/// Validated, typed search parameters.
///
/// Unset optional filters stay empty/`None` and are omitted from the
/// compiled query entirely; an empty string never means "filter on empty".
#[derive(Debug, Clone, Default)]
pub struct SearchParameters {
    pub q: String,
    pub years: Vec<i32>,
    pub resources: Vec<String>,
    pub contract_types: Vec<String>,
    pub document_types: Vec<String>,
    pub annotation_categories: Vec<String>,
    pub province: Option<String>,
    pub districts: Vec<i32>,
    pub company: Option<String>,
    pub government: Option<String>,
    pub annotated: Option<bool>,
    pub size: u32,
    pub from: u32,
    pub sort_by: Option<SortField>,
    pub ascending: bool,
}

impl SearchParameters {
    /// Normalize raw query-string input into typed parameters.
    pub fn from_raw(raw: &RawSearchQuery) -> Result<Self, ParamError> {
        let size = parse_page_bound(raw.size.as_deref(), DEFAULT_SIZE, ParamError::InvalidSize)?;
        let from = parse_page_bound(raw.from.as_deref(), DEFAULT_FROM, ParamError::InvalidFrom)?;

        let annotated = raw.annotated.as_deref().filter(|s| !s.is_empty()).and_then(|s| {
            s.parse::<bool>()
                .map_err(|_| tracing::warn!(value = s, "annotated is not a boolean, ignoring"))
                .ok()
        });

        let ascending = raw.is_asc.as_deref().filter(|s| !s.is_empty()).map_or(false, |s| {
            s.parse::<bool>()
                .map_err(|_| tracing::warn!(value = s, "is_asc is not a boolean, ignoring"))
                .unwrap_or(false)
        });

        Ok(Self {
            q: raw.q.clone().unwrap_or_default(),
            years: split_ints(raw.year.as_deref(), "year"),
            resources: split_terms(raw.resource.as_deref()),
            contract_types: split_terms(raw.contract_type.as_deref()),
            document_types: split_terms(raw.document_type.as_deref()),
            annotation_categories: split_terms(raw.annotation_category.as_deref()),
            province: raw.province.clone().filter(|s| !s.is_empty()),
            districts: split_ints(raw.district.as_deref(), "district"),
            company: raw.company.clone().filter(|s| !s.is_empty()),
            government: raw.government.clone().filter(|s| !s.is_empty()),
            annotated,
            size,
            from,
            sort_by: raw.sort_by.as_deref().and_then(SortField::parse),
            ascending,
        })
    }
}

/// Split a comma-separated facet list: segments trimmed, empty ones dropped.
fn split_terms(raw: Option<&str>) -> Vec<String> {
    match raw {
        None | Some("") => Vec::new(),
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// Split a comma-separated list of integers, skipping unparseable tokens.
fn split_ints(raw: Option<&str>, field: &str) -> Vec<i32> {
    split_terms(raw)
        .iter()
        .filter_map(|part| {
            part.parse::<i32>()
                .map_err(|_| tracing::warn!(field, token = %part, "skipping non-numeric token"))
                .ok()
        })
        .collect()
}

fn parse_page_bound(
    raw: Option<&str>,
    default: u32,
    err: fn(String) -> ParamError,
) -> Result<u32, ParamError> {
    match raw {
        None | Some("") => Ok(default),
        Some(value) => value.parse::<u32>().map_err(|_| err(value.to_string())),
    }
}
