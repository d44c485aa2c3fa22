// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Typed aggregation results.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One facet value with its document count. Keys arrive as strings or
/// numbers depending on the field, so they normalize to strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    #[serde(deserialize_with = "key_string")]
    pub key: String,
    pub doc_count: u64,
}

/// Nested resource bucket with its per-year breakdown. The two-level
/// structure is preserved, not flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceYears {
    pub key: String,
    pub doc_count: u64,
    pub years: Vec<Bucket>,
}

/// Full catalog summary: one bucket list per facet plus the nested
/// resource-by-year breakdown and the total document count.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub count: u64,
    pub years: Vec<Bucket>,
    pub resources: Vec<Bucket>,
    pub document_types: Vec<Bucket>,
    pub contract_types: Vec<Bucket>,
    pub countries: Vec<Bucket>,
    pub provinces: Vec<Bucket>,
    pub districts: Vec<Bucket>,
    pub governments: Vec<Bucket>,
    pub companies: Vec<Bucket>,
    pub annotation_categories: Vec<Bucket>,
    pub resource_by_years: Vec<ResourceYears>,
}

/// One chart point of the per-province year summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    #[serde(rename = "x")]
    pub year: String,
    #[serde(rename = "y")]
    pub count: u64,
}

/// Extract the bucket list of a named terms aggregation. A missing
/// aggregation decodes as an empty list rather than an error.
pub fn terms_buckets(aggregations: &Value, name: &str) -> Vec<Bucket> {
    aggregations
        .get(name)
        .and_then(|agg| agg.get("buckets"))
        .and_then(|buckets| serde_json::from_value(buckets.clone()).ok())
        .unwrap_or_default()
}

/// Extract the nested resource-by-year aggregation.
pub fn nested_resource_years(aggregations: &Value, name: &str, sub: &str) -> Vec<ResourceYears> {
    let Some(Value::Array(buckets)) = aggregations.get(name).and_then(|agg| agg.get("buckets"))
    else {
        return Vec::new();
    };
    buckets
        .iter()
        .filter_map(|bucket| {
            let key = bucket.get("key").map(super::contract::flatten_value)?;
            let doc_count = bucket.get("doc_count").and_then(Value::as_u64)?;
            Some(ResourceYears {
                key,
                doc_count,
                years: terms_buckets(bucket, sub),
            })
        })
        .collect()
}

fn key_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(super::contract::flatten_value(&value))
}
