// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Typed decoding of contract documents returned by the index.
//!
//! Index sources are heterogeneous: older documents carry numbers where newer
//! ones carry strings, and a few metadata fields may be either a scalar or an
//! array. Decoding is schema-validated per hit; a malformed hit yields a
//! [`DecodeError`] and is skipped, never aborting the whole batch.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("hit is missing _id")]
    MissingId,
    #[error("hit is missing _source")]
    MissingSource,
    #[error("hit {id}: malformed source: {source}")]
    Source {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One `{province, district}` pair attached to a contract. Both ids are
/// stored as strings in the index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvincePair {
    #[serde(default, deserialize_with = "flex_string")]
    pub province: String,
    #[serde(default, deserialize_with = "flex_string")]
    pub district: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GovernmentEntity {
    #[serde(default, deserialize_with = "flex_string")]
    pub entity: String,
}

/// The metadata block of a contract document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractMetadata {
    pub contract_name: String,
    #[serde(default)]
    pub open_contracting_id: String,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub signature_date: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub signature_year: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub resource: Vec<String>,
    #[serde(default)]
    pub resource_raw: Vec<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub contract_type: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub document_type: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub project_title: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub category: Option<String>,
    #[serde(default)]
    pub government_entity: Vec<GovernmentEntity>,
    #[serde(default)]
    pub provinces: Vec<ProvincePair>,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Source body of a contract document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSource {
    pub metadata: ContractMetadata,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub contract_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_text_string: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub annotations_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_string: Option<String>,
}

/// One decoded search hit. Constructed per response and discarded once
/// serialized or handed to an exporter.
#[derive(Debug, Clone, Serialize)]
pub struct ContractHit {
    pub id: String,
    #[serde(flatten)]
    pub source: ContractSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<HashMap<String, Vec<String>>>,
}

impl ContractHit {
    /// Decode one raw hit (`{_id, _source, highlight?}`).
    pub fn decode(hit: &Value) -> Result<Self, DecodeError> {
        let id = hit
            .get("_id")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingId)?
            .to_string();
        let raw_source = hit.get("_source").ok_or(DecodeError::MissingSource)?;
        let source: ContractSource =
            serde_json::from_value(raw_source.clone()).map_err(|source| DecodeError::Source {
                id: id.clone(),
                source,
            })?;
        let highlight = hit
            .get("highlight")
            .and_then(|h| serde_json::from_value(h.clone()).ok());
        Ok(Self { id, source, highlight })
    }
}

/// Decode a batch of hits, skipping malformed ones with a warning.
pub fn decode_hits(hits: &[Value]) -> Vec<ContractHit> {
    hits.iter()
        .filter_map(|hit| match ContractHit::decode(hit) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed hit");
                None
            }
        })
        .collect()
}

/// Search response handed to the JSON API and the exporters.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub total: u64,
    pub results: Vec<ContractHit>,
}

/// Flatten a scalar-or-array JSON value to a display string, joining array
/// elements with `;`.
pub fn flatten_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(flatten_value)
            .collect::<Vec<_>>()
            .join(";"),
        _ => String::new(),
    }
}

fn flex_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.as_ref().map(flatten_value).unwrap_or_default())
}

fn flex_opt_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.as_ref().map(flatten_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_hit() -> Value {
        json!({
            "_id": "1024",
            "_source": {
                "metadata": {
                    "contract_name": "Erdenet expansion agreement",
                    "open_contracting_id": "ocds-xx-1024",
                    "signature_date": "2019-04-12",
                    "signature_year": 2019,
                    "country_code": "MN",
                    "resource": ["copper", "molybdenum"],
                    "contract_type": "investment agreement",
                    "document_type": "contract",
                    "company_name": "Erdenet Mining Corporation",
                    "government_entity": [{ "entity": "Ministry of Mining" }],
                    "provinces": [{ "province": "11", "district": "27" }],
                    "file_url": "https://admin.iltodgeree.mn/app/files/1024.pdf"
                },
                "pdf_text_string": "THIS AGREEMENT is made...",
                "annotations_string": ["taxation", "royalty"],
                "metadata_string": "Erdenet expansion agreement 2019"
            },
            "highlight": { "pdf_text_string": ["<strong>copper</strong> smelter"] }
        })
    }

    #[test]
    fn test_decode_valid_hit() {
        let hit = ContractHit::decode(&sample_hit()).unwrap();
        assert_eq!(hit.id, "1024");
        assert_eq!(hit.source.metadata.contract_name, "Erdenet expansion agreement");
        // Numeric year normalizes to its string form.
        assert_eq!(hit.source.metadata.signature_year.as_deref(), Some("2019"));
        // Array-valued annotation text flattens to a ;-joined string.
        assert_eq!(
            hit.source.annotations_string.as_deref(),
            Some("taxation;royalty")
        );
        assert_eq!(hit.source.metadata.provinces[0].province, "11");
        assert!(hit.highlight.is_some());
    }

    #[test]
    fn test_decode_missing_id_fails() {
        let err = ContractHit::decode(&json!({ "_source": {} })).unwrap_err();
        assert!(matches!(err, DecodeError::MissingId));
    }

    #[test]
    fn test_decode_missing_contract_name_fails() {
        let hit = json!({ "_id": "7", "_source": { "metadata": {} } });
        let err = ContractHit::decode(&hit).unwrap_err();
        assert!(matches!(err, DecodeError::Source { .. }));
    }

    #[test]
    fn test_batch_decode_skips_malformed_hit_only() {
        let hits = vec![
            sample_hit(),
            json!({ "_id": "bad", "_source": { "metadata": {} } }),
            sample_hit(),
        ];
        let decoded = decode_hits(&hits);
        assert_eq!(decoded.len(), 2);
        assert!(decoded.iter().all(|h| h.id == "1024"));
    }

    #[test]
    fn test_flatten_value_shapes() {
        assert_eq!(flatten_value(&json!("plain")), "plain");
        assert_eq!(flatten_value(&json!(42)), "42");
        assert_eq!(flatten_value(&json!(["a", "b"])), "a;b");
        assert_eq!(flatten_value(&json!(null)), "");
    }
}
