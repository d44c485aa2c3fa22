// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Contract search and retrieval on top of the index client.

use crate::error::ApiError;
use crate::models::annotation::{decode_annotations, AnnotationResponse};
use crate::models::contract::{decode_hits, ContractHit, SearchResponse};
use crate::models::params::SearchParameters;
use crate::models::query::CompiledQuery;
use crate::services::index::ElasticClient;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

const ANNOTATIONS_PAGE_SIZE: u32 = 10_000;

/// Title and description used for link previews and SEO.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataPreview {
    pub title: String,
    pub description: String,
}

/// Search, retrieval and annotation queries against the contract index.
pub struct SearchService {
    index: Arc<ElasticClient>,
    doc_master: String,
    doc_metadata: String,
    doc_annotations: String,
}

impl SearchService {
    pub fn new(
        index: Arc<ElasticClient>,
        doc_master: String,
        doc_metadata: String,
        doc_annotations: String,
    ) -> Self {
        Self {
            index,
            doc_master,
            doc_metadata,
            doc_annotations,
        }
    }

    /// Compile and execute a catalog search.
    pub async fn search(&self, params: &SearchParameters) -> Result<SearchResponse, ApiError> {
        let body = CompiledQuery::compile(params).to_body();
        tracing::debug!(body = %body, "executing search");
        let response = self.index.search(&self.doc_master, &body).await?;
        Ok(decode_search_response(&response))
    }

    /// Most recently added contracts, newest first.
    pub async fn latest(&self, size: u32) -> Result<SearchResponse, ApiError> {
        let body = json!({
            "size": size,
            "query": { "match_all": {} },
            "sort": [
                "_score",
                { "created_at": { "order": "desc", "unmapped_type": "date" } }
            ]
        });
        let response = self.index.search(&self.doc_metadata, &body).await?;
        Ok(decode_search_response(&response))
    }

    /// Contract metadata document (no full text).
    pub async fn contract(&self, id: &str) -> Result<ContractHit, ApiError> {
        let doc = self.index.get(&self.doc_metadata, id).await?;
        Ok(ContractHit::decode(&doc)?)
    }

    /// Complete contract document including full text.
    pub async fn contract_master(&self, id: &str) -> Result<ContractHit, ApiError> {
        let doc = self.index.get(&self.doc_master, id).await?;
        Ok(ContractHit::decode(&doc)?)
    }

    /// Full text of one contract, if extracted.
    pub async fn contract_text(&self, id: &str) -> Result<Option<String>, ApiError> {
        let hit = self.contract_master(id).await?;
        Ok(hit.source.pdf_text_string)
    }

    /// Title plus whitespace-collapsed description for previews.
    pub async fn metadata_preview(&self, id: &str) -> Result<MetadataPreview, ApiError> {
        let hit = self.contract_master(id).await?;
        let description = hit
            .source
            .pdf_text_string
            .as_deref()
            .map(collapse_whitespace)
            .unwrap_or_default();
        Ok(MetadataPreview {
            title: hit.source.metadata.contract_name,
            description,
        })
    }

    /// All annotations of one contract, ordered by annotation id.
    pub async fn annotations(&self, contract_id: i64) -> Result<AnnotationResponse, ApiError> {
        let body = json!({
            "query": { "term": { "contract_id": contract_id } },
            "size": ANNOTATIONS_PAGE_SIZE,
            "from": 0,
            "sort": [{ "id.keyword": { "order": "asc" } }]
        });
        let response = self.index.search(&self.doc_annotations, &body).await?;
        let hits = hits_array(&response);
        Ok(AnnotationResponse {
            total: hits_total(&response),
            result: decode_annotations(hits),
        })
    }
}

/// Decode a raw search response into typed hits, skipping malformed ones.
fn decode_search_response(response: &Value) -> SearchResponse {
    SearchResponse {
        total: hits_total(response),
        results: decode_hits(hits_array(response)),
    }
}

/// Total hit count; handles both the bare-integer and the object form.
pub fn hits_total(response: &Value) -> u64 {
    match response.get("hits").and_then(|hits| hits.get("total")) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
        _ => 0,
    }
}

pub fn hits_array(response: &Value) -> &[Value] {
    response
        .get("hits")
        .and_then(|hits| hits.get("hits"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_total_integer_form() {
        let response = json!({ "hits": { "total": 42, "hits": [] } });
        assert_eq!(hits_total(&response), 42);
    }

    #[test]
    fn test_hits_total_object_form() {
        let response = json!({ "hits": { "total": { "value": 17 }, "hits": [] } });
        assert_eq!(hits_total(&response), 17);
    }

    #[test]
    fn test_hits_total_missing_is_zero() {
        assert_eq!(hits_total(&json!({})), 0);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("THIS  AGREEMENT\n\n is \t made"),
            "THIS AGREEMENT is made"
        );
    }

    #[test]
    fn test_decode_search_response_skips_bad_hits() {
        let response = json!({
            "hits": {
                "total": 2,
                "hits": [
                    {
                        "_id": "1",
                        "_source": {
                            "metadata": { "contract_name": "Tavan Tolgoi coal agreement" }
                        }
                    },
                    { "_id": "2", "_source": { "metadata": {} } }
                ]
            }
        });
        let decoded = decode_search_response(&response);
        assert_eq!(decoded.total, 2);
        assert_eq!(decoded.results.len(), 1);
        assert_eq!(decoded.results[0].id, "1");
    }
}
