// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Administrative bulk corrections of mislabeled field values.
//!
//! Each correction pair issues one scripted update-by-query. Corrections are
//! best-effort: a failed pair is logged and does not roll back pairs already
//! applied, and a zero count means "no matching documents", not an error.
//!
//! The resources script rewrites matching elements inside the resource
//! array, while the contract/document type scripts overwrite the whole
//! field. The asymmetry is intentional: resources are multi-valued.

use crate::services::index::ElasticClient;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// One `{key, value}` rewrite: every document whose raw field equals `key`
/// gets `value` instead.
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionPair {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorrectionOutcome {
    pub key: String,
    pub value: String,
    pub updated: u64,
}

const RESOURCES_SCRIPT: &str = "for (int i = 0; i < ctx._source.metadata.resource.length; i++) { \
     if (ctx._source.metadata.resource[i] == params.old) { \
     ctx._source.metadata.resource[i] = params.replacement } }";

const CONTRACT_TYPES_SCRIPT: &str = "ctx._source.metadata.contract_type_raw = params.replacement";

const DOCUMENT_TYPES_SCRIPT: &str = "ctx._source.metadata.document_type = params.replacement";

pub struct CorrectionService {
    index: Arc<ElasticClient>,
    doc_master: String,
}

impl CorrectionService {
    pub fn new(index: Arc<ElasticClient>, doc_master: String) -> Self {
        Self { index, doc_master }
    }

    /// Rewrite resource values inside the resource arrays of matching
    /// documents.
    pub async fn correct_resources(&self, pairs: &[CorrectionPair]) -> Vec<CorrectionOutcome> {
        self.apply(pairs, "metadata.resource.keyword", RESOURCES_SCRIPT)
            .await
    }

    /// Overwrite the raw contract type of matching documents.
    pub async fn correct_contract_types(&self, pairs: &[CorrectionPair]) -> Vec<CorrectionOutcome> {
        self.apply(
            pairs,
            "metadata.contract_type_raw.keyword",
            CONTRACT_TYPES_SCRIPT,
        )
        .await
    }

    /// Overwrite the document type of matching documents.
    pub async fn correct_document_types(&self, pairs: &[CorrectionPair]) -> Vec<CorrectionOutcome> {
        self.apply(
            pairs,
            "metadata.document_type.keyword",
            DOCUMENT_TYPES_SCRIPT,
        )
        .await
    }

    async fn apply(
        &self,
        pairs: &[CorrectionPair],
        term_field: &str,
        script: &str,
    ) -> Vec<CorrectionOutcome> {
        let mut outcomes = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let mut term = serde_json::Map::new();
            term.insert(term_field.to_string(), json!(pair.key));
            let body = json!({
                "query": { "term": term },
                "script": {
                    "inline": script,
                    "lang": "painless",
                    "params": { "old": pair.key, "replacement": pair.value }
                }
            });

            let updated = match self.index.update_by_query(&self.doc_master, &body).await {
                Ok(updated) => {
                    tracing::info!(key = %pair.key, value = %pair.value, updated, "correction applied");
                    updated
                }
                Err(err) => {
                    tracing::warn!(key = %pair.key, error = %err, "correction failed");
                    0
                }
            };

            outcomes.push(CorrectionOutcome {
                key: pair.key.clone(),
                value: pair.value.clone(),
                updated,
            });
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Elasticsearch running
    async fn test_resource_correction_live() {
        let index = Arc::new(ElasticClient::new(
            "127.0.0.1:9200",
            "contracts".to_string(),
            None,
            None,
        ));
        let service = CorrectionService::new(index, "master".to_string());

        let outcomes = service
            .correct_resources(&[CorrectionPair {
                key: "cooper".to_string(),
                value: "copper".to_string(),
            }])
            .await;

        assert_eq!(outcomes.len(), 1);
        // Zero is a valid outcome: no documents carried the misspelling.
        assert_eq!(outcomes[0].key, "cooper");
    }

    #[tokio::test]
    async fn test_unreachable_index_reports_zero_and_continues() {
        let index = Arc::new(ElasticClient::new(
            "127.0.0.1:1",
            "contracts".to_string(),
            None,
            None,
        ));
        let service = CorrectionService::new(index, "master".to_string());

        let outcomes = service
            .correct_document_types(&[
                CorrectionPair {
                    key: "contrct".to_string(),
                    value: "contract".to_string(),
                },
                CorrectionPair {
                    key: "anex".to_string(),
                    value: "annex".to_string(),
                },
            ])
            .await;

        // Both pairs are attempted; failures degrade to zero counts.
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.updated == 0));
    }
}
