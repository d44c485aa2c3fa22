// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Faceted-count aggregations over the contract index.

use crate::error::ApiError;
use crate::models::summary::{nested_resource_years, terms_buckets, Summary, YearCount};
use crate::services::index::ElasticClient;
use serde_json::{json, Value};
use std::sync::Arc;

/// Design ceiling on distinct bucket keys, not a true top-N: callers must
/// not assume correctness beyond this cardinality.
const AGG_SIZE: u32 = 10_000;

/// Facet names paired with the index fields they aggregate over.
const FACETS: &[(&str, &str)] = &[
    ("year_summary", "metadata.signature_year.keyword"),
    ("resource_summary", "metadata.resource.keyword"),
    ("document_summary", "metadata.document_type.keyword"),
    ("contract_type_summary", "metadata.contract_type.keyword"),
    ("country_summary", "metadata.country_code.keyword"),
    ("provinces_summary", "metadata.provinces.province.keyword"),
    ("districts_summary", "metadata.provinces.district.keyword"),
    ("government_summary", "metadata.government_entity.entity.keyword"),
    ("company_summary", "metadata.company_name.keyword"),
    ("annotations_summary", "annotations_category.keyword"),
];

/// Statistical summaries of the whole catalog.
pub struct AggregationService {
    index: Arc<ElasticClient>,
    doc_master: String,
}

impl AggregationService {
    pub fn new(index: Arc<ElasticClient>, doc_master: String) -> Self {
        Self { index, doc_master }
    }

    /// Full catalog summary: per-facet bucket counts, the nested
    /// resource-by-year breakdown, and the total document count.
    pub async fn summarize(&self) -> Result<Summary, ApiError> {
        let count = self.index.count(&self.doc_master).await?;

        let mut aggs = serde_json::Map::new();
        for (name, field) in FACETS {
            aggs.insert(
                (*name).to_string(),
                json!({ "terms": { "field": field, "size": AGG_SIZE } }),
            );
        }
        aggs.insert(
            "resource_by_years_summary".to_string(),
            json!({
                "terms": { "field": "metadata.resource.keyword", "size": AGG_SIZE },
                "aggs": {
                    "signature_years": {
                        "terms": { "field": "metadata.signature_year.keyword", "size": AGG_SIZE }
                    }
                }
            }),
        );

        let body = json!({ "size": 0, "aggs": aggs });
        let response = self.index.search(&self.doc_master, &body).await?;
        let aggregations = response.get("aggregations").cloned().unwrap_or(Value::Null);

        Ok(Summary {
            count,
            years: terms_buckets(&aggregations, "year_summary"),
            resources: terms_buckets(&aggregations, "resource_summary"),
            document_types: terms_buckets(&aggregations, "document_summary"),
            contract_types: terms_buckets(&aggregations, "contract_type_summary"),
            countries: terms_buckets(&aggregations, "country_summary"),
            provinces: terms_buckets(&aggregations, "provinces_summary"),
            districts: terms_buckets(&aggregations, "districts_summary"),
            governments: terms_buckets(&aggregations, "government_summary"),
            companies: terms_buckets(&aggregations, "company_summary"),
            annotation_categories: terms_buckets(&aggregations, "annotations_summary"),
            resource_by_years: nested_resource_years(
                &aggregations,
                "resource_by_years_summary",
                "signature_years",
            ),
        })
    }

    /// Contract counts per year within one province. Documents are filtered
    /// by province first, then bucketed by year, so the denominators cover
    /// only that province.
    pub async fn summarize_by_province_year(
        &self,
        province_id: i32,
    ) -> Result<Vec<YearCount>, ApiError> {
        let body = json!({
            "size": 0,
            "aggs": {
                "year_summary": {
                    "filter": { "term": { "metadata.provinces.province": province_id } },
                    "aggs": {
                        "filtered_year": {
                            "terms": {
                                "field": "metadata.signature_year.keyword",
                                "size": AGG_SIZE
                            }
                        }
                    }
                }
            }
        });
        let response = self.index.search(&self.doc_master, &body).await?;
        let aggregations = response.get("aggregations").cloned().unwrap_or(Value::Null);
        let filtered = aggregations.get("year_summary").cloned().unwrap_or(Value::Null);

        Ok(terms_buckets(&filtered, "filtered_year")
            .into_iter()
            .map(|bucket| YearCount {
                year: bucket.key,
                count: bucket.doc_count,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Elasticsearch running
    async fn test_summarize_live() {
        let index = Arc::new(ElasticClient::new(
            "127.0.0.1:9200",
            "contracts".to_string(),
            None,
            None,
        ));
        let service = AggregationService::new(index, "master".to_string());
        let summary = service.summarize().await.expect("summarize failed");

        assert!(summary.count > 0);
        // The nested breakdown must be consistent with the flat resource facet.
        for resource in &summary.resource_by_years {
            let years_sum: u64 = resource.years.iter().map(|b| b.doc_count).sum();
            assert_eq!(years_sum, resource.doc_count);
        }
    }

    #[tokio::test]
    #[ignore] // Requires Elasticsearch running
    async fn test_summarize_by_province_year_live() {
        let index = Arc::new(ElasticClient::new(
            "127.0.0.1:9200",
            "contracts".to_string(),
            None,
            None,
        ));
        let service = AggregationService::new(index, "master".to_string());
        let points = service
            .summarize_by_province_year(1)
            .await
            .expect("aggregation failed");
        assert!(points.iter().all(|p| p.count > 0));
    }
}
