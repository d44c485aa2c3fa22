// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Annotation documents: text spans on contract pages, each carrying a
//! category, a quote, and range metadata. Annotations sharing a category and
//! text are grouped across pages for the grouped view.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotationDecodeError {
    #[error("annotation hit is missing _source")]
    MissingSource,
    #[error("malformed annotation source: {0}")]
    Source(#[from] serde_json::Error),
}

/// A single annotation entry on one contract page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default, deserialize_with = "flex_string")]
    pub contract_id: String,
    #[serde(default)]
    pub open_contracting_id: String,
    #[serde(default, deserialize_with = "flex_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "flex_i64")]
    pub annotation_id: i64,
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub category_key: String,
    #[serde(default)]
    pub article_reference: String,
    #[serde(default, deserialize_with = "flex_i64")]
    pub page_no: i64,
    #[serde(default, deserialize_with = "flex_string")]
    pub ranges: String,
    #[serde(default, deserialize_with = "flex_string")]
    pub cluster: String,
}

impl Annotation {
    /// Decode one raw annotation hit.
    pub fn decode(hit: &Value) -> Result<Self, AnnotationDecodeError> {
        let source = hit
            .get("_source")
            .ok_or(AnnotationDecodeError::MissingSource)?;
        Ok(serde_json::from_value(source.clone())?)
    }
}

/// Decode a batch of annotation hits, skipping malformed ones.
pub fn decode_annotations(hits: &[Value]) -> Vec<Annotation> {
    hits.iter()
        .filter_map(|hit| match Annotation::decode(hit) {
            Ok(annotation) => Some(annotation),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed annotation hit");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnotationResponse {
    pub total: u64,
    pub result: Vec<Annotation>,
}

/// Page-level entry inside an [`AnnotationGroup`].
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationPage {
    pub id: i64,
    pub page_no: i64,
    pub quote: String,
    pub article_reference: String,
}

/// Annotations sharing a category and text, with one entry per page.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationGroup {
    pub contract_id: String,
    pub open_contracting_id: String,
    pub text: String,
    pub category: String,
    pub category_key: String,
    pub cluster: String,
    pub pages: Vec<AnnotationPage>,
}

/// Group annotations by `(category_key, text)`, preserving first-seen order.
pub fn group_annotations(annotations: &[Annotation]) -> Vec<AnnotationGroup> {
    let mut groups: Vec<AnnotationGroup> = Vec::new();
    for annotation in annotations {
        let page = AnnotationPage {
            id: annotation.id,
            page_no: annotation.page_no,
            quote: annotation.quote.clone(),
            article_reference: annotation.article_reference.clone(),
        };
        match groups
            .iter_mut()
            .find(|g| g.category_key == annotation.category_key && g.text == annotation.text)
        {
            Some(group) => group.pages.push(page),
            None => groups.push(AnnotationGroup {
                contract_id: annotation.contract_id.clone(),
                open_contracting_id: annotation.open_contracting_id.clone(),
                text: annotation.text.clone(),
                category: annotation.category.clone(),
                category_key: annotation.category_key.clone(),
                cluster: annotation.cluster.clone(),
                pages: vec![page],
            }),
        }
    }
    groups
}

fn flex_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(value
        .as_ref()
        .map(crate::models::contract::flatten_value)
        .unwrap_or_default())
}

fn flex_i64<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_default(),
        Some(Value::String(s)) => s.parse().unwrap_or_default(),
        _ => 0,
    })
}
