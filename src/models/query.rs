// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Query compilation.
//!
//! [`SearchParameters`] compile into an immutable [`CompiledQuery`] tree of
//! typed clauses; the tree serializes to the index wire format in exactly
//! one place ([`CompiledQuery::to_body`]). The boolean composition is:
//! `(must: full-text) AND (filter: all filters) AND (at least one
//! should-clause matches, if any are present)` — with no full-text query the
//! should-clauses alone form the matching predicate, and with neither the
//! query degrades to filter-only.

use crate::models::params::{SearchParameters, SortField};
use crate::services::vocab::{self, Vocabulary};
use serde_json::{json, Map, Value};

/// Fields searched by the full-text clause.
pub const SEARCH_FIELDS: [&str; 14] = [
    "metadata.contract_name",
    "metadata.project_title",
    "metadata.open_contracting_id",
    "metadata.country_code",
    "metadata.country_name",
    "metadata.resource",
    "metadata.resource_raw",
    "metadata.language",
    "metadata.company_name",
    "metadata.type_of_contract",
    "metadata.show_pdf_text",
    "metadata.category",
    "metadata_string",
    "pdf_text_string",
];

/// Fields carrying highlight fragments when a full-text query is present.
pub const HIGHLIGHT_FIELDS: [&str; 2] = ["pdf_text_string", "metadata_string"];

const HIGHLIGHT_FRAGMENT_SIZE: u32 = 50;
const HIGHLIGHT_NUM_FRAGMENTS: u32 = 2;
const DEFAULT_SORT_FIELD: &str = "metadata.signature_date";

/// Exact-match facet predicate. Combined with logical AND in filter context,
/// so it never affects relevance scoring.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    TermsStr { field: &'static str, values: Vec<String> },
    TermsInt { field: &'static str, values: Vec<i32> },
}

/// Phrase predicate combined with OR among its peers.
#[derive(Debug, Clone, PartialEq)]
pub struct ShouldClause {
    pub field: &'static str,
    pub phrase: String,
}

/// Full-text predicate: every query token must appear, across any field.
#[derive(Debug, Clone, PartialEq)]
pub struct MustClause {
    pub fields: &'static [&'static str],
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSpec {
    pub fields: &'static [&'static str],
    pub fragment_size: u32,
    pub number_of_fragments: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub field: &'static str,
    pub ascending: bool,
}

/// Compiled, immutable query tree. Built fresh per request, never mutated
/// after being handed to the index client.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub filters: Vec<FilterClause>,
    pub shoulds: Vec<ShouldClause>,
    pub must: Option<MustClause>,
    pub highlight: Option<HighlightSpec>,
    pub sort: SortSpec,
    pub size: u32,
    pub from: u32,
}

impl CompiledQuery {
    /// Compile normalized parameters into a query tree.
    pub fn compile(params: &SearchParameters) -> Self {
        let shoulds = params
            .annotation_categories
            .iter()
            .map(|category| ShouldClause {
                field: "annotations_category",
                phrase: category.clone(),
            })
            .collect();

        let must = (!params.q.is_empty()).then(|| MustClause {
            fields: &SEARCH_FIELDS,
            query: params.q.clone(),
        });

        let highlight = must.is_some().then_some(HighlightSpec {
            fields: &HIGHLIGHT_FIELDS,
            fragment_size: HIGHLIGHT_FRAGMENT_SIZE,
            number_of_fragments: HIGHLIGHT_NUM_FRAGMENTS,
        });

        let sort = match params.sort_by {
            Some(field) => SortSpec {
                field: sort_field_name(field),
                ascending: params.ascending,
            },
            None => SortSpec {
                field: DEFAULT_SORT_FIELD,
                ascending: false,
            },
        };

        Self {
            filters: facet_filters(params),
            shoulds,
            must,
            highlight,
            sort,
            size: params.size,
            from: params.from,
        }
    }

    /// Serialize the tree to the index wire format.
    pub fn to_body(&self) -> Value {
        let mut boolean = Map::new();
        if let Some(must) = &self.must {
            boolean.insert("must".to_string(), must_to_value(must));
        }
        if !self.filters.is_empty() {
            let filters: Vec<Value> = self.filters.iter().map(filter_to_value).collect();
            boolean.insert("filter".to_string(), Value::Array(filters));
        }
        if !self.shoulds.is_empty() {
            let shoulds: Vec<Value> = self.shoulds.iter().map(should_to_value).collect();
            boolean.insert("should".to_string(), Value::Array(shoulds));
            // Keep the should-clauses part of the matching predicate even
            // when must/filter clauses are present.
            boolean.insert("minimum_should_match".to_string(), json!(1));
        }

        let mut body = Map::new();
        body.insert("query".to_string(), json!({ "bool": boolean }));
        if let Some(highlight) = &self.highlight {
            body.insert("highlight".to_string(), highlight_to_value(highlight));
        }
        let order = if self.sort.ascending { "asc" } else { "desc" };
        body.insert(
            "sort".to_string(),
            Value::Array(vec![keyed(self.sort.field, json!({ "order": order }))]),
        );
        body.insert("size".to_string(), json!(self.size));
        body.insert("from".to_string(), json!(self.from));
        Value::Object(body)
    }
}

/// Build the exact-match filter clauses for every facet present. Unset
/// filters contribute nothing.
fn facet_filters(params: &SearchParameters) -> Vec<FilterClause> {
    let mut filters = Vec::new();

    if !params.years.is_empty() {
        filters.push(FilterClause::TermsInt {
            field: "metadata.signature_year",
            values: params.years.clone(),
        });
    }
    if !params.resources.is_empty() {
        filters.push(FilterClause::TermsStr {
            field: "metadata.resource",
            values: params.resources.clone(),
        });
    }
    if let Some(province) = &params.province {
        filters.push(FilterClause::TermsStr {
            field: "metadata.provinces.province",
            values: vec![province.clone()],
        });
    }
    if !params.districts.is_empty() {
        filters.push(FilterClause::TermsInt {
            field: "metadata.provinces.district",
            values: params.districts.clone(),
        });
    }
    // Document and contract types arrive as display labels; each one maps
    // back to its stored value and becomes its own clause (AND across
    // values, unlike the list-valued facets above).
    for doc_type in &params.document_types {
        filters.push(FilterClause::TermsStr {
            field: "metadata.document_type.keyword",
            values: vec![vocab::to_raw(Vocabulary::DocumentTypes, doc_type).to_string()],
        });
    }
    for contract_type in &params.contract_types {
        filters.push(FilterClause::TermsStr {
            field: "metadata.contract_type.keyword",
            values: vec![vocab::to_raw(Vocabulary::ContractTypes, contract_type).to_string()],
        });
    }
    if let Some(government) = &params.government {
        filters.push(FilterClause::TermsStr {
            field: "metadata.government_entity.entity.keyword",
            values: vec![government.clone()],
        });
    }
    if let Some(company) = &params.company {
        filters.push(FilterClause::TermsStr {
            field: "metadata.company_name.keyword",
            values: vec![company.clone()],
        });
    }

    filters
}

fn sort_field_name(field: SortField) -> &'static str {
    match field {
        SortField::Country => "metadata.country_name.keyword",
        SortField::Year => "metadata.signature_date",
        SortField::ContractName => "metadata.contract_name.keyword",
        SortField::Resource => "metadata.resource_raw.keyword",
        SortField::ContractType => "metadata.contract_type.keyword",
    }
}

/// Build a single-key JSON object from a runtime key.
fn keyed(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

fn filter_to_value(clause: &FilterClause) -> Value {
    match clause {
        FilterClause::TermsStr { field, values } => json!({ "terms": keyed(field, json!(values)) }),
        FilterClause::TermsInt { field, values } => json!({ "terms": keyed(field, json!(values)) }),
    }
}

fn should_to_value(clause: &ShouldClause) -> Value {
    json!({ "match_phrase": keyed(clause.field, json!(clause.phrase)) })
}

fn must_to_value(clause: &MustClause) -> Value {
    json!({
        "simple_query_string": {
            "fields": clause.fields,
            "query": clause.query,
            "default_operator": "AND",
        }
    })
}

fn highlight_to_value(spec: &HighlightSpec) -> Value {
    let mut fields = Map::new();
    for field in spec.fields {
        fields.insert(
            (*field).to_string(),
            json!({
                "fragment_size": spec.fragment_size,
                "number_of_fragments": spec.number_of_fragments,
            }),
        );
    }
    json!({
        "pre_tags": ["<strong>"],
        "post_tags": ["</strong>"],
        "fields": fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::params::{RawSearchQuery, SearchParameters};

    fn params(raw: RawSearchQuery) -> SearchParameters {
        SearchParameters::from_raw(&raw).unwrap()
    }

    #[test]
    fn test_no_filters_no_text_degrades_to_match_everything() {
        let compiled = CompiledQuery::compile(&params(RawSearchQuery::default()));
        assert!(compiled.filters.is_empty());
        assert!(compiled.shoulds.is_empty());
        assert!(compiled.must.is_none());
        assert!(compiled.highlight.is_none());

        // An empty bool query matches every document.
        let body = compiled.to_body();
        assert_eq!(body["query"]["bool"], serde_json::json!({}));
        assert_eq!(body["size"], 10);
        assert_eq!(body["from"], 0);
    }

    #[test]
    fn test_single_resource_filter_only() {
        let compiled = CompiledQuery::compile(&params(RawSearchQuery {
            resource: Some("gold".to_string()),
            ..Default::default()
        }));
        assert_eq!(compiled.filters.len(), 1);
        assert_eq!(
            compiled.filters[0],
            FilterClause::TermsStr {
                field: "metadata.resource",
                values: vec!["gold".to_string()],
            }
        );
        assert!(compiled.must.is_none());
        assert!(compiled.highlight.is_none());
    }

    #[test]
    fn test_document_types_map_through_vocabulary() {
        let compiled = CompiledQuery::compile(&params(RawSearchQuery {
            document_type: Some("Гэрээ".to_string()),
            ..Default::default()
        }));
        assert_eq!(
            compiled.filters,
            vec![FilterClause::TermsStr {
                field: "metadata.document_type.keyword",
                values: vec!["contract".to_string()],
            }]
        );
    }

    #[test]
    fn test_each_contract_type_gets_its_own_clause() {
        let compiled = CompiledQuery::compile(&params(RawSearchQuery {
            contract_type: Some("Хайгуулын гэрээ,Хөрөнгө оруулалтын гэрээ".to_string()),
            ..Default::default()
        }));
        assert_eq!(compiled.filters.len(), 2);
    }

    #[test]
    fn test_full_text_query_enables_must_and_highlight() {
        let compiled = CompiledQuery::compile(&params(RawSearchQuery {
            q: Some("copper smelter".to_string()),
            ..Default::default()
        }));
        let must = compiled.must.as_ref().unwrap();
        assert_eq!(must.query, "copper smelter");
        assert!(compiled.highlight.is_some());

        let body = compiled.to_body();
        assert_eq!(
            body["query"]["bool"]["must"]["simple_query_string"]["default_operator"],
            "AND"
        );
        assert_eq!(
            body["highlight"]["fields"]["pdf_text_string"]["fragment_size"],
            50
        );
        assert_eq!(
            body["highlight"]["fields"]["metadata_string"]["number_of_fragments"],
            2
        );
    }

    #[test]
    fn test_phrases_alone_form_the_predicate_without_text_query() {
        let compiled = CompiledQuery::compile(&params(RawSearchQuery {
            annotation_category: Some("environment,taxation".to_string()),
            ..Default::default()
        }));
        assert!(compiled.must.is_none());
        assert_eq!(compiled.shoulds.len(), 2);

        let body = compiled.to_body();
        assert!(body["query"]["bool"].get("must").is_none());
        assert_eq!(
            body["query"]["bool"]["should"][0]["match_phrase"]["annotations_category"],
            "environment"
        );
    }

    #[test]
    fn test_text_and_phrases_compose_must_and_should() {
        let compiled = CompiledQuery::compile(&params(RawSearchQuery {
            q: Some("royalty".to_string()),
            annotation_category: Some("taxation".to_string()),
            ..Default::default()
        }));
        let body = compiled.to_body();
        assert!(body["query"]["bool"].get("must").is_some());
        assert!(body["query"]["bool"].get("should").is_some());
        assert_eq!(body["query"]["bool"]["minimum_should_match"], 1);
    }

    #[test]
    fn test_year_filter_keeps_integer_values() {
        let compiled = CompiledQuery::compile(&params(RawSearchQuery {
            year: Some("2019,2021".to_string()),
            ..Default::default()
        }));
        let body = compiled.to_body();
        assert_eq!(
            body["query"]["bool"]["filter"][0]["terms"]["metadata.signature_year"],
            serde_json::json!([2019, 2021])
        );
    }

    #[test]
    fn test_default_sort_is_signature_date_descending() {
        let compiled = CompiledQuery::compile(&params(RawSearchQuery::default()));
        let body = compiled.to_body();
        assert_eq!(
            body["sort"][0]["metadata.signature_date"]["order"],
            "desc"
        );
    }

    #[test]
    fn test_explicit_sort_field_and_direction() {
        let compiled = CompiledQuery::compile(&params(RawSearchQuery {
            sort_by: Some("country".to_string()),
            is_asc: Some("true".to_string()),
            ..Default::default()
        }));
        let body = compiled.to_body();
        assert_eq!(
            body["sort"][0]["metadata.country_name.keyword"]["order"],
            "asc"
        );
    }

    #[test]
    fn test_pagination_copied_verbatim() {
        let compiled = CompiledQuery::compile(&params(RawSearchQuery {
            size: Some("50".to_string()),
            from: Some("200".to_string()),
            ..Default::default()
        }));
        let body = compiled.to_body();
        assert_eq!(body["size"], 50);
        assert_eq!(body["from"], 200);
    }
}
