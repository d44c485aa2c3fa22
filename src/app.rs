// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, route handlers, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router
//! directly without starting the full binary.

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::annotation::group_annotations;
use crate::models::params::{RawSearchQuery, SearchParameters};
use crate::models::version::VersionResponse;
use crate::services::aggs::AggregationService;
use crate::services::correction::{CorrectionPair, CorrectionService};
use crate::services::export::{ExportFile, Exporter};
use crate::services::index::ElasticClient;
use crate::services::lookup::LookupStore;
use crate::services::search::SearchService;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::sync::Arc;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `GEREE_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("GEREE_VERSION");

const LATEST_CONTRACTS_SIZE: u32 = 20;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via
/// `State<AppState>`. All clients are constructed once at startup and shared
/// read-only across concurrent requests.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub aggs: Arc<AggregationService>,
    pub corrections: Arc<CorrectionService>,
    pub lookup: Arc<LookupStore>,
    pub exporter: Arc<Exporter>,
    pub storage_path: Arc<PathBuf>,
    pub front_end_url: Option<String>,
}

impl AppState {
    /// Wire up all services from configuration. Neither the index client nor
    /// the connection pool touches the network here; the first request does.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let index = Arc::new(ElasticClient::new(
            &config.elasticsearch_host,
            config.index.clone(),
            config.elasticsearch_username.clone(),
            config.elasticsearch_password.clone(),
        ));
        let pool = PgPoolOptions::new()
            .min_connections(2)
            .connect_lazy(&config.database_url)?;

        Ok(Self {
            search: Arc::new(SearchService::new(
                index.clone(),
                config.doc_master.clone(),
                config.doc_metadata.clone(),
                config.doc_annotations.clone(),
            )),
            aggs: Arc::new(AggregationService::new(
                index.clone(),
                config.doc_master.clone(),
            )),
            corrections: Arc::new(CorrectionService::new(index, config.doc_master.clone())),
            lookup: Arc::new(LookupStore::new(pool)),
            exporter: Arc::new(Exporter::new(
                config.public_url.clone(),
                PathBuf::from(&config.template_path),
            )),
            storage_path: Arc::new(PathBuf::from(&config.storage_path)),
            front_end_url: config.front_end_url.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

pub async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "geree-api".to_string(),
        version: VERSION.to_string(),
    })
}

/// Catalog search. Returns JSON by default; with `download` set and a known
/// `type`, streams the export artifact instead.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(raw): Query<RawSearchQuery>,
) -> Result<Response, ApiError> {
    let params = SearchParameters::from_raw(&raw)?;
    let results = state.search.search(&params).await?;

    let download = raw.download.as_deref().is_some_and(|d| !d.is_empty());
    match raw.export_type.as_deref() {
        Some("docx") if download => {
            let export = state.exporter.docx(&results.results)?;
            Ok(export_response(export))
        }
        Some("tsv") if download => {
            let units = state.lookup.provinces_all_units().await?;
            let export = state.exporter.tsv(&results.results, &units)?;
            Ok(export_response(export))
        }
        _ => Ok(Json(results).into_response()),
    }
}

pub async fn summary_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let summary = state.aggs.summarize().await?;
    Ok(Json(summary).into_response())
}

pub async fn summary_province_year_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let province_id = parse_id(&id, "province id")?;
    let points = state.aggs.summarize_by_province_year(province_id).await?;
    Ok(Json(points).into_response())
}

pub async fn contracts_latest_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let latest = state.search.latest(LATEST_CONTRACTS_SIZE).await?;
    Ok(Json(latest).into_response())
}

pub async fn contract_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let contract = state.search.contract(&id).await?;
    Ok(Json(contract).into_response())
}

pub async fn contract_text_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let text = state.search.contract_text(&id).await?;
    Ok(Json(json!({ "text": text })).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct AnnotationQuery {
    pub grouped: Option<bool>,
}

pub async fn contract_annotations_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AnnotationQuery>,
) -> Result<Response, ApiError> {
    let contract_id = i64::from(parse_id(&id, "contract id")?);
    let annotations = state.search.annotations(contract_id).await?;
    if query.grouped.unwrap_or(false) {
        return Ok(Json(group_annotations(&annotations.result)).into_response());
    }
    Ok(Json(annotations).into_response())
}

pub async fn metadata_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let preview = state.search.metadata_preview(&id).await?;
    Ok(Json(preview).into_response())
}

/// Per-contract download: `docx` renders the document export, anything else
/// serves the stored PDF.
pub async fn download_handler(
    State(state): State<AppState>,
    Path((id, file_type)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    if file_type == "docx" {
        let contract = state.search.contract_master(&id).await?;
        let export = state.exporter.docx_single(&contract)?;
        return Ok(export_response(export));
    }

    let contract = state.search.contract(&id).await?;
    let file_url = contract.source.metadata.file_url.unwrap_or_default();
    let filename = pdf_filename(&file_url).ok_or(ApiError::NotFound)?;
    let contract_id = contract.source.contract_id.ok_or(ApiError::NotFound)?;

    let path = state.storage_path.join(contract_id).join(filename);
    let bytes = tokio::fs::read(&path).await.map_err(|_| ApiError::NotFound)?;
    Ok(file_response("application/pdf", filename, bytes))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProvinceQuery {
    pub province_id: Option<String>,
}

pub async fn provinces_handler(
    State(state): State<AppState>,
    Query(query): Query<ProvinceQuery>,
) -> Result<Response, ApiError> {
    let parent_id = match query.province_id.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_id(raw, "province_id")?),
    };
    let provinces = state.lookup.provinces(parent_id).await?;
    Ok(Json(provinces).into_response())
}

pub async fn provinces_all_units_handler(
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let units = state.lookup.provinces_all_units().await?;
    Ok(Json(units).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

pub async fn page_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> Result<Response, ApiError> {
    let page_id = parse_id(&id, "page id")?;
    let locale = query.locale.unwrap_or_default();
    let page = state.lookup.page(page_id, &locale).await?;
    Ok(Json(page).into_response())
}

pub async fn law_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> Result<Response, ApiError> {
    let legal_id = parse_id(&id, "law id")?;
    let locale = query.locale.unwrap_or_default();
    let law = state.lookup.law(legal_id, &locale).await?;
    Ok(Json(law).into_response())
}

pub async fn correction_resources_handler(
    State(state): State<AppState>,
    Json(pairs): Json<Vec<CorrectionPair>>,
) -> Result<Response, ApiError> {
    let outcomes = state.corrections.correct_resources(&pairs).await;
    Ok(Json(outcomes).into_response())
}

pub async fn correction_contract_types_handler(
    State(state): State<AppState>,
    Json(pairs): Json<Vec<CorrectionPair>>,
) -> Result<Response, ApiError> {
    let outcomes = state.corrections.correct_contract_types(&pairs).await;
    Ok(Json(outcomes).into_response())
}

pub async fn correction_document_types_handler(
    State(state): State<AppState>,
    Json(pairs): Json<Vec<CorrectionPair>>,
) -> Result<Response, ApiError> {
    let outcomes = state.corrections.correct_document_types(&pairs).await;
    Ok(Json(outcomes).into_response())
}

/// Serve a stored contract file.
pub async fn storage_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    if path.split('/').any(|part| part == "..") {
        return Err(ApiError::BadRequest("invalid file path".to_string()));
    }

    let full_path = state.storage_path.join(&path);
    let bytes = tokio::fs::read(&full_path)
        .await
        .map_err(|_| ApiError::NotFound)?;

    let content_type = match full_path.extension().and_then(|e| e.to_str()) {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };

    let mut response = ([(header::CONTENT_TYPE, content_type)], bytes).into_response();
    if let Some(origin) = &state.front_end_url {
        if let Ok(value) = origin.parse() {
            response
                .headers_mut()
                .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
    }
    Ok(response)
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the Axum application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/version", get(version_handler))
        .route("/api/search", get(search_handler))
        .route("/api/summary", get(summary_handler))
        .route(
            "/api/summary/year/province/{id}",
            get(summary_province_year_handler),
        )
        .route("/api/contracts-latest", get(contracts_latest_handler))
        .route("/api/contracts/{id}", get(contract_handler))
        .route("/api/contracts/{id}/text", get(contract_text_handler))
        .route(
            "/api/contracts/{id}/annotations",
            get(contract_annotations_handler),
        )
        .route("/api/contracts/download/{id}/{type}", get(download_handler))
        .route("/api/metadata/{id}", get(metadata_handler))
        .route("/api/provinces", get(provinces_handler))
        .route("/api/provinces/all-units", get(provinces_all_units_handler))
        .route("/api/page/{id}", get(page_handler))
        .route("/api/law/{id}", get(law_handler))
        .route("/api/correction/resources", post(correction_resources_handler))
        .route(
            "/api/correction/contract_types",
            post(correction_contract_types_handler),
        )
        .route(
            "/api/correction/document_types",
            post(correction_document_types_handler),
        )
        .route("/storage/{*path}", get(storage_handler))
        .with_state(state)
}

fn parse_id(raw: &str, what: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .map_err(|_| ApiError::BadRequest(format!("{} must be an integer, got {:?}", what, raw)))
}

/// Extract the PDF file name from a stored file url.
fn pdf_filename(file_url: &str) -> Option<&str> {
    let (_, name) = file_url.rsplit_once('/')?;
    (name.len() > ".pdf".len() && name.ends_with(".pdf")).then_some(name)
}

fn export_response(export: ExportFile) -> Response {
    file_response(export.content_type, &export.filename, export.bytes)
}

fn file_response(content_type: &'static str, filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}
