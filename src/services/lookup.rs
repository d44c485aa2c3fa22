// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Relational lookups for administrative units and static pages.
//!
//! The pool is built once at startup and shared read-only across requests.

use crate::error::ApiError;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use std::collections::HashMap;

/// A province or district row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Province {
    pub id: i32,
    pub name: String,
    #[serde(rename = "parentId")]
    pub parent_id: i32,
    #[serde(rename = "type")]
    pub unit_type: i32,
}

/// A static page or law text with its title.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PageContent {
    pub title: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

/// Province, page and law lookups backed by Postgres.
pub struct LookupStore {
    pool: PgPool,
}

impl LookupStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All administrative units (provinces and districts) keyed by id.
    pub async fn provinces_all_units(&self) -> Result<HashMap<i32, String>, ApiError> {
        let rows: Vec<(i32, String)> =
            sqlx::query_as("select id, name from mongolian_provinces order by name asc")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    /// Top-level provinces, or the districts of one province when
    /// `parent_id` is given.
    pub async fn provinces(&self, parent_id: Option<i32>) -> Result<Vec<Province>, ApiError> {
        let provinces = match parent_id {
            None => {
                sqlx::query_as(
                    "select id, name, parent_id, type as unit_type
                     from mongolian_provinces where type = $1 order by name asc",
                )
                .bind(1)
                .fetch_all(&self.pool)
                .await?
            }
            Some(parent) => {
                sqlx::query_as(
                    "select id, name, parent_id, type as unit_type
                     from mongolian_provinces where type = $1 and parent_id = $2 order by name asc",
                )
                .bind(2)
                .bind(parent)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(provinces)
    }

    /// One static page in the given locale.
    pub async fn page(&self, page_id: i32, locale: &str) -> Result<PageContent, ApiError> {
        let page = sqlx::query_as(
            "select t.value as title, c.value as content, c.created_at
             from page_title_contents ptc
             join title t on t.id = ptc.title_id
             join content c on ptc.content_id = c.id
             where c.language = $2 and ptc.page_id = $1",
        )
        .bind(page_id)
        .bind(locale)
        .fetch_optional(&self.pool)
        .await?;
        page.ok_or(ApiError::NotFound)
    }

    /// One law text in the given locale.
    pub async fn law(&self, legal_id: i32, locale: &str) -> Result<PageContent, ApiError> {
        let page = sqlx::query_as(
            "select t.value as title, c.value as content, c.created_at
             from legal_title_contents ptc
             join title t on t.id = ptc.title_id
             join content c on ptc.content_id = c.id
             where c.language = $2 and ptc.legal_id = $1",
        )
        .bind(legal_id)
        .bind(locale)
        .fetch_optional(&self.pool)
        .await?;
        page.ok_or(ApiError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    async fn create_test_store() -> LookupStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("Failed to connect to Postgres");
        LookupStore::new(pool)
    }

    #[tokio::test]
    #[ignore] // Requires Postgres connection
    async fn test_all_units_keyed_by_id() {
        let store = create_test_store().await;
        let units = store.provinces_all_units().await.expect("query failed");
        assert!(!units.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires Postgres connection
    async fn test_districts_scoped_to_parent() {
        let store = create_test_store().await;
        let provinces = store.provinces(None).await.expect("query failed");
        assert!(provinces.iter().all(|p| p.unit_type == 1));

        if let Some(first) = provinces.first() {
            let districts = store.provinces(Some(first.id)).await.expect("query failed");
            assert!(districts.iter().all(|d| d.parent_id == first.id));
        }
    }

    #[tokio::test]
    #[ignore] // Requires Postgres connection
    async fn test_missing_page_is_not_found() {
        let store = create_test_store().await;
        let err = store.page(-1, "mn").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }
}
