// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Process configuration, read once from the environment at startup.

use anyhow::{anyhow, Result};
use std::env;

/// Application configuration assembled from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Elasticsearch base URL, e.g. `http://localhost:9200`.
    pub elasticsearch_host: String,
    pub elasticsearch_username: Option<String>,
    pub elasticsearch_password: Option<String>,
    /// Index holding contract documents and annotations.
    pub index: String,
    pub doc_master: String,
    pub doc_metadata: String,
    pub doc_annotations: String,
    /// Postgres connection string for province/page lookups.
    pub database_url: String,
    /// Public base URL used when rewriting file links in exports.
    pub public_url: String,
    /// Local directory holding the contract PDF files.
    pub storage_path: String,
    /// Directory with the DOCX container skeleton (Content_Types, rels, ...).
    pub template_path: String,
    /// Origin allowed to fetch stored files, if any.
    pub front_end_url: Option<String>,
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let elasticsearch_host = require("ELASTICSEARCH_HOST")?;
        let index = require("ELASTICSEARCH_INDEX")?;
        let database_url = require("DATABASE_URL")?;
        let public_url = require("PUBLIC_URL")?;
        let storage_path = require("STORAGE_PATH")?;
        let template_path = require("TEMPLATE_PATH")?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow!("PORT must be a valid port number"))?;

        Ok(Self {
            elasticsearch_host,
            elasticsearch_username: env::var("ELASTICSEARCH_USERNAME").ok(),
            elasticsearch_password: env::var("ELASTICSEARCH_PASSWORD").ok(),
            index,
            doc_master: env::var("ELASTICSEARCH_DOC_MASTER").unwrap_or_else(|_| "master".to_string()),
            doc_metadata: env::var("ELASTICSEARCH_DOC_METADATA")
                .unwrap_or_else(|_| "metadata".to_string()),
            doc_annotations: env::var("ELASTICSEARCH_DOC_ANNOTATIONS")
                .unwrap_or_else(|_| "annotations".to_string()),
            database_url,
            public_url,
            storage_path,
            template_path,
            front_end_url: env::var("FRONT_END_URL").ok(),
            port,
        })
    }
}

fn require(key: &str) -> Result<String> {
    env::var(key).map_err(|_| anyhow!("{} environment variable not set", key))
}
