// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Thin Elasticsearch client for the contract index.
//!
//! Every call is one blocking round trip with no retry: connection failures
//! surface as [`IndexError::Unavailable`], non-2xx responses as
//! [`IndexError::Status`], a missing document as [`IndexError::NotFound`].
//! The client is constructed once at startup and shared via `Arc`.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),
    #[error("document not found")]
    NotFound,
    #[error("index returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Elasticsearch client bound to one index.
pub struct ElasticClient {
    http: reqwest::Client,
    base_url: String,
    index: String,
    username: Option<String>,
    password: Option<String>,
}

impl ElasticClient {
    /// Create a client for `index` on the given host.
    pub fn new(
        host: &str,
        index: String,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        // Accept both bare host:port and full URLs.
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", host.trim_end_matches('/'))
        };

        Self {
            http: reqwest::Client::new(),
            base_url,
            index,
            username,
            password,
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Execute a search against one document type and return the raw body.
    pub async fn search(&self, doc_type: &str, body: &Value) -> Result<Value, IndexError> {
        let url = format!("{}/{}/{}/_search", self.base_url, self.index, doc_type);
        self.execute(self.http.post(&url).json(body)).await
    }

    /// Fetch a document by id. A missing document is `NotFound`, not an
    /// upstream error.
    pub async fn get(&self, doc_type: &str, id: &str) -> Result<Value, IndexError> {
        let url = format!("{}/{}/{}/{}", self.base_url, self.index, doc_type, id);
        let response = self.execute(self.http.get(&url)).await;
        match response {
            Ok(doc) if doc.get("found").and_then(Value::as_bool) == Some(false) => {
                Err(IndexError::NotFound)
            }
            Ok(doc) => Ok(doc),
            Err(IndexError::Status { status: 404, .. }) => Err(IndexError::NotFound),
            Err(err) => Err(err),
        }
    }

    /// Count documents of one type.
    pub async fn count(&self, doc_type: &str) -> Result<u64, IndexError> {
        let url = format!("{}/{}/{}/_count", self.base_url, self.index, doc_type);
        let body = self.execute(self.http.get(&url)).await?;
        Ok(body.get("count").and_then(Value::as_u64).unwrap_or(0))
    }

    /// Run an update-by-query and return the number of updated documents.
    pub async fn update_by_query(&self, doc_type: &str, body: &Value) -> Result<u64, IndexError> {
        let url = format!(
            "{}/{}/{}/_update_by_query",
            self.base_url, self.index, doc_type
        );
        let body = self.execute(self.http.post(&url).json(body)).await?;
        Ok(body.get("updated").and_then(Value::as_u64).unwrap_or(0))
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, IndexError> {
        let request = match (&self.username, &self.password) {
            (Some(user), password) => request.basic_auth(user, password.as_deref()),
            _ => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_host_gets_http_scheme() {
        let client = ElasticClient::new("localhost:9200", "contracts".to_string(), None, None);
        assert_eq!(client.base_url, "http://localhost:9200");
    }

    #[test]
    fn test_full_url_kept_without_trailing_slash() {
        let client = ElasticClient::new(
            "https://es.internal:9200/",
            "contracts".to_string(),
            None,
            None,
        );
        assert_eq!(client.base_url, "https://es.internal:9200");
    }

    #[tokio::test]
    #[ignore] // Requires Elasticsearch running
    async fn test_count_live() {
        let client = ElasticClient::new("127.0.0.1:9200", "contracts".to_string(), None, None);
        let count = client.count("master").await.expect("count failed");
        assert!(count > 0);
    }

    #[tokio::test]
    #[ignore] // Requires Elasticsearch running
    async fn test_match_all_search_live() {
        let client = ElasticClient::new("127.0.0.1:9200", "contracts".to_string(), None, None);
        let body = json!({ "query": { "match_all": {} }, "size": 1 });
        let result = client.search("master", &body).await.expect("search failed");
        assert!(result["hits"]["total"].is_number());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unavailable() {
        let client = ElasticClient::new("127.0.0.1:1", "contracts".to_string(), None, None);
        let err = client.count("master").await.unwrap_err();
        assert!(matches!(err, IndexError::Unavailable(_)));
    }
}
