//! Solr-style search client with bounded retry.
//!
//! The retry policy lives here and only here: the mappers treat search
//! failures as terminal. Each operation retries up to
//! `SearchConfig::max_attempts` times with exponential backoff before
//! surfacing a [`SearchError`].

use std::time::Duration;

use serde_json::Value;

use crate::config::SearchConfig;
use crate::error::SearchError;

use super::{SearchDocument, SearchQuery};

/// Search service client.
pub struct SolrClient {
    config: SearchConfig,
    agent: ureq::Agent,
}

impl SolrClient {
    pub fn new(config: &SearchConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            config: config.clone(),
            agent,
        }
    }

    /// Add (or replace) one document in the index.
    pub fn add(&self, doc: &SearchDocument) -> Result<(), SearchError> {
        self.with_retries("add", || {
            let url = format!("{}/update?commit=true", self.config.url);
            self.agent
                .post(&url)
                .send_json(serde_json::json!([doc]))
                .map_err(map_err)?;
            Ok(())
        })
    }

    /// Remove one document by id.
    pub fn delete(&self, id: &str) -> Result<(), SearchError> {
        self.with_retries("delete", || {
            let url = format!("{}/update?commit=true", self.config.url);
            self.agent
                .post(&url)
                .send_json(serde_json::json!({ "delete": { "id": id } }))
                .map_err(map_err)?;
            Ok(())
        })
    }

    /// Run a query, returning the raw result documents.
    pub fn query(&self, query: &SearchQuery) -> Result<Vec<Value>, SearchError> {
        let q = query.to_query_string();
        self.with_retries("query", || {
            let url = format!("{}/select", self.config.url);
            let resp = self
                .agent
                .get(&url)
                .query("q", &q)
                .query("wt", "json")
                .call()
                .map_err(map_err)?;
            let json: Value = resp.into_json().map_err(|e| SearchError::Response {
                message: e.to_string(),
            })?;
            match json.pointer("/response/docs") {
                Some(Value::Array(docs)) => Ok(docs.clone()),
                _ => Err(SearchError::Response {
                    message: "missing response.docs in search answer".into(),
                }),
            }
        })
    }

    fn with_retries<T>(
        &self,
        op: &str,
        f: impl Fn() -> Result<T, SearchError>,
    ) -> Result<T, SearchError> {
        let mut attempt = 1;
        loop {
            match f() {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.config.max_attempts => {
                    tracing::error!(op, attempt, error = %e, "search operation exhausted retries");
                    return Err(e);
                }
                Err(e) => {
                    let sleep = self.config.sleep_for_attempt(attempt);
                    tracing::warn!(
                        op,
                        attempt,
                        sleep_ms = sleep.as_millis() as u64,
                        error = %e,
                        "search operation failed; retrying"
                    );
                    std::thread::sleep(sleep);
                    attempt += 1;
                }
            }
        }
    }
}

fn map_err(err: ureq::Error) -> SearchError {
    match err {
        ureq::Error::Status(status, resp) => SearchError::Http {
            status,
            body: resp.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(t) => SearchError::Transport {
            message: t.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_count_respects_max_attempts() {
        let config = SearchConfig {
            max_attempts: 3,
            base_sleep_ms: 0,
            max_sleep_ms: 0,
            ..Default::default()
        };
        let client = SolrClient::new(&config);
        let calls = std::cell::Cell::new(0u32);
        let result: Result<(), SearchError> = client.with_retries("test", || {
            calls.set(calls.get() + 1);
            Err(SearchError::Transport {
                message: "down".into(),
            })
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn success_short_circuits_retries() {
        let config = SearchConfig {
            max_attempts: 5,
            base_sleep_ms: 0,
            ..Default::default()
        };
        let client = SolrClient::new(&config);
        let result = client.with_retries("test", || Ok(7));
        assert_eq!(result.unwrap(), 7);
    }
}
