//! ureq-backed LDP store client.
//!
//! One blocking call per operation, no retries. Non-2xx answers become
//! [`StorageError::Http`] carrying the upstream status and body verbatim so
//! the caller can proxy them.

use std::time::Duration;

use crate::config::LdpConfig;
use crate::error::StorageError;

use super::{LdpResponse, LdpStore};

/// HTTP implementation of the store contract.
pub struct HttpLdpStore {
    agent: ureq::Agent,
}

impl HttpLdpStore {
    pub fn new(config: &LdpConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self { agent }
    }

    fn into_response(resp: ureq::Response) -> Result<LdpResponse, StorageError> {
        let status = resp.status();
        let location = resp.header("Location").map(str::to_string);
        let body = resp.into_string().map_err(|e| StorageError::Transport {
            message: format!("failed to read response body: {e}"),
        })?;
        Ok(LdpResponse {
            status,
            location,
            body,
        })
    }

    fn map_err(err: ureq::Error) -> StorageError {
        match err {
            ureq::Error::Status(status, resp) => StorageError::Http {
                status,
                body: resp.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(t) => StorageError::Transport {
                message: t.to_string(),
            },
        }
    }
}

impl LdpStore for HttpLdpStore {
    fn post(
        &self,
        parent: &str,
        slug: Option<&str>,
        content_type: &str,
        body: &str,
    ) -> Result<LdpResponse, StorageError> {
        tracing::debug!(parent, ?slug, "ldp post");
        let mut request = self.agent.post(parent).set("Content-Type", content_type);
        if let Some(slug) = slug {
            request = request.set("Slug", slug);
        }
        let resp = request.send_string(body).map_err(Self::map_err)?;
        Self::into_response(resp)
    }

    fn get(&self, path: &str, accept: &str) -> Result<LdpResponse, StorageError> {
        tracing::debug!(path, "ldp get");
        let resp = self
            .agent
            .get(path)
            .set("Accept", accept)
            .call()
            .map_err(Self::map_err)?;
        Self::into_response(resp)
    }

    fn delete(&self, path: &str) -> Result<LdpResponse, StorageError> {
        tracing::debug!(path, "ldp delete");
        let resp = self.agent.delete(path).call().map_err(Self::map_err)?;
        Self::into_response(resp)
    }
}
