//! Repository facade: the glue the CLI and callers drive.
//!
//! `AnnotationRepo` owns the configuration, an LDP store client, and an
//! optional search client; it contains no mapping logic of its own.

use serde_json::Value;

use crate::config::Config;
use crate::error::{ScholiaResult, StorageError};
use crate::graph::AnnotationGraph;
use crate::ldp::http::HttpLdpStore;
use crate::ldp::LdpStore;
use crate::mapper::{CreatedAnno, ReadMapper, WriteMapper};
use crate::search::{graph_to_search_doc, params_to_search_query, SolrClient};

/// Annotation repository over one LDP store and one search core.
pub struct AnnotationRepo {
    config: Config,
    store: Box<dyn LdpStore>,
    search: Option<SolrClient>,
}

impl AnnotationRepo {
    /// Connect to the configured store and search service.
    pub fn new(config: Config) -> ScholiaResult<Self> {
        config.validate()?;
        let store = Box::new(HttpLdpStore::new(&config.ldp));
        let search = Some(SolrClient::new(&config.search));
        Ok(Self {
            config,
            store,
            search,
        })
    }

    /// Use a caller-provided store and no search indexing. Used by tests and
    /// dry runs.
    pub fn with_store(config: Config, store: Box<dyn LdpStore>) -> ScholiaResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            search: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Persist an annotation, read it back, and index the projection.
    /// Returns the assigned ids.
    pub fn create(&self, anno: &AnnotationGraph) -> ScholiaResult<CreatedAnno> {
        let created = WriteMapper::new(&self.config, self.store.as_ref()).create(anno)?;
        if let Some(search) = &self.search {
            let persisted = self.find(&created.id)?;
            let doc = graph_to_search_doc(&persisted, &self.config)?;
            search.add(&doc)?;
        }
        Ok(created)
    }

    /// Load one annotation by id.
    pub fn find(&self, id: &str) -> ScholiaResult<AnnotationGraph> {
        ReadMapper::new(&self.config, self.store.as_ref()).find(id)
    }

    /// Delete one annotation (the store removes the contained tree) and its
    /// index entry. The id must resolve inside the configured store root.
    pub fn delete(&self, id: &str) -> ScholiaResult<()> {
        let id = id.trim_matches('/');
        if id.is_empty() || id.split('/').any(|seg| seg.is_empty() || seg == "..") {
            return Err(StorageError::NotContained {
                uri: id.to_string(),
                root: self.config.ldp.url.clone(),
            }
            .into());
        }
        let uri = format!("{}/{id}", self.config.ldp.url);
        self.store.delete(&uri)?;
        tracing::info!(id, "deleted annotation");
        if let Some(search) = &self.search {
            search.delete(id)?;
        }
        Ok(())
    }

    /// Run a parameterized search, returning raw result documents.
    pub fn search(&self, params: &[(String, String)]) -> ScholiaResult<Vec<Value>> {
        let Some(search) = &self.search else {
            return Ok(Vec::new());
        };
        let query = params_to_search_query(params);
        Ok(search.query(&query)?)
    }
}
