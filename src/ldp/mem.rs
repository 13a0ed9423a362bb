//! In-memory LDP store with store-faithful create semantics.
//!
//! Mimics the behaviors the mappers depend on: id assignment under a parent
//! container, resolution of null-relative and hash-fragment subjects against
//! the assigned URI, skolemization of blank nodes to `.well-known/genid/`
//! URIs fetchable as their own resources, containment triples on GET, and
//! recursive (prefix-exact) delete. All data is lost on drop.

use std::collections::BTreeMap;
use std::sync::Mutex;

use oxigraph::model::{BlankNode, Graph, NamedNode, NamedOrBlankNode, Triple};

use crate::error::StorageError;
use crate::graph::{parse_graph, serialize_graph, WireFormat};
use crate::vocab::ldp;

use super::{rewrite_node, LdpResponse, LdpStore};

/// In-memory implementation of the store contract.
pub struct MemLdpStore {
    root: String,
    inner: Mutex<Inner>,
}

struct Inner {
    resources: BTreeMap<String, Graph>,
    counter: u64,
}

impl MemLdpStore {
    /// Create an empty store whose root container answers at `root_url`.
    pub fn new(root_url: &str) -> Self {
        Self {
            root: root_url.trim_end_matches('/').to_string(),
            inner: Mutex::new(Inner {
                resources: BTreeMap::new(),
                counter: 0,
            }),
        }
    }

    /// The root container URL.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Whether a resource exists (test hook).
    pub fn contains(&self, uri: &str) -> bool {
        self.inner.lock().unwrap().resources.contains_key(uri)
    }

    /// Number of stored resources, skolemized nodes included (test hook).
    pub fn resource_count(&self) -> usize {
        self.inner.lock().unwrap().resources.len()
    }
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }
}

impl LdpStore for MemLdpStore {
    fn post(
        &self,
        parent: &str,
        slug: Option<&str>,
        _content_type: &str,
        body: &str,
    ) -> Result<LdpResponse, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if parent != self.root && !inner.resources.contains_key(parent) {
            return Err(StorageError::Http {
                status: 404,
                body: format!("no such container: {parent}"),
            });
        }

        let uri = match slug {
            Some(slug) => {
                let candidate = format!("{parent}/{slug}");
                if inner.resources.contains_key(&candidate) {
                    return Err(StorageError::Http {
                        status: 409,
                        body: format!("resource already exists: {candidate}"),
                    });
                }
                candidate
            }
            None => {
                let id = inner.next_id();
                format!("{parent}/r{id:04x}")
            }
        };

        let mut graph =
            parse_graph(body.as_bytes(), WireFormat::Turtle, Some(&uri)).map_err(|e| {
                StorageError::Http {
                    status: 400,
                    body: e.to_string(),
                }
            })?;

        // Skolemize blank nodes the way an LDP server does.
        let blanks: Vec<BlankNode> = {
            let mut seen = Vec::new();
            for t in graph.iter() {
                if let oxigraph::model::NamedOrBlankNodeRef::BlankNode(b) = t.subject {
                    if !seen.contains(&b.into_owned()) {
                        seen.push(b.into_owned());
                    }
                }
                if let oxigraph::model::TermRef::BlankNode(b) = t.object {
                    if !seen.contains(&b.into_owned()) {
                        seen.push(b.into_owned());
                    }
                }
            }
            seen
        };
        for blank in blanks {
            let id = inner.next_id();
            let genid = NamedNode::new_unchecked(format!(
                "{}/.well-known/genid/{id:08x}",
                self.root
            ));
            rewrite_node(
                &mut graph,
                &NamedOrBlankNode::BlankNode(blank),
                &NamedOrBlankNode::NamedNode(genid),
            );
        }

        // Triples about skolemized nodes become their own resources,
        // requiring a follow-up fetch; everything else stays inline.
        let mut main = Graph::new();
        let mut genid_graphs: BTreeMap<String, Graph> = BTreeMap::new();
        for t in graph.iter() {
            let subject_iri = match t.subject {
                oxigraph::model::NamedOrBlankNodeRef::NamedNode(n) => n.as_str().to_string(),
                oxigraph::model::NamedOrBlankNodeRef::BlankNode(_) => String::new(),
            };
            if super::is_well_known_genid(&subject_iri) {
                genid_graphs
                    .entry(subject_iri)
                    .or_default()
                    .insert(&Triple::from(t.into_owned()));
            } else {
                main.insert(&Triple::from(t.into_owned()));
            }
        }

        inner.resources.insert(uri.clone(), main);
        for (genid_uri, genid_graph) in genid_graphs {
            inner.resources.insert(genid_uri, genid_graph);
        }

        Ok(LdpResponse {
            status: 201,
            location: Some(uri),
            body: String::new(),
        })
    }

    fn get(&self, path: &str, _accept: &str) -> Result<LdpResponse, StorageError> {
        let inner = self.inner.lock().unwrap();
        let Some(stored) = inner.resources.get(path) else {
            return Err(StorageError::Http {
                status: 404,
                body: format!("not found: {path}"),
            });
        };
        let mut graph = stored.clone();

        // Synthesize containment for direct children.
        let subject = NamedNode::new_unchecked(path);
        let child_prefix = format!("{path}/");
        for key in inner.resources.keys() {
            if let Some(rest) = key.strip_prefix(&child_prefix) {
                if !rest.is_empty() && !rest.contains('/') && !rest.contains('#') {
                    graph.insert(&Triple::new(
                        subject.clone(),
                        ldp::CONTAINS.into_owned(),
                        NamedNode::new_unchecked(key),
                    ));
                }
            }
        }

        let body = serialize_graph(&graph, WireFormat::Turtle).map_err(|e| {
            StorageError::Http {
                status: 500,
                body: e.to_string(),
            }
        })?;
        Ok(LdpResponse {
            status: 200,
            location: None,
            body,
        })
    }

    fn delete(&self, path: &str) -> Result<LdpResponse, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.resources.contains_key(path) {
            return Err(StorageError::Http {
                status: 404,
                body: format!("not found: {path}"),
            });
        }
        // Prefix-exact: `{path}/` and `{path}#` descendants go, siblings that
        // merely share a string prefix stay.
        let slash = format!("{path}/");
        let hash = format!("{path}#");
        inner
            .resources
            .retain(|k, _| k != path && !k.starts_with(&slash) && !k.starts_with(&hash));
        Ok(LdpResponse {
            status: 204,
            location: None,
            body: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "http://store.test/rest/anno";

    #[test]
    fn post_assigns_id_and_resolves_relative_subjects() {
        let store = MemLdpStore::new(ROOT);
        let resp = store
            .post(
                ROOT,
                None,
                "text/turtle",
                r#"<> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type>
                       <http://www.w3.org/ns/oa#Annotation> ."#,
            )
            .unwrap();
        assert_eq!(resp.status, 201);
        let uri = resp.location.unwrap();
        assert!(uri.starts_with(ROOT));

        let fetched = store.get(&uri, "text/turtle").unwrap();
        assert!(fetched.body.contains(&uri));
    }

    #[test]
    fn slug_collision_conflicts() {
        let store = MemLdpStore::new(ROOT);
        store.post(ROOT, Some("x"), "text/turtle", "").unwrap();
        let err = store.post(ROOT, Some("x"), "text/turtle", "").unwrap_err();
        assert!(matches!(err, StorageError::Http { status: 409, .. }));
    }

    #[test]
    fn blank_nodes_are_skolemized_to_fetchable_resources() {
        let store = MemLdpStore::new(ROOT);
        let resp = store
            .post(
                ROOT,
                None,
                "text/turtle",
                r#"@prefix oa: <http://www.w3.org/ns/oa#> .
                   <> oa:hasSelector [ a oa:TextQuoteSelector ; oa:exact "hi" ] ."#,
            )
            .unwrap();
        let uri = resp.location.unwrap();
        let fetched = store.get(&uri, "text/turtle").unwrap();
        assert!(fetched.body.contains(".well-known/genid/"));
        // The skolemized node's own triples need a follow-up fetch.
        assert!(!fetched.body.contains("TextQuoteSelector"));

        let graph = crate::graph::parse_graph(
            fetched.body.as_bytes(),
            WireFormat::Turtle,
            None,
        )
        .unwrap();
        let pending = crate::ldp::unresolved_genids(&graph);
        assert_eq!(pending.len(), 1);
        let followed = store.get(&pending[0], "text/turtle").unwrap();
        assert!(followed.body.contains("TextQuoteSelector"));
    }

    #[test]
    fn containment_is_synthesized_for_direct_children_only() {
        let store = MemLdpStore::new(ROOT);
        let anno = store
            .post(ROOT, None, "text/turtle", "")
            .unwrap()
            .location
            .unwrap();
        store.post(&anno, Some("t"), "text/turtle", "").unwrap();
        store
            .post(&format!("{anno}/t"), None, "text/turtle", "")
            .unwrap();

        let fetched = store.get(&anno, "text/turtle").unwrap();
        assert!(fetched.body.contains(&format!("{anno}/t")));
        // Grandchild is contained by /t, not by the root resource.
        let root_graph =
            crate::graph::parse_graph(fetched.body.as_bytes(), WireFormat::Turtle, None).unwrap();
        let contains_count = root_graph
            .iter()
            .filter(|t| t.predicate == crate::vocab::ldp::CONTAINS)
            .count();
        assert_eq!(contains_count, 1);
    }

    #[test]
    fn delete_is_recursive_but_prefix_exact() {
        let store = MemLdpStore::new(ROOT);
        let anno = store
            .post(ROOT, None, "text/turtle", "")
            .unwrap()
            .location
            .unwrap();
        store.post(&anno, Some("t"), "text/turtle", "").unwrap();
        let t_child = store
            .post(&format!("{anno}/t"), None, "text/turtle", "")
            .unwrap()
            .location
            .unwrap();

        // Deleting the child must not delete its parent container.
        store.delete(&t_child).unwrap();
        assert!(store.contains(&format!("{anno}/t")));
        assert!(store.contains(&anno));

        // Deleting the root takes the subtree with it.
        store.delete(&anno).unwrap();
        assert!(!store.contains(&format!("{anno}/t")));
        assert_eq!(store.resource_count(), 0);
    }

    #[test]
    fn missing_resource_is_a_structured_404() {
        let store = MemLdpStore::new(ROOT);
        let err = store.get("http://store.test/rest/anno/nope", "text/turtle");
        assert!(matches!(
            err,
            Err(StorageError::Http { status: 404, .. })
        ));
    }
}
