//! LDP store client contract and shared plumbing.
//!
//! The mappers never speak HTTP themselves; they go through the [`LdpStore`]
//! trait. [`http::HttpLdpStore`] is the real client, [`mem::MemLdpStore`] is
//! an in-memory stand-in with store-faithful id assignment and skolemization,
//! used by tests and dry runs.

pub mod http;
pub mod mem;

use oxigraph::model::{Graph, NamedOrBlankNode, Term, Triple};
use oxigraph::model::vocab::rdf;

use crate::error::StorageError;
use crate::vocab::{SERVER_MANAGED_NS, WELL_KNOWN_GENID};

/// Result of one store call. Non-2xx responses never reach this type; they
/// surface as [`StorageError::Http`].
#[derive(Debug, Clone)]
pub struct LdpResponse {
    pub status: u16,
    /// `Location` header of a create response.
    pub location: Option<String>,
    pub body: String,
}

/// The narrow HTTP contract the mappers consume.
///
/// All paths are absolute resource URIs. One call is one blocking network
/// round trip; implementations do not retry.
pub trait LdpStore {
    /// POST a new resource into `parent`. `slug` is the requested path
    /// segment; the store may honor or replace it. Answers 201 with the
    /// assigned URI in `location`.
    fn post(
        &self,
        parent: &str,
        slug: Option<&str>,
        content_type: &str,
        body: &str,
    ) -> Result<LdpResponse, StorageError>;

    /// GET a resource representation.
    fn get(&self, path: &str, accept: &str) -> Result<LdpResponse, StorageError>;

    /// DELETE a resource (and, per LDP, everything it contains).
    fn delete(&self, path: &str) -> Result<LdpResponse, StorageError>;
}

/// Whether a URI is a store-skolemized blank node.
pub fn is_well_known_genid(uri: &str) -> bool {
    uri.contains(WELL_KNOWN_GENID)
}

/// Remove server-managed bookkeeping triples from a fetched representation:
/// statements whose predicate lives in a bookkeeping namespace, and
/// `rdf:type` statements pointing into one.
pub fn strip_server_managed(graph: &mut Graph) {
    let doomed: Vec<Triple> = graph
        .iter()
        .filter(|t| {
            let pred_ns = SERVER_MANAGED_NS
                .iter()
                .any(|ns| t.predicate.as_str().starts_with(ns));
            let type_ns = t.predicate == rdf::TYPE
                && matches!(
                    t.object,
                    oxigraph::model::TermRef::NamedNode(n)
                        if SERVER_MANAGED_NS.iter().any(|ns| n.as_str().starts_with(ns))
                );
            pred_ns || type_ns
        })
        .map(|t| t.into_owned())
        .collect();
    for t in &doomed {
        graph.remove(t);
    }
}

/// Object URIs referenced in the graph that are skolemized blank nodes with
/// no statements of their own yet — the ones needing a follow-up fetch.
pub fn unresolved_genids(graph: &Graph) -> Vec<String> {
    let mut pending: Vec<String> = Vec::new();
    for triple in graph.iter() {
        if let oxigraph::model::TermRef::NamedNode(n) = triple.object {
            if is_well_known_genid(n.as_str())
                && graph.triples_for_subject(n).next().is_none()
                && !pending.iter().any(|p| p == n.as_str())
            {
                pending.push(n.as_str().to_string());
            }
        }
    }
    pending
}

/// Replace every occurrence of `from` (as subject or object) with `to`.
pub fn rewrite_node(graph: &mut Graph, from: &NamedOrBlankNode, to: &NamedOrBlankNode) {
    let from_term = term_from_node(from);
    let affected: Vec<Triple> = graph
        .iter()
        .filter(|t| t.subject == from.as_ref() || t.object == from_term.as_ref())
        .map(|t| t.into_owned())
        .collect();
    for old in affected {
        graph.remove(&old);
        let subject = if old.subject == *from {
            to.clone()
        } else {
            old.subject
        };
        let object = if old.object == from_term {
            term_from_node(to)
        } else {
            old.object
        };
        graph.insert(&Triple::new(subject, old.predicate, object));
    }
}

fn term_from_node(node: &NamedOrBlankNode) -> Term {
    match node {
        NamedOrBlankNode::NamedNode(n) => Term::NamedNode(n.clone()),
        NamedOrBlankNode::BlankNode(b) => Term::BlankNode(b.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{parse_graph, WireFormat};

    #[test]
    fn genid_detection() {
        assert!(is_well_known_genid(
            "http://store/rest/.well-known/genid/abc123"
        ));
        assert!(!is_well_known_genid("http://store/rest/anno/x"));
    }

    #[test]
    fn strips_ldp_and_repository_triples() {
        let mut graph = parse_graph(
            br#"
            @prefix ldp: <http://www.w3.org/ns/ldp#> .
            @prefix oa: <http://www.w3.org/ns/oa#> .
            @prefix fedora: <http://fedora.info/definitions/v4/repository#> .
            <http://s/anno/1> a oa:Annotation, ldp:BasicContainer ;
                ldp:contains <http://s/anno/1/t> ;
                fedora:lastModified "2015-01-01T00:00:00Z" ;
                oa:motivatedBy oa:commenting .
            "#,
            WireFormat::Turtle,
            None,
        )
        .unwrap();
        strip_server_managed(&mut graph);
        assert_eq!(graph.len(), 2); // type Annotation + motivatedBy survive
    }

    #[test]
    fn unresolved_genids_ignores_resolved_ones() {
        let graph = parse_graph(
            br#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            <http://s/t/1> oa:hasSelector <http://s/.well-known/genid/g1> ;
                oa:hasSource <http://s/.well-known/genid/g2> .
            <http://s/.well-known/genid/g2> a oa:SpecificResource .
            "#,
            WireFormat::Turtle,
            None,
        )
        .unwrap();
        let pending = unresolved_genids(&graph);
        assert_eq!(pending, vec!["http://s/.well-known/genid/g1".to_string()]);
    }
}
