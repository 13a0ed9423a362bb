//! Read path: load a container tree from the store and reassemble one
//! coherent annotation graph.
//!
//! Store-assigned identifiers (container ids, hash URIs, well-known skolem
//! URIs) are re-skolemized back into graph-local blank nodes; external
//! references come back as the URIs they stand in for. The resulting root
//! URI is `{base_uri}/{id}` — stable and deterministic for a given store id
//! and configuration.

use oxigraph::model::{BlankNode, Graph, Literal, NamedNode, NamedOrBlankNode, Term, Triple};
use oxigraph::model::vocab::{rdf, xsd};

use crate::config::Config;
use crate::error::{GraphError, ScholiaResult};
use crate::graph::classify::{classify, BodyOrTarget, Selector};
use crate::graph::{parse_graph, AnnotationGraph, WireFormat};
use crate::ldp::{strip_server_managed, unresolved_genids, LdpStore};
use crate::vocab::{dcterms, ldp, oa};

/// How many rounds of well-known follow-up fetches to attempt before giving
/// up on an incoherent tree. Real trees are 1–2 levels deep.
const MAX_GENID_ROUNDS: usize = 8;

/// A loaded container tree, ready for mapping.
#[derive(Debug, Clone)]
pub struct StoredAnno {
    /// Store-side URI of the root resource.
    pub root_uri: String,
    /// Merged triples: base resource, containers, member resources, and any
    /// followed-up skolemized nodes, with server bookkeeping stripped.
    pub graph: Graph,
    /// Member resource URIs of the body container, in container order.
    pub body_members: Vec<String>,
    /// Member resource URIs of the target container.
    pub target_members: Vec<String>,
}

/// Container-tree → graph mapper.
pub struct ReadMapper<'a> {
    config: &'a Config,
    store: &'a dyn LdpStore,
}

impl<'a> ReadMapper<'a> {
    pub fn new(config: &'a Config, store: &'a dyn LdpStore) -> Self {
        Self { config, store }
    }

    /// Fetch and reassemble one annotation by id.
    pub fn find(&self, id: &str) -> ScholiaResult<AnnotationGraph> {
        let stored = self.load(id)?;
        self.map(&stored, id)
    }

    /// Fetch the container tree: root, body/target containers when present,
    /// each member resource, then follow-up fetches for skolemized nodes
    /// referenced but not yet loaded.
    pub fn load(&self, id: &str) -> ScholiaResult<StoredAnno> {
        let root_uri = format!("{}/{id}", self.config.ldp.url);
        let mut graph = self.get_parsed(&root_uri)?;

        let mut members: [Vec<String>; 2] = [Vec::new(), Vec::new()];
        for (i, slug) in ["b", "t"].into_iter().enumerate() {
            let container_uri = format!("{root_uri}/{slug}");
            if !contains(&graph, &root_uri, &container_uri) {
                continue;
            }
            let container_graph = self.get_parsed(&container_uri)?;
            for member in contained_members(&container_graph, &container_uri) {
                let member_graph = self.get_parsed(&member)?;
                merge(&mut graph, member_graph);
                members[i].push(member);
            }
            merge(&mut graph, container_graph);
        }

        // Nodes two or more levels deep come back as well-known URIs that
        // need their own fetch. Loop to closure, bounded.
        for _ in 0..MAX_GENID_ROUNDS {
            let pending = unresolved_genids(&graph);
            if pending.is_empty() {
                break;
            }
            for uri in pending {
                let followed = self.get_parsed(&uri)?;
                merge(&mut graph, followed);
            }
        }

        strip_server_managed(&mut graph);
        let [body_members, target_members] = members;
        Ok(StoredAnno {
            root_uri,
            graph,
            body_members,
            target_members,
        })
    }

    /// Map a loaded tree to an annotation graph anchored at
    /// `{base_uri}/{id}`.
    pub fn map(&self, stored: &StoredAnno, id: &str) -> ScholiaResult<AnnotationGraph> {
        let store_root = NamedOrBlankNode::NamedNode(NamedNode::new_unchecked(&stored.root_uri));
        let is_annotation = stored
            .graph
            .objects_for_subject_predicate(&store_root, rdf::TYPE)
            .any(|t| t == oxigraph::model::TermRef::NamedNode(oa::ANNOTATION));
        if !is_annotation {
            return Err(GraphError::NoRootNode.into());
        }

        let root = NamedNode::new_unchecked(format!("{}/{id}", self.config.base_uri));
        let mut out = Graph::new();

        // Base statements: everything caller-visible on the stored root,
        // re-anchored at the canonical public URI.
        for t in stored.graph.triples_for_subject(&store_root) {
            out.insert(&Triple::new(
                root.clone(),
                t.predicate.into_owned(),
                t.object.into_owned(),
            ));
        }

        for member in &stored.body_members {
            self.append_member(&stored.graph, member, &mut out, &root, oa::HAS_BODY);
        }
        for member in &stored.target_members {
            self.append_member(&stored.graph, member, &mut out, &root, oa::HAS_TARGET);
        }

        tracing::debug!(id, triples = out.len(), "reassembled annotation");
        Ok(AnnotationGraph::from_graph(out))
    }

    fn append_member(
        &self,
        stored: &Graph,
        member_uri: &str,
        out: &mut Graph,
        parent: &NamedNode,
        relation: oxigraph::model::NamedNodeRef<'_>,
    ) {
        let node = NamedOrBlankNode::NamedNode(NamedNode::new_unchecked(member_uri));
        let classified = classify(stored, &node);
        append_node(
            out,
            &NamedOrBlankNode::NamedNode(parent.clone()),
            relation,
            &classified,
        );
    }

    fn get_parsed(&self, uri: &str) -> ScholiaResult<Graph> {
        let resp = self.store.get(uri, WireFormat::Turtle.media_type())?;
        Ok(parse_graph(
            resp.body.as_bytes(),
            WireFormat::Turtle,
            Some(uri),
        )?)
    }
}

// ---------------------------------------------------------------------------
// Inverse rendering: classified store node → local graph statements
// ---------------------------------------------------------------------------

/// Append one classified node under `parent` via `relation`, re-skolemizing
/// store identifiers into fresh local blank nodes. Exhaustive over the
/// closed variant set, so a node can never silently match no strategy.
fn append_node(
    out: &mut Graph,
    parent: &NamedOrBlankNode,
    relation: oxigraph::model::NamedNodeRef<'_>,
    node: &BodyOrTarget,
) {
    match node {
        BodyOrTarget::PlainExternalUri(uri) => {
            out.insert(&Triple::new(
                parent.clone(),
                relation.into_owned(),
                Term::NamedNode(uri.clone()),
            ));
        }
        BodyOrTarget::ExternalReference { uri, extra } => {
            out.insert(&Triple::new(
                parent.clone(),
                relation.into_owned(),
                Term::NamedNode(uri.clone()),
            ));
            // Metadata persisted on the local stand-in belongs to the
            // external URI in the reassembled graph.
            for t in extra {
                out.insert(&Triple::new(
                    uri.clone(),
                    t.predicate.clone(),
                    t.object.clone(),
                ));
            }
        }
        BodyOrTarget::ContentAsText { statements } => {
            let bn = NamedOrBlankNode::BlankNode(BlankNode::default());
            out.insert(&Triple::new(
                parent.clone(),
                relation.into_owned(),
                node_term(&bn),
            ));
            for t in statements {
                out.insert(&Triple::new(bn.clone(), t.predicate.clone(), t.object.clone()));
            }
        }
        BodyOrTarget::SpecificResource { source, selector } => {
            let bn = NamedOrBlankNode::BlankNode(BlankNode::default());
            out.insert(&Triple::new(
                parent.clone(),
                relation.into_owned(),
                node_term(&bn),
            ));
            out.insert(&Triple::new(
                bn.clone(),
                rdf::TYPE.into_owned(),
                Term::NamedNode(oa::SPECIFIC_RESOURCE.into_owned()),
            ));
            if let Some(source) = source {
                append_node(out, &bn, oa::HAS_SOURCE, source);
            }
            if let Some(selector) = selector {
                append_selector(out, &bn, selector);
            }
        }
        BodyOrTarget::Choice { default, items } => {
            let bn = NamedOrBlankNode::BlankNode(BlankNode::default());
            out.insert(&Triple::new(
                parent.clone(),
                relation.into_owned(),
                node_term(&bn),
            ));
            out.insert(&Triple::new(
                bn.clone(),
                rdf::TYPE.into_owned(),
                Term::NamedNode(oa::CHOICE.into_owned()),
            ));
            if let Some(default) = default {
                append_node(out, &bn, oa::DEFAULT, default);
            }
            for item in items {
                append_node(out, &bn, oa::ITEM, item);
            }
        }
    }
}

fn append_selector(out: &mut Graph, parent: &NamedOrBlankNode, selector: &Selector) {
    let bn = NamedOrBlankNode::BlankNode(BlankNode::default());
    out.insert(&Triple::new(
        parent.clone(),
        oa::HAS_SELECTOR.into_owned(),
        node_term(&bn),
    ));
    match selector {
        Selector::Fragment { value, conforms_to } => {
            out.insert(&Triple::new(
                bn.clone(),
                rdf::TYPE.into_owned(),
                Term::NamedNode(oa::FRAGMENT_SELECTOR.into_owned()),
            ));
            out.insert(&Triple::new(
                bn.clone(),
                rdf::VALUE.into_owned(),
                Term::Literal(Literal::new_simple_literal(value.as_str())),
            ));
            if let Some(conforms_to) = conforms_to {
                out.insert(&Triple::new(
                    bn.clone(),
                    dcterms::CONFORMS_TO.into_owned(),
                    Term::NamedNode(conforms_to.clone()),
                ));
            }
        }
        Selector::TextPosition { start, end } => {
            out.insert(&Triple::new(
                bn.clone(),
                rdf::TYPE.into_owned(),
                Term::NamedNode(oa::TEXT_POSITION_SELECTOR.into_owned()),
            ));
            out.insert(&Triple::new(
                bn.clone(),
                oa::START.into_owned(),
                Term::Literal(Literal::new_typed_literal(
                    start.to_string(),
                    xsd::NON_NEGATIVE_INTEGER,
                )),
            ));
            out.insert(&Triple::new(
                bn.clone(),
                oa::END.into_owned(),
                Term::Literal(Literal::new_typed_literal(
                    end.to_string(),
                    xsd::NON_NEGATIVE_INTEGER,
                )),
            ));
        }
        Selector::TextQuote {
            exact,
            prefix,
            suffix,
        } => {
            out.insert(&Triple::new(
                bn.clone(),
                rdf::TYPE.into_owned(),
                Term::NamedNode(oa::TEXT_QUOTE_SELECTOR.into_owned()),
            ));
            out.insert(&Triple::new(
                bn.clone(),
                oa::EXACT.into_owned(),
                Term::Literal(Literal::new_simple_literal(exact.as_str())),
            ));
            if let Some(prefix) = prefix {
                out.insert(&Triple::new(
                    bn.clone(),
                    oa::PREFIX.into_owned(),
                    Term::Literal(Literal::new_simple_literal(prefix.as_str())),
                ));
            }
            if let Some(suffix) = suffix {
                out.insert(&Triple::new(
                    bn.clone(),
                    oa::SUFFIX.into_owned(),
                    Term::Literal(Literal::new_simple_literal(suffix.as_str())),
                ));
            }
        }
        Selector::Other { statements } => {
            for t in statements {
                out.insert(&Triple::new(bn.clone(), t.predicate.clone(), t.object.clone()));
            }
        }
    }
}

fn node_term(node: &NamedOrBlankNode) -> Term {
    match node {
        NamedOrBlankNode::NamedNode(n) => Term::NamedNode(n.clone()),
        NamedOrBlankNode::BlankNode(b) => Term::BlankNode(b.clone()),
    }
}

// ---------------------------------------------------------------------------
// Containment navigation
// ---------------------------------------------------------------------------

fn contains(graph: &Graph, parent: &str, child: &str) -> bool {
    let parent = NamedNode::new_unchecked(parent);
    let child = NamedNode::new_unchecked(child);
    graph.contains(&Triple::new(parent, ldp::CONTAINS.into_owned(), child))
}

fn contained_members(graph: &Graph, container: &str) -> Vec<String> {
    let container = NamedOrBlankNode::NamedNode(NamedNode::new_unchecked(container));
    graph
        .objects_for_subject_predicate(&container, ldp::CONTAINS)
        .filter_map(|t| match t {
            oxigraph::model::TermRef::NamedNode(n) => Some(n.as_str().to_string()),
            _ => None,
        })
        .collect()
}

fn merge(into: &mut Graph, from: Graph) {
    for t in from.iter() {
        into.insert(t);
    }
}
