//! Write path: decompose one annotation graph into a tree of LDP resources.
//!
//! The root becomes a container-assigned resource, bodies and targets become
//! leaf resources inside `b`/`t` direct containers, nested sub-nodes one
//! level deep are emitted as relative hash-fragment subjects, and anything
//! deeper stays a blank node for the store to skolemize. Store calls are
//! strictly sequential: each one references an id returned by the previous.

use oxigraph::model::{
    BlankNode, Graph, Literal, NamedNode, NamedOrBlankNode, Term, Triple,
};
use oxigraph::model::vocab::{rdf, xsd};

use crate::config::Config;
use crate::error::{GraphError, ScholiaResult, StorageError, ValidationError};
use crate::graph::classify::{classify, BodyOrTarget, Selector};
use crate::graph::{serialize_graph, AnnotationGraph, WireFormat};
use crate::ldp::{rewrite_node, LdpStore};
use crate::vocab::{ldp, oa, scholia};

/// Ids assigned by the store for one created annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAnno {
    /// Root id, relative to the configured LDP root (may contain `/`).
    pub id: String,
    /// Per-resource ids created in the body container.
    pub body_ids: Vec<String>,
    /// Per-resource ids created in the target container.
    pub target_ids: Vec<String>,
}

/// Graph → container-tree mapper.
pub struct WriteMapper<'a> {
    config: &'a Config,
    store: &'a dyn LdpStore,
}

impl<'a> WriteMapper<'a> {
    pub fn new(config: &'a Config, store: &'a dyn LdpStore) -> Self {
        Self { config, store }
    }

    /// Persist one annotation. Validation happens before the first store
    /// call; there is no rollback if a later step fails (the orphaned root
    /// id is logged and the error surfaces verbatim).
    pub fn create(&self, anno: &AnnotationGraph) -> ScholiaResult<CreatedAnno> {
        let root = anno.root().ok_or(GraphError::NoRootNode)?;
        validate(anno, &root)?;

        let id = self.create_base(anno, &root)?;
        let root_uri = format!("{}/{id}", self.config.ldp.url);

        let result = self.create_members(anno, &root, &root_uri);
        match result {
            Ok((body_ids, target_ids)) => {
                tracing::info!(
                    id = %id,
                    bodies = body_ids.len(),
                    targets = target_ids.len(),
                    "created annotation"
                );
                Ok(CreatedAnno {
                    id,
                    body_ids,
                    target_ids,
                })
            }
            Err(e) => {
                tracing::warn!(id = %id, "partial annotation write; orphaned resources remain");
                Err(e)
            }
        }
    }

    fn create_members(
        &self,
        anno: &AnnotationGraph,
        root: &NamedOrBlankNode,
        root_uri: &str,
    ) -> ScholiaResult<(Vec<String>, Vec<String>)> {
        let body_ids = self.create_side(anno, root, root_uri, oa::HAS_BODY, "b")?;
        let target_ids = self.create_side(anno, root, root_uri, oa::HAS_TARGET, "t")?;
        Ok((body_ids, target_ids))
    }

    /// Create the direct container and one leaf resource per member.
    /// The container is created only when at least one statement exists.
    fn create_side(
        &self,
        anno: &AnnotationGraph,
        root: &NamedOrBlankNode,
        root_uri: &str,
        relation: oxigraph::model::NamedNodeRef<'_>,
        slug: &str,
    ) -> ScholiaResult<Vec<String>> {
        let members: Vec<NamedOrBlankNode> = anno
            .graph()
            .objects_for_subject_predicate(root, relation)
            .filter_map(|t| NamedOrBlankNode::try_from(t.into_owned()).ok())
            .collect();
        if members.is_empty() {
            return Ok(Vec::new());
        }

        self.create_container(root_uri, slug, relation)?;
        let container_uri = format!("{root_uri}/{slug}");

        let mut ids = Vec::with_capacity(members.len());
        for member in &members {
            let node = classify(anno.graph(), member);
            ids.push(self.create_leaf(&container_uri, &node)?);
        }
        Ok(ids)
    }

    /// POST the base resource: the root's triples minus the body/target
    /// subtrees, with a blank root rewritten to the null relative URI.
    fn create_base(&self, anno: &AnnotationGraph, root: &NamedOrBlankNode) -> ScholiaResult<String> {
        let mut base = anno.graph().clone();
        for relation in [oa::HAS_BODY, oa::HAS_TARGET] {
            let objects: Vec<Term> = base
                .objects_for_subject_predicate(root, relation)
                .map(|t| t.into_owned())
                .collect();
            for object in objects {
                // A literal-valued member is degenerate; it stays on the base
                // resource untouched.
                let Ok(node) = NamedOrBlankNode::try_from(object.clone()) else {
                    continue;
                };
                base.remove(&Triple::new(
                    root.clone(),
                    relation.into_owned(),
                    object,
                ));
                remove_subtree(&mut base, &node);
            }
        }
        rewrite_node(&mut base, root, &null_relative());

        let body = serialize_graph(&base, WireFormat::Turtle)?;
        let resp = self
            .store
            .post(&self.config.ldp.url, None, "text/turtle", &body)?;
        let location = resp.location.ok_or(StorageError::MissingLocation)?;
        let id = location
            .strip_prefix(&self.config.ldp.url)
            .map(|s| s.trim_start_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StorageError::Transport {
                message: format!("store location {location} is outside the configured root"),
            })?;
        Ok(id)
    }

    fn create_container(
        &self,
        root_uri: &str,
        slug: &str,
        relation: oxigraph::model::NamedNodeRef<'_>,
    ) -> ScholiaResult<()> {
        let mut graph = Graph::new();
        let me = null_relative();
        graph.insert(&Triple::new(
            me.clone(),
            rdf::TYPE.into_owned(),
            ldp::DIRECT_CONTAINER.into_owned(),
        ));
        graph.insert(&Triple::new(
            me.clone(),
            ldp::HAS_MEMBER_RELATION.into_owned(),
            relation.into_owned(),
        ));
        graph.insert(&Triple::new(
            me,
            ldp::MEMBERSHIP_RESOURCE.into_owned(),
            NamedNode::new_unchecked(root_uri),
        ));
        let body = serialize_graph(&graph, WireFormat::Turtle)?;
        self.store
            .post(root_uri, Some(slug), "text/turtle", &body)?;
        Ok(())
    }

    fn create_leaf(&self, container_uri: &str, node: &BodyOrTarget) -> ScholiaResult<String> {
        let mut block = Graph::new();
        render(&mut block, null_relative(), node, 0);
        let body = serialize_graph(&block, WireFormat::Turtle)?;
        let resp = self.store.post(container_uri, None, "text/turtle", &body)?;
        let location = resp.location.ok_or(StorageError::MissingLocation)?;
        let id = location
            .rsplit('/')
            .next()
            .unwrap_or(&location)
            .to_string();
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(anno: &AnnotationGraph, root: &NamedOrBlankNode) -> Result<(), ValidationError> {
    if let NamedOrBlankNode::NamedNode(uri) = root {
        return Err(ValidationError::AlreadyPersisted {
            subject: uri.as_str().to_string(),
        });
    }
    for triple in anno.graph().iter() {
        let marked = triple.predicate == scholia::EXTERNAL_REFERENCE
            || triple.object
                == oxigraph::model::TermRef::NamedNode(scholia::EXTERNAL_REFERENCE);
        if marked {
            return Err(ValidationError::ReservedPredicate {
                predicate: scholia::EXTERNAL_REFERENCE.as_str().to_string(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Triple-block rendering
// ---------------------------------------------------------------------------

fn null_relative() -> NamedOrBlankNode {
    NamedOrBlankNode::NamedNode(NamedNode::new_unchecked(""))
}

/// Subject for a nested sub-node: a relative hash URI one level below a
/// created resource, a blank node (left for the store to skolemize) any
/// deeper.
fn child_subject(depth: usize, fragment: &str) -> NamedOrBlankNode {
    if depth == 0 {
        NamedOrBlankNode::NamedNode(NamedNode::new_unchecked(format!("#{fragment}")))
    } else {
        NamedOrBlankNode::BlankNode(BlankNode::default())
    }
}

fn insert(block: &mut Graph, subject: &NamedOrBlankNode, predicate: NamedNode, object: Term) {
    block.insert(&Triple::new(subject.clone(), predicate, object));
}

/// Emit one classified node into the outgoing triple block, depth-first.
fn render(block: &mut Graph, subject: NamedOrBlankNode, node: &BodyOrTarget, depth: usize) {
    match node {
        BodyOrTarget::PlainExternalUri(uri) => {
            insert(
                block,
                &subject,
                scholia::EXTERNAL_REFERENCE.into_owned(),
                Term::NamedNode(uri.clone()),
            );
        }
        BodyOrTarget::ExternalReference { uri, extra } => {
            insert(
                block,
                &subject,
                scholia::EXTERNAL_REFERENCE.into_owned(),
                Term::NamedNode(uri.clone()),
            );
            for t in extra {
                insert(block, &subject, t.predicate.clone(), t.object.clone());
            }
        }
        BodyOrTarget::ContentAsText { statements } => {
            for t in statements {
                insert(block, &subject, t.predicate.clone(), t.object.clone());
            }
        }
        BodyOrTarget::SpecificResource { source, selector } => {
            insert(
                block,
                &subject,
                rdf::TYPE.into_owned(),
                Term::NamedNode(oa::SPECIFIC_RESOURCE.into_owned()),
            );
            if let Some(source) = source {
                let child = child_subject(depth, "source");
                insert(
                    block,
                    &subject,
                    oa::HAS_SOURCE.into_owned(),
                    node_term(&child),
                );
                render(block, child, source, depth + 1);
            }
            if let Some(selector) = selector {
                let child = child_subject(depth, "selector");
                insert(
                    block,
                    &subject,
                    oa::HAS_SELECTOR.into_owned(),
                    node_term(&child),
                );
                render_selector(block, &child, selector);
            }
        }
        BodyOrTarget::Choice { default, items } => {
            insert(
                block,
                &subject,
                rdf::TYPE.into_owned(),
                Term::NamedNode(oa::CHOICE.into_owned()),
            );
            if let Some(default) = default {
                let child = child_subject(depth, "default");
                insert(block, &subject, oa::DEFAULT.into_owned(), node_term(&child));
                render(block, child, default, depth + 1);
            }
            for (i, item) in items.iter().enumerate() {
                let child = child_subject(depth, &format!("item{}", i + 1));
                insert(block, &subject, oa::ITEM.into_owned(), node_term(&child));
                render(block, child, item, depth + 1);
            }
        }
    }
}

fn render_selector(block: &mut Graph, subject: &NamedOrBlankNode, selector: &Selector) {
    match selector {
        Selector::Fragment { value, conforms_to } => {
            insert(
                block,
                subject,
                rdf::TYPE.into_owned(),
                Term::NamedNode(oa::FRAGMENT_SELECTOR.into_owned()),
            );
            insert(
                block,
                subject,
                rdf::VALUE.into_owned(),
                Term::Literal(Literal::new_simple_literal(value.as_str())),
            );
            if let Some(conforms_to) = conforms_to {
                insert(
                    block,
                    subject,
                    crate::vocab::dcterms::CONFORMS_TO.into_owned(),
                    Term::NamedNode(conforms_to.clone()),
                );
            }
        }
        Selector::TextPosition { start, end } => {
            insert(
                block,
                subject,
                rdf::TYPE.into_owned(),
                Term::NamedNode(oa::TEXT_POSITION_SELECTOR.into_owned()),
            );
            insert(
                block,
                subject,
                oa::START.into_owned(),
                Term::Literal(Literal::new_typed_literal(
                    start.to_string(),
                    xsd::NON_NEGATIVE_INTEGER,
                )),
            );
            insert(
                block,
                subject,
                oa::END.into_owned(),
                Term::Literal(Literal::new_typed_literal(
                    end.to_string(),
                    xsd::NON_NEGATIVE_INTEGER,
                )),
            );
        }
        Selector::TextQuote {
            exact,
            prefix,
            suffix,
        } => {
            insert(
                block,
                subject,
                rdf::TYPE.into_owned(),
                Term::NamedNode(oa::TEXT_QUOTE_SELECTOR.into_owned()),
            );
            insert(
                block,
                subject,
                oa::EXACT.into_owned(),
                Term::Literal(Literal::new_simple_literal(exact.as_str())),
            );
            if let Some(prefix) = prefix {
                insert(
                    block,
                    subject,
                    oa::PREFIX.into_owned(),
                    Term::Literal(Literal::new_simple_literal(prefix.as_str())),
                );
            }
            if let Some(suffix) = suffix {
                insert(
                    block,
                    subject,
                    oa::SUFFIX.into_owned(),
                    Term::Literal(Literal::new_simple_literal(suffix.as_str())),
                );
            }
        }
        Selector::Other { statements } => {
            for t in statements {
                insert(block, subject, t.predicate.clone(), t.object.clone());
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

/// Remove every statement reachable from `node` (cycle-safe).
fn remove_subtree(graph: &mut Graph, node: &NamedOrBlankNode) {
    let mut visited: Vec<NamedOrBlankNode> = Vec::new();
    let mut queue = vec![node.clone()];
    while let Some(current) = queue.pop() {
        if visited.contains(&current) {
            continue;
        }
        visited.push(current.clone());
        let outgoing: Vec<Triple> = graph
            .triples_for_subject(&current)
            .map(|t| t.into_owned())
            .collect();
        for t in outgoing {
            graph.remove(&t);
            if let Ok(next) = NamedOrBlankNode::try_from(t.object) {
                queue.push(next);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldp::mem::MemLdpStore;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.base_uri = "http://annos.test/annotations".into();
        config.ldp.url = "http://store.test/rest/anno".into();
        config
    }

    fn parse(ttl: &str) -> AnnotationGraph {
        AnnotationGraph::from_wire(ttl.as_bytes(), WireFormat::Turtle).unwrap()
    }

    const BOOKMARK_TTL: &str = r#"
        @prefix oa: <http://www.w3.org/ns/oa#> .
        [] a oa:Annotation ;
           oa:motivatedBy oa:bookmarking ;
           oa:hasTarget <http://purl.stanford.edu/kq131cs7229> .
    "#;

    #[test]
    fn bookmark_creates_base_container_and_one_target() {
        let config = test_config();
        let store = MemLdpStore::new(&config.ldp.url);
        let mapper = WriteMapper::new(&config, &store);
        let created = mapper.create(&parse(BOOKMARK_TTL)).unwrap();

        assert!(created.body_ids.is_empty());
        assert_eq!(created.target_ids.len(), 1);
        // Base + target container + one target resource, and nothing else.
        assert_eq!(store.resource_count(), 3);
        let root_uri = format!("{}/{}", config.ldp.url, created.id);
        assert!(store.contains(&root_uri));
        assert!(store.contains(&format!("{root_uri}/t")));
        assert!(!store.contains(&format!("{root_uri}/b")));
    }

    #[test]
    fn body_container_skipped_without_body_statements() {
        let config = test_config();
        let store = MemLdpStore::new(&config.ldp.url);
        let mapper = WriteMapper::new(&config, &store);
        let created = mapper.create(&parse(BOOKMARK_TTL)).unwrap();
        assert!(created.body_ids.is_empty());
        let root_uri = format!("{}/{}", config.ldp.url, created.id);
        let fetched = store.get(&root_uri, "text/turtle").unwrap();
        assert!(!fetched.body.contains("/b"));
    }

    #[test]
    fn persisted_root_is_rejected_before_any_store_call() {
        let config = test_config();
        let store = MemLdpStore::new(&config.ldp.url);
        let mapper = WriteMapper::new(&config, &store);
        let anno = parse(
            r#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            <http://annos.test/annotations/abc> a oa:Annotation ;
               oa:hasTarget <http://example.org/x> .
            "#,
        );
        let err = mapper.create(&anno).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ScholiaError::Validation(ValidationError::AlreadyPersisted { .. })
        ));
        assert_eq!(store.resource_count(), 0);
    }

    #[test]
    fn reserved_marker_predicate_is_rejected_before_any_store_call() {
        let config = test_config();
        let store = MemLdpStore::new(&config.ldp.url);
        let mapper = WriteMapper::new(&config, &store);
        let anno = parse(
            r#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            @prefix scholia: <https://scholia.dev/ns/> .
            [] a oa:Annotation ;
               oa:hasTarget [ scholia:externalReference <http://example.org/x> ] .
            "#,
        );
        let err = mapper.create(&anno).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ScholiaError::Validation(ValidationError::ReservedPredicate { .. })
        ));
        assert_eq!(store.resource_count(), 0);
    }

    #[test]
    fn base_resource_keeps_motivation_but_not_member_subtrees() {
        let config = test_config();
        let store = MemLdpStore::new(&config.ldp.url);
        let mapper = WriteMapper::new(&config, &store);
        let anno = parse(
            r#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            @prefix cnt: <http://www.w3.org/2011/content#> .
            [] a oa:Annotation ;
               oa:motivatedBy oa:commenting ;
               oa:hasBody [ a cnt:ContentAsText ; cnt:chars "hi" ] ;
               oa:hasTarget <http://example.org/x> .
            "#,
        );
        let created = mapper.create(&anno).unwrap();
        let root_uri = format!("{}/{}", config.ldp.url, created.id);
        let base = store.get(&root_uri, "text/turtle").unwrap().body;
        assert!(base.contains("commenting"));
        assert!(!base.contains("hasBody"));
        assert!(!base.contains("hi"));
    }

    #[test]
    fn specific_resource_source_becomes_hash_child() {
        let config = test_config();
        let store = MemLdpStore::new(&config.ldp.url);
        let mapper = WriteMapper::new(&config, &store);
        let anno = parse(
            r#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            [] a oa:Annotation ;
               oa:hasTarget [
                   a oa:SpecificResource ;
                   oa:hasSource <http://example.org/page.html> ;
                   oa:hasSelector [ a oa:TextQuoteSelector ; oa:exact "words" ]
               ] .
            "#,
        );
        let created = mapper.create(&anno).unwrap();
        let root_uri = format!("{}/{}", config.ldp.url, created.id);
        let leaf_uri = format!("{root_uri}/t/{}", created.target_ids[0]);
        let leaf = store.get(&leaf_uri, "text/turtle").unwrap().body;
        assert!(leaf.contains("#source"));
        assert!(leaf.contains("#selector"));
        assert!(leaf.contains("externalReference"));
    }

    #[test]
    fn choice_items_are_ordered_hash_children() {
        let config = test_config();
        let store = MemLdpStore::new(&config.ldp.url);
        let mapper = WriteMapper::new(&config, &store);
        let anno = parse(
            r#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            @prefix cnt: <http://www.w3.org/2011/content#> .
            [] a oa:Annotation ;
               oa:hasBody [
                   a oa:Choice ;
                   oa:default [ a cnt:ContentAsText ; cnt:chars "plain" ] ;
                   oa:item [ a cnt:ContentAsText ; cnt:chars "html" ]
               ] ;
               oa:hasTarget <http://example.org/x> .
            "#,
        );
        let created = mapper.create(&anno).unwrap();
        let root_uri = format!("{}/{}", config.ldp.url, created.id);
        let leaf_uri = format!("{root_uri}/b/{}", created.body_ids[0]);
        let leaf = store.get(&leaf_uri, "text/turtle").unwrap().body;
        assert!(leaf.contains("#default"));
        assert!(leaf.contains("#item1"));
    }
}
