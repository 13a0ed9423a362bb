//! Compacted JSON-LD output for annotation graphs.
//!
//! The three flavors share one compaction (the OA term set is closed); they
//! differ only in which `@context` URL is substituted. Property keys use the
//! context's short names, IRI values compact to `prefix:local` form.

use oxigraph::model::{NamedOrBlankNode, Term};
use oxigraph::model::vocab::rdf;
use serde_json::{json, Map, Value};

use crate::error::GraphError;
use crate::graph::{AnnotationGraph, GraphResult};
use crate::vocab::contexts;

/// Which `@context` URL the output carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextFlavor {
    OaDated,
    OaGeneric,
    Iiif,
}

impl ContextFlavor {
    pub fn url(self) -> &'static str {
        match self {
            ContextFlavor::OaDated => contexts::OA_DATED,
            ContextFlavor::OaGeneric => contexts::OA_GENERIC,
            ContextFlavor::Iiif => contexts::IIIF,
        }
    }
}

/// Prefixes recognized for `prefix:local` compaction, longest namespace
/// first so the most specific prefix wins.
const PREFIXES: &[(&str, &str)] = &[
    ("http://www.w3.org/1999/02/22-rdf-syntax-ns#", "rdf"),
    ("http://www.w3.org/2011/content#", "cnt"),
    ("http://purl.org/dc/elements/1.1/", "dc"),
    ("http://purl.org/dc/dcmitype/", "dctypes"),
    ("http://purl.org/dc/terms/", "dcterms"),
    ("http://www.w3.org/ns/oa#", "oa"),
];

/// Context short names for property keys.
const PROPERTY_TERMS: &[(&str, &str)] = &[
    ("http://www.w3.org/ns/oa#hasBody", "hasBody"),
    ("http://www.w3.org/ns/oa#hasTarget", "hasTarget"),
    ("http://www.w3.org/ns/oa#motivatedBy", "motivatedBy"),
    ("http://www.w3.org/ns/oa#annotatedAt", "annotatedAt"),
    ("http://www.w3.org/ns/oa#annotatedBy", "annotatedBy"),
    ("http://www.w3.org/ns/oa#default", "default"),
    ("http://www.w3.org/ns/oa#item", "item"),
    ("http://www.w3.org/ns/oa#hasSource", "hasSource"),
    ("http://www.w3.org/ns/oa#hasSelector", "hasSelector"),
    ("http://www.w3.org/ns/oa#start", "start"),
    ("http://www.w3.org/ns/oa#end", "end"),
    ("http://www.w3.org/ns/oa#exact", "exact"),
    ("http://www.w3.org/ns/oa#prefix", "prefix"),
    ("http://www.w3.org/ns/oa#suffix", "suffix"),
    ("http://www.w3.org/2011/content#chars", "chars"),
    ("http://purl.org/dc/elements/1.1/format", "format"),
    ("http://purl.org/dc/elements/1.1/language", "language"),
    ("http://purl.org/dc/terms/conformsTo", "conformsTo"),
    ("http://www.w3.org/1999/02/22-rdf-syntax-ns#value", "value"),
];

/// Serialize the annotation graph to compacted JSON-LD with the chosen
/// context URL.
pub fn write_compact(anno: &AnnotationGraph, flavor: ContextFlavor) -> GraphResult<String> {
    let root = anno.root().ok_or(GraphError::NoRootNode)?;
    let mut visited = Vec::new();
    let mut object = node_to_json(anno, &root, &mut visited);

    let mut with_context = Map::new();
    with_context.insert("@context".into(), json!(flavor.url()));
    if let Value::Object(fields) = &mut object {
        for (key, value) in std::mem::take(fields) {
            with_context.insert(key, value);
        }
    }
    serde_json::to_string(&Value::Object(with_context)).map_err(|e| GraphError::Serialize {
        format: "application/ld+json".into(),
        message: e.to_string(),
    })
}

fn node_to_json(
    anno: &AnnotationGraph,
    node: &NamedOrBlankNode,
    visited: &mut Vec<NamedOrBlankNode>,
) -> Value {
    visited.push(node.clone());
    let mut fields = Map::new();
    if let NamedOrBlankNode::NamedNode(uri) = node {
        fields.insert("@id".into(), json!(uri.as_str()));
    }

    let mut types = Vec::new();
    let mut properties: Vec<(String, Value)> = Vec::new();
    for triple in anno.graph().triples_for_subject(node) {
        if triple.predicate == rdf::TYPE {
            if let oxigraph::model::TermRef::NamedNode(t) = triple.object {
                types.push(json!(compact_iri(t.as_str())));
            }
            continue;
        }
        let key = property_key(triple.predicate.as_str());
        let value = term_to_json(anno, &triple.object.into_owned(), visited);
        properties.push((key, value));
    }

    if !types.is_empty() {
        fields.insert("@type".into(), collapse(types));
    }
    // Group repeated keys into arrays, preserving first-seen key order.
    for (key, value) in properties {
        match fields.get_mut(&key) {
            None => {
                fields.insert(key, value);
            }
            Some(Value::Array(existing)) => existing.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
    Value::Object(fields)
}

fn term_to_json(
    anno: &AnnotationGraph,
    term: &Term,
    visited: &mut Vec<NamedOrBlankNode>,
) -> Value {
    match term {
        Term::Literal(literal) => {
            if let Some(language) = literal.language() {
                json!({ "@value": literal.value(), "@language": language })
            } else if is_integer_type(literal.datatype().as_str()) {
                literal
                    .value()
                    .parse::<i64>()
                    .map(|n| json!(n))
                    .unwrap_or_else(|_| json!(literal.value()))
            } else {
                json!(literal.value())
            }
        }
        Term::NamedNode(uri) => {
            let node = NamedOrBlankNode::NamedNode(uri.clone());
            let has_statements = anno.graph().triples_for_subject(&node).next().is_some();
            if has_statements && !visited.contains(&node) {
                node_to_json(anno, &node, visited)
            } else {
                json!(compact_iri(uri.as_str()))
            }
        }
        Term::BlankNode(b) => {
            let node = NamedOrBlankNode::BlankNode(b.clone());
            if visited.contains(&node) {
                json!(format!("_:{}", b.as_str()))
            } else {
                node_to_json(anno, &node, visited)
            }
        }
    }
}

fn collapse(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}

fn property_key(iri: &str) -> String {
    PROPERTY_TERMS
        .iter()
        .find(|(full, _)| *full == iri)
        .map(|(_, short)| short.to_string())
        .unwrap_or_else(|| compact_iri(iri))
}

fn compact_iri(iri: &str) -> String {
    for (ns, prefix) in PREFIXES {
        if let Some(local) = iri.strip_prefix(ns) {
            return format!("{prefix}:{local}");
        }
    }
    iri.to_string()
}

fn is_integer_type(datatype: &str) -> bool {
    matches!(
        datatype,
        "http://www.w3.org/2001/XMLSchema#integer"
            | "http://www.w3.org/2001/XMLSchema#nonNegativeInteger"
            | "http://www.w3.org/2001/XMLSchema#long"
            | "http://www.w3.org/2001/XMLSchema#int"
    )
}
