//! Body/target node classification.
//!
//! Every node reachable via `oa:hasBody` / `oa:hasTarget` is classified
//! exactly once into the closed [`BodyOrTarget`] union; the mappers then
//! dispatch with an exhaustive match. Classification is total: nodes that
//! fit no recognized shape pass through leniently (a bare URI stays a bare
//! URI, anything else keeps its statements verbatim) rather than failing.

use oxigraph::model::{NamedNode, NamedOrBlankNode, Term, Triple};
use oxigraph::model::vocab::rdf;

use crate::vocab::{cnt, dc, dcterms, oa, scholia};

/// A classified body or target node.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyOrTarget {
    /// A dereferenceable URI with no further local statements.
    PlainExternalUri(NamedNode),
    /// A node standing in for an external URI, carrying extra metadata
    /// statements (anchored at the node itself, verbatim).
    ExternalReference {
        uri: NamedNode,
        extra: Vec<Triple>,
    },
    /// Literal text content; `statements` holds the node's outgoing triples
    /// (type, chars, format, language) verbatim.
    ContentAsText { statements: Vec<Triple> },
    /// One default sub-node plus alternative items, each classified
    /// recursively.
    Choice {
        default: Option<Box<BodyOrTarget>>,
        items: Vec<BodyOrTarget>,
    },
    /// A source scoped by an optional selector.
    SpecificResource {
        source: Option<Box<BodyOrTarget>>,
        selector: Option<Selector>,
    },
}

/// A classified `oa:hasSelector` object.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Fragment {
        value: String,
        conforms_to: Option<NamedNode>,
    },
    TextPosition {
        start: u64,
        end: u64,
    },
    TextQuote {
        exact: String,
        prefix: Option<String>,
        suffix: Option<String>,
    },
    /// Unrecognized selector shape, kept verbatim.
    Other { statements: Vec<Triple> },
}

impl BodyOrTarget {
    /// `cnt:chars` value, for `ContentAsText` nodes.
    pub fn chars(&self) -> Option<&str> {
        self.literal_of(cnt::CHARS)
    }

    /// `dc:format` value, where present.
    pub fn format(&self) -> Option<&str> {
        self.literal_of(dc::FORMAT)
    }

    /// `dc:language` value, where present.
    pub fn language(&self) -> Option<&str> {
        self.literal_of(dc::LANGUAGE)
    }

    fn literal_of(&self, predicate: oxigraph::model::NamedNodeRef<'_>) -> Option<&str> {
        let statements = match self {
            BodyOrTarget::ContentAsText { statements } => statements,
            BodyOrTarget::ExternalReference { extra, .. } => extra,
            _ => return None,
        };
        statements.iter().find_map(|t| {
            if t.predicate.as_ref() == predicate {
                match &t.object {
                    Term::Literal(l) => Some(l.value()),
                    _ => None,
                }
            } else {
                None
            }
        })
    }
}

/// Classify one body/target node against the graph it lives in.
///
/// Deterministic and total: every node maps to exactly one variant.
pub fn classify(graph: &oxigraph::model::Graph, node: &NamedOrBlankNode) -> BodyOrTarget {
    let types: Vec<NamedNode> = graph
        .objects_for_subject_predicate(node, rdf::TYPE)
        .filter_map(|t| match t {
            oxigraph::model::TermRef::NamedNode(n) => Some(n.into_owned()),
            _ => None,
        })
        .collect();

    if types.iter().any(|t| t.as_ref() == cnt::CONTENT_AS_TEXT) {
        return BodyOrTarget::ContentAsText {
            statements: outgoing(graph, node),
        };
    }

    if types.iter().any(|t| t.as_ref() == oa::CHOICE) {
        let default = first_node_object(graph, node, oa::DEFAULT)
            .map(|child| Box::new(classify(graph, &child)));
        let items = node_objects(graph, node, oa::ITEM)
            .into_iter()
            .map(|child| classify(graph, &child))
            .collect();
        return BodyOrTarget::Choice { default, items };
    }

    if types.iter().any(|t| t.as_ref() == oa::SPECIFIC_RESOURCE) {
        let source = first_node_object(graph, node, oa::HAS_SOURCE)
            .map(|child| Box::new(classify(graph, &child)));
        let selector = first_node_object(graph, node, oa::HAS_SELECTOR)
            .map(|child| classify_selector(graph, &child));
        return BodyOrTarget::SpecificResource { source, selector };
    }

    // Stored shape: a local stand-in for an external URI.
    if let Some(oxigraph::model::TermRef::NamedNode(uri)) = graph
        .objects_for_subject_predicate(node, scholia::EXTERNAL_REFERENCE)
        .next()
    {
        let uri = uri.into_owned();
        let extra = outgoing(graph, node)
            .into_iter()
            .filter(|t| t.predicate.as_ref() != scholia::EXTERNAL_REFERENCE)
            .collect();
        return BodyOrTarget::ExternalReference { uri, extra };
    }

    match node {
        NamedOrBlankNode::NamedNode(uri) => {
            let extra = outgoing(graph, node);
            if extra.is_empty() {
                BodyOrTarget::PlainExternalUri(uri.clone())
            } else {
                // Lenient pass-through: unrecognized URI node, statements kept
                // verbatim.
                BodyOrTarget::ExternalReference {
                    uri: uri.clone(),
                    extra,
                }
            }
        }
        // Lenient pass-through for blank nodes with no recognized type.
        NamedOrBlankNode::BlankNode(_) => BodyOrTarget::ContentAsText {
            statements: outgoing(graph, node),
        },
    }
}

/// Classify a selector node.
pub fn classify_selector(graph: &oxigraph::model::Graph, node: &NamedOrBlankNode) -> Selector {
    let has_type = |wanted: oxigraph::model::NamedNodeRef<'_>| {
        graph
            .objects_for_subject_predicate(node, rdf::TYPE)
            .any(|t| t == oxigraph::model::TermRef::NamedNode(wanted))
    };

    if has_type(oa::FRAGMENT_SELECTOR) {
        if let Some(value) = literal_object(graph, node, rdf::VALUE) {
            let conforms_to = first_named_object(graph, node, dcterms::CONFORMS_TO);
            return Selector::Fragment { value, conforms_to };
        }
    }

    if has_type(oa::TEXT_POSITION_SELECTOR) {
        let start = literal_object(graph, node, oa::START).and_then(|v| v.parse().ok());
        let end = literal_object(graph, node, oa::END).and_then(|v| v.parse().ok());
        if let (Some(start), Some(end)) = (start, end) {
            return Selector::TextPosition { start, end };
        }
    }

    if has_type(oa::TEXT_QUOTE_SELECTOR) {
        if let Some(exact) = literal_object(graph, node, oa::EXACT) {
            return Selector::TextQuote {
                exact,
                prefix: literal_object(graph, node, oa::PREFIX),
                suffix: literal_object(graph, node, oa::SUFFIX),
            };
        }
    }

    Selector::Other {
        statements: outgoing(graph, node),
    }
}

// ---------------------------------------------------------------------------
// Graph helpers
// ---------------------------------------------------------------------------

/// Direct outgoing statements of a node, verbatim.
pub fn outgoing(graph: &oxigraph::model::Graph, node: &NamedOrBlankNode) -> Vec<Triple> {
    graph
        .triples_for_subject(node)
        .map(|t| t.into_owned())
        .collect()
}

fn node_objects(
    graph: &oxigraph::model::Graph,
    node: &NamedOrBlankNode,
    predicate: oxigraph::model::NamedNodeRef<'_>,
) -> Vec<NamedOrBlankNode> {
    graph
        .objects_for_subject_predicate(node, predicate)
        .filter_map(|t| NamedOrBlankNode::try_from(t.into_owned()).ok())
        .collect()
}

fn first_node_object(
    graph: &oxigraph::model::Graph,
    node: &NamedOrBlankNode,
    predicate: oxigraph::model::NamedNodeRef<'_>,
) -> Option<NamedOrBlankNode> {
    node_objects(graph, node, predicate).into_iter().next()
}

fn first_named_object(
    graph: &oxigraph::model::Graph,
    node: &NamedOrBlankNode,
    predicate: oxigraph::model::NamedNodeRef<'_>,
) -> Option<NamedNode> {
    graph
        .objects_for_subject_predicate(node, predicate)
        .find_map(|t| match t {
            oxigraph::model::TermRef::NamedNode(n) => Some(n.into_owned()),
            _ => None,
        })
}

fn literal_object(
    graph: &oxigraph::model::Graph,
    node: &NamedOrBlankNode,
    predicate: oxigraph::model::NamedNodeRef<'_>,
) -> Option<String> {
    graph
        .objects_for_subject_predicate(node, predicate)
        .find_map(|t| match t {
            oxigraph::model::TermRef::Literal(l) => Some(l.value().to_string()),
            _ => None,
        })
}
