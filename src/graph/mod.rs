//! Annotation graph model: an RDF graph with a designated annotation root
//! and the typed accessors shared by the mappers and the search projection.
//!
//! The graph itself is an `oxigraph::model::Graph`; this module adds the
//! domain view — root discovery, motivation/body/target accessors, and
//! wire-format parsing/serialization via `oxigraph::io`.

pub mod classify;
pub mod jsonld;

use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::{
    Graph, GraphNameRef, NamedNode, NamedOrBlankNode, QuadRef, Term, Triple,
};

use crate::error::GraphError;
use crate::vocab::{cnt, oa};
use oxigraph::model::vocab::rdf;

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

// ---------------------------------------------------------------------------
// Wire formats
// ---------------------------------------------------------------------------

/// RDF wire formats the annotation layer accepts and produces.
///
/// JSON-LD output with a selectable `@context` URL goes through
/// [`jsonld::write_compact`] instead; this enum covers the formats delegated
/// to the oxigraph (de)serializers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Turtle,
    RdfXml,
    NTriples,
    JsonLd,
}

impl WireFormat {
    /// Map to the oxigraph format descriptor.
    pub fn as_rdf_format(self) -> RdfFormat {
        match self {
            WireFormat::Turtle => RdfFormat::Turtle,
            WireFormat::RdfXml => RdfFormat::RdfXml,
            WireFormat::NTriples => RdfFormat::NTriples,
            WireFormat::JsonLd => RdfFormat::JsonLd {
                profile: Default::default(),
            },
        }
    }

    /// Canonical media type for HTTP content negotiation.
    pub fn media_type(self) -> &'static str {
        match self {
            WireFormat::Turtle => "text/turtle",
            WireFormat::RdfXml => "application/rdf+xml",
            WireFormat::NTriples => "application/n-triples",
            WireFormat::JsonLd => "application/ld+json",
        }
    }

    /// Resolve a media type (possibly with parameters) to a format.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or("").trim();
        match essence {
            "text/turtle" | "application/x-turtle" => Some(WireFormat::Turtle),
            "application/rdf+xml" => Some(WireFormat::RdfXml),
            "application/n-triples" | "text/plain" => Some(WireFormat::NTriples),
            "application/ld+json" | "application/json" => Some(WireFormat::JsonLd),
            _ => None,
        }
    }
}

impl std::fmt::Display for WireFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.media_type())
    }
}

// ---------------------------------------------------------------------------
// Parsing / serialization helpers
// ---------------------------------------------------------------------------

/// Parse a payload into a plain graph, ignoring named graphs.
pub fn parse_graph(data: &[u8], format: WireFormat, base_iri: Option<&str>) -> GraphResult<Graph> {
    let mut parser = RdfParser::from_format(format.as_rdf_format());
    if let Some(base) = base_iri {
        parser = parser.with_base_iri(base).map_err(|_| GraphError::BadIri {
            iri: base.to_string(),
        })?;
    }
    let mut graph = Graph::new();
    for quad in parser.for_slice(data) {
        let quad = quad.map_err(|e| GraphError::Parse {
            format: format.media_type().to_string(),
            message: e.to_string(),
        })?;
        graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
    }
    Ok(graph)
}

/// Serialize a graph to the given wire format.
pub fn serialize_graph(graph: &Graph, format: WireFormat) -> GraphResult<String> {
    let mut serializer =
        RdfSerializer::from_format(format.as_rdf_format()).for_writer(Vec::new());
    for triple in graph.iter() {
        serializer
            .serialize_quad(QuadRef::new(
                triple.subject,
                triple.predicate,
                triple.object,
                GraphNameRef::DefaultGraph,
            ))
            .map_err(|e| GraphError::Serialize {
                format: format.media_type().to_string(),
                message: e.to_string(),
            })?;
    }
    let bytes = serializer.finish().map_err(|e| GraphError::Serialize {
        format: format.media_type().to_string(),
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| GraphError::Serialize {
        format: format.media_type().to_string(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// AnnotationGraph
// ---------------------------------------------------------------------------

/// An annotation: a set of triples plus the designated root node
/// (the subject carrying `rdf:type oa:Annotation`).
#[derive(Debug, Clone, Default)]
pub struct AnnotationGraph {
    graph: Graph,
}

impl AnnotationGraph {
    /// Wrap an already-assembled graph.
    pub fn from_graph(graph: Graph) -> Self {
        Self { graph }
    }

    /// Parse an annotation from a wire payload.
    pub fn from_wire(data: &[u8], format: WireFormat) -> GraphResult<Self> {
        Ok(Self {
            graph: parse_graph(data, format, None)?,
        })
    }

    /// Parse with a base IRI for resolving relative references.
    pub fn from_wire_with_base(
        data: &[u8],
        format: WireFormat,
        base_iri: &str,
    ) -> GraphResult<Self> {
        Ok(Self {
            graph: parse_graph(data, format, Some(base_iri))?,
        })
    }

    /// The underlying triple set.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access, used by the mappers during assembly.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Consume into the underlying graph.
    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Number of triples.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// The annotation root: the subject with `rdf:type oa:Annotation`.
    pub fn root(&self) -> Option<NamedOrBlankNode> {
        self.graph
            .subjects_for_predicate_object(rdf::TYPE, oa::ANNOTATION)
            .next()
            .map(|s| s.into_owned())
    }

    /// The root as a persistent URI, if it has one (post-persistence).
    pub fn id_as_uri(&self) -> Option<NamedNode> {
        match self.root()? {
            NamedOrBlankNode::NamedNode(n) => Some(n),
            NamedOrBlankNode::BlankNode(_) => None,
        }
    }

    /// Motivation URIs on the root.
    pub fn motivations(&self) -> Vec<NamedNode> {
        self.objects_of(oa::MOTIVATED_BY)
            .into_iter()
            .filter_map(|t| match t {
                Term::NamedNode(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    /// The raw `oa:annotatedAt` literal value, if present.
    pub fn annotated_at(&self) -> Option<String> {
        self.objects_of(oa::ANNOTATED_AT)
            .into_iter()
            .find_map(|t| match t {
                Term::Literal(l) => Some(l.value().to_string()),
                _ => None,
            })
    }

    /// Objects of `oa:hasBody` on the root.
    pub fn body_nodes(&self) -> Vec<Term> {
        self.objects_of(oa::HAS_BODY)
    }

    /// Objects of `oa:hasTarget` on the root.
    pub fn target_nodes(&self) -> Vec<Term> {
        self.objects_of(oa::HAS_TARGET)
    }

    /// Body objects that are plain URIs.
    pub fn body_uris(&self) -> Vec<NamedNode> {
        Self::uris_only(self.body_nodes())
    }

    /// Target objects that are plain URIs.
    pub fn target_uris(&self) -> Vec<NamedNode> {
        Self::uris_only(self.target_nodes())
    }

    /// All `cnt:chars` literal values reachable from the bodies, including
    /// bodies nested one level down inside a `oa:Choice` (default and items).
    pub fn body_chars(&self) -> Vec<String> {
        let mut chars = Vec::new();
        for body in self.body_nodes() {
            let Ok(subject) = NamedOrBlankNode::try_from(body) else {
                continue;
            };
            self.collect_chars(&subject, &mut chars);
            for pred in [oa::DEFAULT, oa::ITEM] {
                for child in self.graph.objects_for_subject_predicate(&subject, pred) {
                    if let Ok(child) = NamedOrBlankNode::try_from(child.into_owned()) {
                        self.collect_chars(&child, &mut chars);
                    }
                }
            }
        }
        chars
    }

    /// Serialize to a wire format.
    pub fn to_wire(&self, format: WireFormat) -> GraphResult<String> {
        serialize_graph(&self.graph, format)
    }

    /// Serialize to compacted JSON-LD with the given context flavor.
    pub fn to_jsonld(&self, flavor: jsonld::ContextFlavor) -> GraphResult<String> {
        jsonld::write_compact(self, flavor)
    }

    fn objects_of(&self, predicate: oxigraph::model::NamedNodeRef<'_>) -> Vec<Term> {
        let Some(root) = self.root() else {
            return Vec::new();
        };
        self.graph
            .objects_for_subject_predicate(&root, predicate)
            .map(|t| t.into_owned())
            .collect()
    }

    fn collect_chars(&self, subject: &NamedOrBlankNode, out: &mut Vec<String>) {
        for obj in self.graph.objects_for_subject_predicate(subject, cnt::CHARS) {
            if let oxigraph::model::TermRef::Literal(l) = obj {
                out.push(l.value().to_string());
            }
        }
    }

    fn uris_only(terms: Vec<Term>) -> Vec<NamedNode> {
        terms
            .into_iter()
            .filter_map(|t| match t {
                Term::NamedNode(n) => Some(n),
                _ => None,
            })
            .collect()
    }
}
