//! RDF vocabulary constants for the annotation domain.
//!
//! One module per vocabulary. Constants are `NamedNodeRef`s so they can be
//! used directly in triple construction and pattern matching without
//! allocation.

use oxigraph::model::NamedNodeRef;

/// Open Annotation vocabulary (`http://www.w3.org/ns/oa#`).
pub mod oa {
    use super::NamedNodeRef;

    pub const NS: &str = "http://www.w3.org/ns/oa#";

    pub const ANNOTATION: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#Annotation");
    pub const HAS_BODY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#hasBody");
    pub const HAS_TARGET: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#hasTarget");
    pub const MOTIVATED_BY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#motivatedBy");
    pub const ANNOTATED_AT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#annotatedAt");
    pub const ANNOTATED_BY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#annotatedBy");

    pub const CHOICE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#Choice");
    pub const DEFAULT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#default");
    pub const ITEM: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#item");

    pub const SPECIFIC_RESOURCE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#SpecificResource");
    pub const HAS_SOURCE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#hasSource");
    pub const HAS_SELECTOR: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#hasSelector");

    pub const FRAGMENT_SELECTOR: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#FragmentSelector");
    pub const TEXT_POSITION_SELECTOR: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#TextPositionSelector");
    pub const TEXT_QUOTE_SELECTOR: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#TextQuoteSelector");
    pub const START: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#start");
    pub const END: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#end");
    pub const EXACT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#exact");
    pub const PREFIX: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#prefix");
    pub const SUFFIX: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#suffix");
    pub const SEMANTIC_TAG: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/oa#SemanticTag");
}

/// Representing Content in RDF (`http://www.w3.org/2011/content#`).
pub mod cnt {
    use super::NamedNodeRef;

    pub const NS: &str = "http://www.w3.org/2011/content#";

    pub const CONTENT_AS_TEXT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2011/content#ContentAsText");
    pub const CHARS: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2011/content#chars");
}

/// Dublin Core elements (`http://purl.org/dc/elements/1.1/`).
pub mod dc {
    use super::NamedNodeRef;

    pub const NS: &str = "http://purl.org/dc/elements/1.1/";

    pub const FORMAT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/format");
    pub const LANGUAGE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/language");
}

/// Dublin Core terms (`http://purl.org/dc/terms/`).
pub mod dcterms {
    use super::NamedNodeRef;

    pub const NS: &str = "http://purl.org/dc/terms/";

    pub const CONFORMS_TO: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/conformsTo");
}

/// DCMI type vocabulary (`http://purl.org/dc/dcmitype/`).
pub mod dcmitype {
    use super::NamedNodeRef;

    pub const TEXT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/dcmitype/Text");
}

/// Linked Data Platform vocabulary (`http://www.w3.org/ns/ldp#`).
pub mod ldp {
    use super::NamedNodeRef;

    pub const NS: &str = "http://www.w3.org/ns/ldp#";

    pub const BASIC_CONTAINER: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#BasicContainer");
    pub const DIRECT_CONTAINER: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#DirectContainer");
    pub const CONTAINS: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#contains");
    pub const MEMBERSHIP_RESOURCE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#membershipResource");
    pub const HAS_MEMBER_RELATION: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#hasMemberRelation");
}

/// The scholia-private vocabulary.
pub mod scholia {
    use super::NamedNodeRef;

    /// Marker predicate recording that a locally persisted node stands in
    /// for an external URI. Reserved: must never appear in incoming graphs.
    pub const EXTERNAL_REFERENCE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("https://scholia.dev/ns/externalReference");
}

/// JSON-LD context URLs selectable at serialization time.
pub mod contexts {
    /// Open Annotation context, dated snapshot.
    pub const OA_DATED: &str = "http://www.w3.org/ns/oa-context-20130208.json";
    /// Open Annotation context, generic (tracks the vocabulary).
    pub const OA_GENERIC: &str = "http://www.w3.org/ns/oa.jsonld";
    /// IIIF Presentation API context.
    pub const IIIF: &str = "http://iiif.io/api/presentation/2/context.json";
}

/// Namespace prefixes of server-managed bookkeeping triples that LDP stores
/// mix into resource representations. Stripped before mapping back to an
/// annotation graph.
pub const SERVER_MANAGED_NS: &[&str] = &[
    "http://www.w3.org/ns/ldp#",
    "http://fedora.info/definitions/v4/repository#",
    "http://mementoweb.org/ns#",
    "http://www.w3.org/ns/auth/acl#",
    "http://www.iana.org/assignments/link-relations/",
];

/// Well-known path segment LDP stores use for skolemized blank nodes.
pub const WELL_KNOWN_GENID: &str = "/.well-known/genid/";
