//! Rich diagnostic error types for the scholia core.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and upstream status/body pass-through so
//! callers can proxy store failures verbatim.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the scholia core.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text, sources) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum ScholiaError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("failed to parse {format} payload: {message}")]
    #[diagnostic(
        code(scholia::graph::parse),
        help(
            "The wire payload is not valid for the declared format. \
             Check the content type sent by the client and the payload syntax."
        )
    )]
    Parse { format: String, message: String },

    #[error("failed to serialize graph to {format}: {message}")]
    #[diagnostic(
        code(scholia::graph::serialize),
        help("The in-memory graph contains a term the serializer rejects.")
    )]
    Serialize { format: String, message: String },

    #[error("graph has no oa:Annotation root node")]
    #[diagnostic(
        code(scholia::graph::no_root),
        help(
            "Every annotation graph must contain exactly one subject with \
             rdf:type oa:Annotation. Check the incoming payload."
        )
    )]
    NoRootNode,

    #[error("invalid IRI: {iri}")]
    #[diagnostic(
        code(scholia::graph::bad_iri),
        help("The value could not be parsed as an absolute IRI.")
    )]
    BadIri { iri: String },
}

// ---------------------------------------------------------------------------
// Validation errors (pre-network, never retried)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    #[error("incoming annotation already carries a persistent id: {subject}")]
    #[diagnostic(
        code(scholia::validation::already_persisted),
        help(
            "The root of a new annotation must be a blank node; its id is \
             assigned by the store at first persistence. To update an existing \
             annotation, delete it and create a new one."
        )
    )]
    AlreadyPersisted { subject: String },

    #[error("incoming graph contains the reserved predicate {predicate}")]
    #[diagnostic(
        code(scholia::validation::reserved_predicate),
        help(
            "The external-reference marker predicate is internal bookkeeping \
             for locally persisted stand-ins. Its presence in an incoming graph \
             is ambiguous with store state and is rejected. Remove those \
             statements and resubmit."
        )
    )]
    ReservedPredicate { predicate: String },
}

// ---------------------------------------------------------------------------
// Storage errors (LDP store client)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StorageError {
    #[error("store returned HTTP {status}: {body}")]
    #[diagnostic(
        code(scholia::storage::http),
        help(
            "The LDP store rejected the operation. 404 means the resource is \
             gone or never existed; 409/412 mean a conflicting state. The \
             upstream body is carried verbatim for proxying."
        )
    )]
    Http { status: u16, body: String },

    #[error("store request failed before a response: {message}")]
    #[diagnostic(
        code(scholia::storage::transport),
        help("Is the LDP store reachable at the configured URL?")
    )]
    Transport { message: String },

    #[error("store created a resource but returned no Location header")]
    #[diagnostic(
        code(scholia::storage::missing_location),
        help(
            "An LDP POST must answer 201 with a Location header naming the new \
             resource. The store is not behaving as an LDP server."
        )
    )]
    MissingLocation,

    #[error("refusing to delete {uri}: outside the configured store root {root}")]
    #[diagnostic(
        code(scholia::storage::containment),
        help(
            "Deletions are only issued for resources contained in the \
             configured LDP root. Check the URI for typos or a stale \
             configuration."
        )
    )]
    NotContained { uri: String, root: String },
}

// ---------------------------------------------------------------------------
// Search errors (search client — retried a bounded number of times first)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SearchError {
    #[error("search service returned HTTP {status}: {body}")]
    #[diagnostic(
        code(scholia::search::http),
        help("The search service rejected the request after all retries.")
    )]
    Http { status: u16, body: String },

    #[error("search request failed before a response: {message}")]
    #[diagnostic(
        code(scholia::search::transport),
        help("Is the search service reachable at the configured URL?")
    )]
    Transport { message: String },

    #[error("unexpected search response shape: {message}")]
    #[diagnostic(
        code(scholia::search::response),
        help("The search service answered 2xx but not with the expected JSON.")
    )]
    Response { message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    #[diagnostic(
        code(scholia::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read { path: String, message: String },

    #[error("invalid config: {message}")]
    #[diagnostic(
        code(scholia::config::invalid),
        help("Check the TOML syntax and field names against the documented schema.")
    )]
    Invalid { message: String },
}

/// Convenience alias for functions returning scholia results.
pub type ScholiaResult<T> = std::result::Result<T, ScholiaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_converts_to_scholia_error() {
        let err = ValidationError::AlreadyPersisted {
            subject: "http://example.org/anno/1".into(),
        };
        let top: ScholiaError = err.into();
        assert!(matches!(
            top,
            ScholiaError::Validation(ValidationError::AlreadyPersisted { .. })
        ));
    }

    #[test]
    fn storage_error_carries_status_and_body() {
        let err = StorageError::Http {
            status: 409,
            body: "conflict".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("409"));
        assert!(msg.contains("conflict"));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = ValidationError::ReservedPredicate {
            predicate: "https://scholia.dev/ns/externalReference".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("externalReference"));
    }
}
