//! # scholia
//!
//! Open Annotation store core: a bidirectional codec between a semantic
//! annotation (a small RDF graph of body, target, and motivation, per the
//! Open Annotation / IIIF models) and a persistent tree of LDP containers
//! in a remote triple store, plus flat projections for search indexing.
//!
//! ## Architecture
//!
//! - **Graph model** (`graph`): oxigraph-backed annotation graph with typed
//!   accessors, wire-format parsing/serialization, JSON-LD compaction
//! - **Classifier** (`graph::classify`): closed five-variant body/target
//!   union, produced once and matched exhaustively
//! - **Mappers** (`mapper`): write path (graph → container tree) and read
//!   path (container tree → graph) over the LDP store contract
//! - **LDP clients** (`ldp`): ureq HTTP client and an in-memory fake with
//!   store-faithful id assignment and skolemization
//! - **Search** (`search`): document projection, query builder, Solr-style
//!   client with bounded retry
//!
//! ## Library usage
//!
//! ```no_run
//! use scholia::config::Config;
//! use scholia::graph::{AnnotationGraph, WireFormat};
//! use scholia::repo::AnnotationRepo;
//!
//! let repo = AnnotationRepo::new(Config::default()).unwrap();
//! let ttl = br#"
//!     @prefix oa: <http://www.w3.org/ns/oa#> .
//!     [] a oa:Annotation ;
//!        oa:motivatedBy oa:bookmarking ;
//!        oa:hasTarget <http://purl.stanford.edu/kq131cs7229> .
//! "#;
//! let anno = AnnotationGraph::from_wire(ttl, WireFormat::Turtle).unwrap();
//! let created = repo.create(&anno).unwrap();
//! let reread = repo.find(&created.id).unwrap();
//! assert_eq!(reread.len(), anno.len());
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod ldp;
pub mod mapper;
pub mod repo;
pub mod search;
pub mod vocab;

pub use error::{ScholiaError, ScholiaResult};
