//! Bidirectional graph ⇄ container-tree mappers.
//!
//! [`write::WriteMapper`] decomposes an annotation graph into LDP resource
//! creations; [`read::ReadMapper`] loads a container tree back and
//! reassembles an isomorphic graph. Both share the classifier in
//! [`crate::graph::classify`] and the store contract in [`crate::ldp`].

pub mod read;
pub mod write;

pub use read::ReadMapper;
pub use write::{CreatedAnno, WriteMapper};
