//! Search projection: flat documents for indexing and query expressions
//! built from free-form request parameters.

pub mod doc;
pub mod query;
pub mod solr;

pub use doc::{graph_to_search_doc, SearchDocument};
pub use query::{params_to_search_query, SearchQuery};
pub use solr::SolrClient;
