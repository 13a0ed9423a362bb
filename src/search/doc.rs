//! Flat search-document projection of an annotation graph.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use oxigraph::model::{NamedOrBlankNode, Term};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::GraphError;
use crate::graph::classify::{classify, BodyOrTarget};
use crate::graph::jsonld::ContextFlavor;
use crate::graph::{AnnotationGraph, GraphResult};

/// One indexable document. Scalar and array fields only; `anno_jsonld`
/// carries the full serialization so a hit can be returned without
/// re-querying the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub id: String,
    /// First path segment of the id; equals the id for flat ids.
    pub root: String,
    pub motivation: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_at: Option<String>,
    pub target_url: Vec<String>,
    pub target_type: Vec<String>,
    pub body_url: Vec<String>,
    pub body_type: Vec<String>,
    pub body_chars_exact: Vec<String>,
    pub anno_jsonld: String,
}

/// Derive the search document for a persisted annotation graph.
///
/// The graph must carry its assigned root URI (i.e. come from the read
/// mapper or a post-create read-back).
pub fn graph_to_search_doc(anno: &AnnotationGraph, config: &Config) -> GraphResult<SearchDocument> {
    let root_uri = anno.id_as_uri().ok_or(GraphError::NoRootNode)?;
    let id = root_uri
        .as_str()
        .strip_prefix(config.base_uri.as_str())
        .map(|s| s.trim_start_matches('/'))
        .unwrap_or(root_uri.as_str())
        .to_string();
    let root = id.split('/').next().unwrap_or(&id).to_string();

    let motivation = anno
        .motivations()
        .iter()
        .map(|m| short_form(m.as_str()))
        .collect();

    let annotated_at = anno.annotated_at().as_deref().and_then(lenient_iso8601);

    let target_url: Vec<String> = anno
        .target_uris()
        .iter()
        .map(|u| u.as_str().to_string())
        .collect();
    let body_url: Vec<String> = anno
        .body_uris()
        .iter()
        .map(|u| u.as_str().to_string())
        .collect();

    let target_type = type_tags(anno, anno.target_nodes(), None);
    let body_type = type_tags(anno, anno.body_nodes(), Some("no_body"));

    let body_chars_exact = anno
        .body_chars()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();

    let anno_jsonld = anno.to_jsonld(ContextFlavor::OaGeneric)?;

    Ok(SearchDocument {
        id,
        root,
        motivation,
        annotated_at,
        target_url,
        target_type,
        body_url,
        body_type,
        body_chars_exact,
        anno_jsonld,
    })
}

/// Short form of a motivation URI: the fragment, else the last path segment.
fn short_form(uri: &str) -> String {
    match uri.rsplit_once('#') {
        Some((_, fragment)) if !fragment.is_empty() => fragment.to_string(),
        _ => uri.rsplit('/').next().unwrap_or(uri).to_string(),
    }
}

/// Lenient ISO-8601 normalization: several common shapes parse, anything
/// else maps to absent rather than an error.
fn lenient_iso8601(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(
            dt.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(
                naive
                    .and_utc()
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        return Some(
            naive
                .and_utc()
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }
    None
}

/// Deduplicated type tags for a member list; `empty_tag` (when given) is
/// used for an empty list.
fn type_tags(anno: &AnnotationGraph, nodes: Vec<Term>, empty_tag: Option<&str>) -> Vec<String> {
    if nodes.is_empty() {
        return empty_tag.map(|t| vec![t.to_string()]).unwrap_or_default();
    }
    let mut tags: Vec<String> = Vec::new();
    for node in nodes {
        let Ok(node) = NamedOrBlankNode::try_from(node) else {
            continue;
        };
        collect_tags(&classify(anno.graph(), &node), &mut tags);
    }
    tags
}

fn collect_tags(node: &BodyOrTarget, tags: &mut Vec<String>) {
    let push = |tags: &mut Vec<String>, tag: &str| {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    };
    match node {
        BodyOrTarget::PlainExternalUri(_)
        | BodyOrTarget::ExternalReference { .. }
        | BodyOrTarget::SpecificResource { .. } => push(tags, "external_URI"),
        BodyOrTarget::ContentAsText { .. } => push(tags, "content_as_text"),
        BodyOrTarget::Choice { default, items } => {
            if let Some(default) = default {
                collect_tags(default, tags);
            }
            for item in items {
                collect_tags(item, tags);
            }
        }
    }
}
