//! Search-query builder: free-form request parameters to a query-engine
//! expression.
//!
//! Recognized keys map to fixed index fields; everything else is ignored.
//! Key matching is case-insensitive. Values are escaped for the engine's
//! query syntax; URI keys expand to an exact match OR a fragment-wildcard
//! match when the URI carries no fragment already.

/// A conjunction of disjunctive clauses over index fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// AND-joined groups; each group is OR-joined alternatives, already
    /// rendered as `field:value` terms.
    clauses: Vec<Vec<String>>,
}

impl SearchQuery {
    /// Whether any recognized parameter contributed a clause.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The clause groups, for inspection.
    pub fn clauses(&self) -> &[Vec<String>] {
        &self.clauses
    }

    /// Render the final query string. No clauses means match-all.
    pub fn to_query_string(&self) -> String {
        if self.clauses.is_empty() {
            return "*:*".to_string();
        }
        self.clauses
            .iter()
            .map(|alternatives| {
                if alternatives.len() == 1 {
                    alternatives[0].clone()
                } else {
                    format!("({})", alternatives.join(" OR "))
                }
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn push(&mut self, alternatives: Vec<String>) {
        if !alternatives.is_empty() {
            self.clauses.push(alternatives);
        }
    }
}

/// Build a query from request parameters. Unrecognized keys are ignored;
/// repeated keys each contribute a clause.
pub fn params_to_search_query(params: &[(String, String)]) -> SearchQuery {
    let mut query = SearchQuery::default();
    for (key, value) in params {
        match key.to_ascii_lowercase().as_str() {
            "targeturi" => query.push(url_alternatives("target_url", value)),
            "bodyuri" => query.push(url_alternatives("body_url", value)),
            "bodyexact" => query.push(vec![format!(
                "body_chars_exact:\"{}\"",
                value.replace('\\', "\\\\").replace('"', "\\\"")
            )]),
            "bodykeyword" => {
                let escaped = solr_escape(value);
                query.push(vec![
                    format!("body_chars_exact:{escaped}^3"),
                    format!("body_chars_unstem:{escaped}^2"),
                    format!("body_chars_stem:{escaped}"),
                ]);
            }
            "motivatedby" => {
                query.push(vec![format!(
                    "motivation:{}",
                    solr_escape(&motivation_short_form(value))
                )]);
            }
            "anno_root" => query.push(vec![format!("root:{}", solr_escape(value))]),
            _ => {
                tracing::debug!(key = %key, "ignoring unrecognized search parameter");
            }
        }
    }
    query
}

/// Exact match, plus a fragment-wildcard alternative when the URI has no
/// fragment of its own.
fn url_alternatives(field: &str, url: &str) -> Vec<String> {
    let mut alternatives = vec![format!("{field}:{}", solr_escape(url))];
    if !url.contains('#') {
        alternatives.push(format!("{field}:{}\\#*", solr_escape(url)));
    }
    alternatives
}

/// Motivation values arrive as short names, prefixed names, or full URIs;
/// the index stores the short form.
fn motivation_short_form(value: &str) -> String {
    let tail = match value.rsplit_once('#') {
        Some((_, fragment)) if !fragment.is_empty() => fragment,
        _ => value,
    };
    match tail.rsplit_once(':') {
        Some((prefix, local)) if !prefix.contains('/') && !local.is_empty() => local.to_string(),
        _ => tail.rsplit('/').next().unwrap_or(tail).to_string(),
    }
}

/// Escape the engine's query metacharacters and whitespace.
fn solr_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_whitespace()
            || matches!(
                c,
                '+' | '-'
                    | '&'
                    | '|'
                    | '!'
                    | '('
                    | ')'
                    | '{'
                    | '}'
                    | '['
                    | ']'
                    | '^'
                    | '"'
                    | '~'
                    | '*'
                    | '?'
                    | ':'
                    | '\\'
                    | '/'
            )
        {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn target_uri_without_fragment_expands_to_two_alternatives() {
        let query = params_to_search_query(&params(&[("targetUri", "http://x.org/y")]));
        assert_eq!(query.clauses().len(), 1);
        assert_eq!(query.clauses()[0].len(), 2);
        assert_eq!(query.clauses()[0][0], "target_url:http\\:\\/\\/x.org\\/y");
        assert_eq!(
            query.clauses()[0][1],
            "target_url:http\\:\\/\\/x.org\\/y\\#*"
        );
        assert_eq!(
            query.to_query_string(),
            "(target_url:http\\:\\/\\/x.org\\/y OR target_url:http\\:\\/\\/x.org\\/y\\#*)"
        );
    }

    #[test]
    fn target_uri_with_fragment_stays_exact() {
        let query = params_to_search_query(&params(&[("targetUri", "http://x.org/y#frag")]));
        assert_eq!(query.clauses()[0].len(), 1);
        assert!(query.clauses()[0][0].ends_with("frag"));
    }

    #[test]
    fn keys_match_case_insensitively() {
        for key in ["targetUri", "targeturi", "TARGETURI", "TargetUri"] {
            let query = params_to_search_query(&params(&[(key, "http://x.org/y")]));
            assert!(!query.is_empty(), "key {key} should be recognized");
        }
    }

    #[test]
    fn unrecognized_keys_are_ignored_without_error() {
        let query = params_to_search_query(&params(&[
            ("wavelength", "42"),
            ("bodyExact", "I love this"),
        ]));
        assert_eq!(query.clauses().len(), 1);
        assert_eq!(
            query.to_query_string(),
            "body_chars_exact:\"I love this\""
        );
    }

    #[test]
    fn body_keyword_builds_boosted_alternatives() {
        let query = params_to_search_query(&params(&[("bodyKeyword", "manuscript")]));
        assert_eq!(
            query.clauses()[0],
            vec![
                "body_chars_exact:manuscript^3".to_string(),
                "body_chars_unstem:manuscript^2".to_string(),
                "body_chars_stem:manuscript".to_string(),
            ]
        );
    }

    #[test]
    fn motivation_accepts_short_prefixed_and_full_forms() {
        for value in [
            "bookmarking",
            "oa:bookmarking",
            "http://www.w3.org/ns/oa#bookmarking",
        ] {
            let query = params_to_search_query(&params(&[("motivatedBy", value)]));
            assert_eq!(query.to_query_string(), "motivation:bookmarking");
        }
    }

    #[test]
    fn anno_root_maps_to_root_field() {
        let query = params_to_search_query(&params(&[("anno_root", "ab")]));
        assert_eq!(query.to_query_string(), "root:ab");
    }

    #[test]
    fn multiple_params_and_join() {
        let query = params_to_search_query(&params(&[
            ("motivatedBy", "commenting"),
            ("anno_root", "xy"),
        ]));
        assert_eq!(
            query.to_query_string(),
            "motivation:commenting AND root:xy"
        );
    }

    #[test]
    fn empty_params_match_all() {
        let query = params_to_search_query(&[]);
        assert!(query.is_empty());
        assert_eq!(query.to_query_string(), "*:*");
    }
}
