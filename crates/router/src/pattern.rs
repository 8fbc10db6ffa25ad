//! Path pattern matching and parameter extraction.
//!
//! A route schema is a `/`-separated list of segments. Each segment is either a literal
//! (`users`) or a named placeholder (`:id`) which matches any single segment.
//!
//! ```
//! use micro_router::pattern::{extract_params, is_url_matched};
//!
//! assert!(is_url_matched("/users/:id", "/users/42/", false));
//!
//! let params = extract_params("/users/42?full=1", "/users/:id");
//! assert_eq!(params.get("id"), Some("42"));
//! ```

use crate::PathParams;

/// Splits a path on `/` after trimming leading and trailing slashes.
///
/// An empty path (or `/`) yields a single empty segment.
pub fn segments(path: &str) -> Vec<&str> {
    path.trim_matches('/').split('/').collect()
}

/// Compares url segments against schema segments.
///
/// Both sides must have the same number of segments. Schema segments starting with `:`
/// match anything, the others must be equal (ignoring ASCII case unless `case_sensitive`).
pub fn compare_segments(url_segments: &[&str], schema_segments: &[&str], case_sensitive: bool) -> bool {
    if url_segments.len() != schema_segments.len() {
        return false;
    }

    url_segments.iter().zip(schema_segments).all(|(url_segment, schema_segment)| {
        if schema_segment.starts_with(':') {
            return true;
        }

        if case_sensitive { url_segment == schema_segment } else { url_segment.eq_ignore_ascii_case(schema_segment) }
    })
}

/// Checks whether a request path matches a route schema.
pub fn is_url_matched(schema: &str, path: &str, case_sensitive: bool) -> bool {
    let schema_segments = segments(schema.trim_end_matches('/'));
    let url_segments = segments(path.trim_end_matches('/'));
    compare_segments(&url_segments, &schema_segments, case_sensitive)
}

/// Extracts the `:name` bindings of `schema` from `url`.
///
/// The query string is ignored. A segment count mismatch or a literal mismatch yields
/// empty params, which is indistinguishable from a schema without placeholders.
/// Literal segments are compared case-sensitively here.
pub fn extract_params(url: &str, schema: &str) -> PathParams {
    let path = url.split('?').next().unwrap_or_default();
    let url_segments = segments(path);
    let schema_segments = segments(schema);

    if url_segments.len() != schema_segments.len() {
        return PathParams::empty();
    }

    let mut params = PathParams::empty();
    for (schema_segment, url_segment) in schema_segments.iter().zip(&url_segments) {
        if let Some(name) = schema_segment.strip_prefix(':') {
            params.insert(name, *url_segment);
        } else if schema_segment != url_segment {
            return PathParams::empty();
        }
    }

    params
}

/// Substitutes the `:name` segments of `schema` with the matching `params`.
///
/// Placeholders without a value are kept as they are.
pub fn fill_params(schema: &str, params: &PathParams) -> String {
    schema
        .split('/')
        .map(|segment| match segment.strip_prefix(':').and_then(|name| params.get(name)) {
            Some(value) => value,
            None => segment,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Joins a mount prefix and a route path without doubling the separator.
pub(crate) fn join_paths(prefix: &str, path: &str) -> String {
    match (prefix.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", prefix, &path[1..]),
        (false, false) if !prefix.is_empty() && !path.is_empty() => format!("{prefix}/{path}"),
        _ => format!("{prefix}{path}"),
    }
}
