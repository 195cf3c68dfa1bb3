//! Rejects requests whose path or query carries common attack payloads.

use axum::http::Uri;

/// Lowercased substrings matched against the raw path and query.
const SIGNATURES: &[(&str, &str)] = &[
    ("../", "path-traversal"),
    ("..\\", "path-traversal"),
    ("..%2f", "path-traversal"),
    ("%2e%2e", "path-traversal"),
    ("/etc/passwd", "path-traversal"),
    ("<script", "xss"),
    ("%3cscript", "xss"),
    ("javascript:", "xss"),
    ("onerror=", "xss"),
    ("union select", "sql-injection"),
    ("union+select", "sql-injection"),
    ("union%20select", "sql-injection"),
    ("' or '1'='1", "sql-injection"),
    ("%27%20or%20", "sql-injection"),
    ("'+or+", "sql-injection"),
    ("; drop table", "sql-injection"),
    ("%3b%20drop%20table", "sql-injection"),
    ("sleep(", "sql-injection"),
    ("${jndi:", "log4shell"),
    ("%24%7bjndi", "log4shell"),
];

/// Returns the name of the first matching rule, if any.
pub fn inspect(uri: &Uri) -> Option<&'static str> {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
        .to_lowercase();

    SIGNATURES
        .iter()
        .find(|(needle, _)| target.contains(needle))
        .map(|(_, rule)| *rule)
}
