//! Free-text catalog search helpers.
//!
//! Catalog search is a case-insensitive substring match across a course's
//! title, description, category name, and instructor name, with no ranking.
//! These helpers live in `core` so the Postgres store (ILIKE) and the
//! in-memory store (direct matching) share one definition of the rules.

/// Normalize a user-supplied query: trim and collapse internal whitespace.
///
/// Returns `None` if the query is empty or whitespace-only.
pub fn normalize_query(query: &str) -> Option<String> {
    let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Case-insensitive substring test against a set of searchable fields.
pub fn matches_any<'a, I>(query: &str, fields: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = query.to_lowercase();
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Escape `%`, `_`, and `\` so user input can be embedded in an ILIKE
/// pattern without acting as wildcards.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
