//! Plain substring search over cached records.

use super::CatalogRecord;

/// Returns the records matching every whitespace-separated token of `query`,
/// ordered by id. An empty query matches everything.
pub fn search<'a, R: CatalogRecord>(records: &'a [R], query: &str) -> Vec<&'a R> {
    let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

    let mut matches: Vec<&R> = records
        .iter()
        .filter(|record| {
            let haystack = haystack(*record);
            tokens
                .iter()
                .all(|token| haystack.iter().any(|term| term.contains(token.as_str())))
        })
        .collect();
    matches.sort_by(|a, b| a.id().cmp(b.id()));
    matches
}

fn haystack<R: CatalogRecord>(record: &R) -> Vec<String> {
    std::iter::once(record.id())
        .chain(record.names().values().map(String::as_str))
        .chain(record.search_terms())
        .map(str::to_lowercase)
        .collect()
}
