use std::collections::HashSet;

/// Splits `s` into word-like tokens: maximal runs of alphanumeric characters
/// or `_`. Duplicates are dropped, first occurrence wins, so the result is a
/// token *set* in encounter order. A value with no word-like content yields
/// an empty set.
///
/// The same function feeds both filter population at block-build time and
/// probing at query time; any asymmetry between the two would manufacture
/// false negatives.
pub fn tokenize_value(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut seen = HashSet::new();
    for word in s.split(|c: char| !is_token_char(c)) {
        if word.is_empty() {
            continue;
        }
        if seen.insert(word) {
            tokens.push(word.to_string());
        }
    }
    tokens
}

/// Tokenizes every value and returns the union of their token sets, again
/// deduplicated in encounter order. Used to populate a column's filter.
pub fn tokenize_values<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for v in values {
        for word in v.as_ref().split(|c: char| !is_token_char(c)) {
            if word.is_empty() || seen.contains(word) {
                continue;
            }
            seen.insert(word.to_string());
            tokens.push(word.to_string());
        }
    }
    tokens
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
