//! Lexical ranks for ordering issues.

const ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// Rank given to the first issue of a project.
pub const INITIAL_RANK: &str = "m";

/// A rank that sorts strictly after `prev`.
pub fn next_rank(prev: Option<&str>) -> String {
    let Some(prev) = prev.filter(|p| !p.is_empty()) else {
        return INITIAL_RANK.to_string();
    };
    let Some(last) = prev.chars().last() else {
        return INITIAL_RANK.to_string();
    };

    let head = &prev[..prev.len() - last.len_utf8()];
    match ALPHABET.find(last) {
        Some(i) if i + 1 < ALPHABET.len() => format!("{}{}", head, &ALPHABET[i + 1..i + 2]),
        _ => format!("{}{}", prev, INITIAL_RANK),
    }
}
