//! Fuzzy matching between transaction category labels and budget categories.
//!
//! Category vocabularies entered by users and carried over from imported
//! historical data drift from the canonical enumerated lists, so budgets
//! would silently show zero spend under strict string equality. The matching
//! here is a deliberate, bounded fuzziness: formatting variance plus an
//! explicit synonym table, nothing open-ended.

/// Labels that refer to the same category despite being distinct words.
///
/// A label belongs to a group if it normalizes to one of the group's members,
/// or if it contains every member's word (in any order), e.g.
/// "Gifts/Donations". Extend by adding a new group, not by widening the
/// matching rules.
pub const SYNONYM_GROUPS: [&[&str]; 1] = [&["gifts", "donations"]];

/// Whether two category labels refer to the same category.
///
/// Labels match if they are equal, equal after normalization (trimming,
/// lowercasing, and collapsing internal whitespace), or members of the same
/// declared synonym group.
pub fn categories_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }

    let a = normalize(a);
    let b = normalize(b);

    if a == b {
        return true;
    }

    SYNONYM_GROUPS
        .iter()
        .any(|group| in_group(group, &a) && in_group(group, &b))
}

/// Trim, lowercase, and collapse internal whitespace.
pub fn normalize(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn in_group(group: &[&str], normalized: &str) -> bool {
    group.contains(&normalized) || group.iter().all(|word| normalized.contains(word))
}
