//! Token-set string similarity for name lookup (0-100 scale).

use std::collections::BTreeSet;

/// Lower-case, replace every non-alphanumeric character with a space, trim.
pub fn default_process(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Normalized indel similarity: `100 * 2 * LCS / (len_a + len_b)`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    100.0 * (2 * lcs_len(&a, &b)) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Compare the token sets of two strings, ignoring order and repeated words.
///
/// Scores the shared tokens against each side's full token set and the two
/// leftovers against each other, keeping the best. A string whose tokens are a
/// subset of the other's scores 100.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let a = default_process(a);
    let b = default_process(b);
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let sect = intersection.join(" ");
    let rest_ab = diff_ab.join(" ");
    let rest_ba = diff_ba.join(" ");

    let mut best = ratio(&rest_ab, &rest_ba);
    if !sect.is_empty() {
        let combined_ab = format!("{} {}", sect, rest_ab);
        let combined_ba = format!("{} {}", sect, rest_ba);
        best = best
            .max(ratio(&sect, &combined_ab))
            .max(ratio(&sect, &combined_ba));
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_process() {
        assert_eq!(default_process("  Smith, John-Paul "), "smith  john paul");
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("abc", "abc"), 100.0);
        assert_eq!(ratio("abcd", "abce"), 75.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_token_set_ignores_order_and_punctuation() {
        assert_eq!(token_set_ratio("John Smith", "Smith, John"), 100.0);
    }

    #[test]
    fn test_token_set_subset_scores_full() {
        assert_eq!(token_set_ratio("Quorra", "Republic of Quorra"), 100.0);
        assert_eq!(token_set_ratio("fuzzy was a bear", "fuzzy fuzzy was a bear"), 100.0);
    }

    #[test]
    fn test_token_set_partial_overlap() {
        let score = token_set_ratio("Jon Smith", "John Smith");
        assert!(score > 80.0 && score < 100.0, "score was {}", score);
    }

    #[test]
    fn test_token_set_empty_input() {
        assert_eq!(token_set_ratio("", "anything"), 0.0);
        assert_eq!(token_set_ratio("!!", "anything"), 0.0);
    }
}
