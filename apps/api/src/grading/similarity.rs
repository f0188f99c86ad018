use std::collections::HashSet;

/// Overlap above which a submission is treated as copied from the customer description.
pub const COPY_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Token-overlap similarity in [0, 1].
///
/// Tokens are maximal runs of alphanumerics and `_`, lowercased, deduplicated.
/// The score is `|A ∩ B| / max(|A|, |B|)`, so a short text fully contained in a
/// long one still scores low. Returns 0.0 when either side has no tokens.
pub fn similarity(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let shared = tokens_a.intersection(&tokens_b).count();
    shared as f64 / tokens_a.len().max(tokens_b.len()) as f64
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_text_is_one() {
        let text = "Customer cannot connect to cluster";
        assert_eq!(similarity(text, text), 1.0);
    }

    #[test]
    fn test_empty_side_is_zero() {
        assert_eq!(similarity("Customer cannot connect", ""), 0.0);
        assert_eq!(similarity("", "Customer cannot connect"), 0.0);
        assert_eq!(similarity("!!! ---", "words here"), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let a = "Restarted the ingest service on node-3";
        let b = "The service was restarted; ingest is healthy again";
        assert_eq!(similarity(a, b), similarity(b, a));
    }

    #[test]
    fn test_case_and_punctuation_ignored() {
        assert_eq!(similarity("Cluster, DOWN!", "cluster down"), 1.0);
    }

    #[test]
    fn test_underscore_joins_tokens() {
        // "max_connections" is one token, so it does not match "max" or "connections"
        assert_eq!(similarity("max_connections", "max connections"), 0.0);
    }

    #[test]
    fn test_denominator_is_larger_set() {
        // 2 shared tokens, larger side has 4 distinct tokens
        let score = similarity("cluster down", "cluster down since monday");
        assert!((score - 0.5).abs() < f64::EPSILON, "Score was {score}");
    }

    #[test]
    fn test_repeated_tokens_counted_once() {
        assert_eq!(similarity("error error error", "error"), 1.0);
    }

    #[test]
    fn test_unicode_words_are_tokens() {
        assert_eq!(similarity("Größe überschritten", "größe ÜBERSCHRITTEN"), 1.0);
    }
}
