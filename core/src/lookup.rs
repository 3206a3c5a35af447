//! "Did you mean ...?" support. When the parser or checker hits an unknown
//! identifier, the candidates closest by Damerau-Levenshtein distance are
//! offered as suggestions.

use strsim::damerau_levenshtein;

/// How far apart two words may be and still count as "similar": a quarter of
/// the shorter word's length, but always at least one edit.
fn threshold(a: &str, b: &str) -> usize {
    (a.len().min(b.len()) / 4).max(1)
}

/// Rank `candidates` against an unknown word. Results are sorted by edit
/// distance, ties broken alphabetically, duplicates removed.
pub fn suggestions<'a>(
    unknown: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let distance = damerau_levenshtein(unknown, candidate);
            if distance > 0 && distance <= threshold(unknown, candidate) {
                Some((distance, candidate))
            } else {
                None
            }
        })
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    scored.dedup_by(|a, b| a.1 == b.1);
    scored.into_iter().map(|(_, c)| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_match() {
        let candidates = vec!["const", "char", "class", "restrict"];
        assert_eq!(
            suggestions("cosnt", candidates.iter().copied()),
            vec!["const".to_string()]
        );
    }

    #[test]
    fn test_threshold_scales_with_length() {
        // a 4-letter word only gets 1 edit
        assert!(suggestions("iny", vec!["int"]).len() == 1);
        assert!(suggestions("iyy", vec!["int"]).is_empty());
        // a 12-letter word gets 3
        assert_eq!(
            suggestions("thread_lcoal", vec!["thread_local"]),
            vec!["thread_local".to_string()]
        );
    }

    #[test]
    fn test_ordering_distance_then_alpha() {
        let got = suggestions("signd", vec!["unsigned", "signed", "size_t"]);
        assert_eq!(got, vec!["signed".to_string()]);

        // equal distances fall back to alphabetical order
        let got = suggestions("flot", vec!["flop", "float"]);
        assert_eq!(got, vec!["float".to_string(), "flop".to_string()]);
    }

    #[test]
    fn test_exact_match_is_not_a_suggestion() {
        assert!(suggestions("int", vec!["int"]).is_empty());
    }
}
