//! Edit-distance text similarity.

/// Similarity in [0, 1] from the Levenshtein distance, normalised by the
/// combined length plus one. Equal strings score 1.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let distance = strsim::levenshtein(a, b) as f64;
    let total = (a.chars().count() + b.chars().count()) as f64;
    (1.0 - distance / (1.0 + total)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_and_empty() {
        assert_eq!(edit_similarity("", ""), 1.0);
        assert_eq!(edit_similarity("项目2016", "项目2016"), 1.0);
    }

    #[test]
    fn test_symmetric_and_bounded() {
        let pairs = [("营业收入", "营业成本"), ("", "abc"), ("第1页", "第12页"), ("kitten", "sitting")];
        for (a, b) in pairs {
            let ab = edit_similarity(a, b);
            assert_eq!(ab, edit_similarity(b, a));
            assert!((0.0..=1.0).contains(&ab));
        }
    }

    #[test]
    fn test_known_values() {
        // Two substitutions over 8 characters.
        assert!((edit_similarity("营业收入", "营业成本") - (1.0 - 2.0 / 9.0)).abs() < 1e-12);
        assert!((edit_similarity("", "abc") - 0.25).abs() < 1e-12);
    }
}
