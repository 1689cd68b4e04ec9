use std::collections::HashSet;
use std::hash::Hash;

/// Tolerance applied to size bounds so that floating-point rounding never
/// prunes a set that could still reach the threshold
const SIZE_BOUND_EPSILON: f64 = 1e-9;

/// Convert usize to f64 with explicit precision loss allowance
///
/// Read counts in a single bundle are far below 2^53, so the conversion is
/// exact in practice.
#[inline]
pub(crate) fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Number of elements shared by two sets.
///
/// Iterates the smaller set and probes the larger one.
pub fn overlap<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> usize {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|x| large.contains(*x)).count()
}

/// Jaccard similarity from set sizes and their intersection size.
///
/// Returns 0.0 when the union is empty.
#[must_use]
pub fn jaccard_from_counts(a_len: usize, b_len: usize, overlap: usize) -> f64 {
    let union = a_len + b_len - overlap;
    if union == 0 {
        0.0
    } else {
        count_to_f64(overlap) / count_to_f64(union)
    }
}

/// Jaccard similarity: |A ∩ B| / |A ∪ B|
///
/// Returns 0.0 when both sets are empty (undefined mathematically, but an
/// empty bundle must never match anything).
pub fn jaccard_similarity<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    jaccard_from_counts(a.len(), b.len(), overlap(a, b))
}

/// Range of set sizes that can still reach `threshold` against a query of
/// `query_len` elements.
///
/// Since |A ∩ B| <= min(|A|, |B|), Jaccard is at most min/max of the two
/// sizes, so any set outside [t·|Q|, |Q|/t] is below the threshold no matter
/// how much it overlaps.
#[must_use]
pub fn size_bounds(query_len: usize, threshold: f64) -> (f64, f64) {
    let q = count_to_f64(query_len);
    (
        q * threshold - SIZE_BOUND_EPSILON,
        q / threshold + SIZE_BOUND_EPSILON,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_jaccard_similarity() {
        let a = set(&["r1", "r2", "r3"]);
        let b = set(&["r2", "r3", "r4"]);

        // intersection = {r2, r3} = 2, union = {r1, r2, r3, r4} = 4
        assert!((jaccard_similarity(&a, &b) - 0.5).abs() < 1e-12);

        // Empty sets should return 0.0
        let empty: HashSet<String> = HashSet::new();
        assert_eq!(jaccard_similarity(&empty, &empty), 0.0);
        assert_eq!(jaccard_similarity(&a, &empty), 0.0);

        // Identical sets should return 1.0
        assert_eq!(jaccard_similarity(&a, &a.clone()), 1.0);
    }

    #[test]
    fn test_jaccard_symmetric() {
        let a = set(&["r1", "r2", "r3", "r7"]);
        let b = set(&["r2", "r3", "r4"]);
        assert_eq!(jaccard_similarity(&a, &b), jaccard_similarity(&b, &a));
        assert_eq!(overlap(&a, &b), overlap(&b, &a));
    }

    #[test]
    fn test_jaccard_disjoint() {
        let a = set(&["r1"]);
        let b = set(&["r2"]);
        assert_eq!(jaccard_similarity(&a, &b), 0.0);
        assert_eq!(overlap(&a, &b), 0);
    }

    #[test]
    fn test_jaccard_from_counts() {
        assert_eq!(jaccard_from_counts(0, 0, 0), 0.0);
        assert_eq!(jaccard_from_counts(3, 3, 2), 0.5);
        assert_eq!(jaccard_from_counts(5, 5, 5), 1.0);
        assert_eq!(jaccard_from_counts(4, 0, 0), 0.0);
    }

    #[test]
    fn test_size_bounds() {
        let (lo, hi) = size_bounds(10, 0.5);
        assert!(lo <= 5.0 && lo > 4.99);
        assert!(hi >= 20.0 && hi < 20.01);

        let (lo, hi) = size_bounds(7, 1.0);
        assert!(lo <= 7.0 && hi >= 7.0);
        assert!(lo > 6.0 && hi < 8.0);
    }

    #[test]
    fn test_size_bound_is_tight() {
        // A set at the lower bound can still reach the threshold exactly
        // (it is a subset of the query)
        let q = set(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]);
        let s = set(&["a"]);
        let t = 0.1;
        let (lo, _) = size_bounds(q.len(), t);
        assert!(count_to_f64(s.len()) >= lo);
        assert!(jaccard_similarity(&q, &s) >= t);
    }
}
