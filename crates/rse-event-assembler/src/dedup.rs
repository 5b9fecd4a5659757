use std::collections::HashSet;
use std::hash::Hash;

/// Deduplicates `items`, keeping first-seen order. Each vendor-processor hit
/// struct carries exactly the narrowed fields an event is stripped down to,
/// in a fixed field order — so structural `Eq`/`Hash` over those fields is
/// equivalent to a stable-hash-sorted-keys comparison of each event dict,
/// without re-serializing to JSON to get there.
pub fn dedup_stream<T: Eq + Hash + Clone>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_repeats_keeping_first_occurrence_order() {
        let items = vec![1, 2, 1, 3, 2];
        assert_eq!(dedup_stream(items), vec![1, 2, 3]);
    }
}
