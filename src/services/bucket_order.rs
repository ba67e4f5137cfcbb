//! Bucket ordering
//!
//! Bucket lists are shown real buckets first, then the default buckets that
//! have not been created yet, each group sorted by name ignoring case.

use crate::models::Bucket;

/// Orders buckets for selection lists and display
pub struct BucketOrderer;

impl BucketOrderer {
    /// Sort a bucket list for presentation.
    ///
    /// The sort is stable: buckets with the same kind and the same name
    /// (ignoring case) keep their catalog order.
    pub fn order(buckets: impl IntoIterator<Item = Bucket>) -> Vec<Bucket> {
        let mut ordered: Vec<Bucket> = buckets.into_iter().collect();
        ordered.sort_by_cached_key(Self::sort_key);
        ordered
    }

    /// Sort borrowed buckets without cloning them
    pub fn order_refs<'b>(buckets: impl IntoIterator<Item = &'b Bucket>) -> Vec<&'b Bucket> {
        let mut ordered: Vec<&Bucket> = buckets.into_iter().collect();
        ordered.sort_by_cached_key(|b| Self::sort_key(b));
        ordered
    }

    fn sort_key(bucket: &Bucket) -> (bool, String) {
        (bucket.is_virtual(), bucket.name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DefaultBucket;

    fn names(buckets: &[Bucket]) -> Vec<&str> {
        buckets.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn test_real_before_virtual_then_name() {
        let buckets = vec![
            Bucket::virtual_default(&DefaultBucket::new("aside", "Aside")),
            Bucket::new(5, "Rent"),
            Bucket::new(2, "groceries"),
        ];

        let ordered = BucketOrderer::order(buckets);
        assert_eq!(names(&ordered), vec!["groceries", "Rent", "Aside"]);
    }

    #[test]
    fn test_virtual_sorts_last_even_when_alphabetically_first() {
        let buckets = vec![
            Bucket::new(1, "Zoo"),
            Bucket::virtual_default(&DefaultBucket::new("aside", "A")),
            Bucket::new(2, "apple"),
            Bucket::virtual_default(&DefaultBucket::new("default", "General")),
        ];

        let ordered = BucketOrderer::order(buckets);
        assert_eq!(names(&ordered), vec!["apple", "Zoo", "A", "General"]);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let buckets = vec![
            Bucket::new(9, "Fun"),
            Bucket::new(3, "fun"),
            Bucket::new(7, "FUN"),
        ];

        let ordered = BucketOrderer::order(buckets);
        let ids: Vec<_> = ordered.iter().map(|b| b.id.to_string()).collect();
        assert_eq!(ids, vec!["9", "3", "7"]);
    }

    #[test]
    fn test_idempotent() {
        let buckets = vec![
            Bucket::virtual_default(&DefaultBucket::new("default", "General")),
            Bucket::new(4, "Savings"),
            Bucket::new(1, "car"),
            Bucket::new(6, "Car"),
        ];

        let once = BucketOrderer::order(buckets);
        let twice = BucketOrderer::order(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_order_refs_matches_order() {
        let buckets = vec![
            Bucket::virtual_default(&DefaultBucket::new("aside", "Aside")),
            Bucket::new(2, "b"),
            Bucket::new(1, "A"),
        ];

        let by_ref: Vec<&str> = BucketOrderer::order_refs(&buckets)
            .into_iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(by_ref, vec!["A", "b", "Aside"]);
        assert!(BucketOrderer::order(Vec::new()).is_empty());
    }
}
