//! Stratified train/dev/test partitioning of a labelled dataset.
//!
//! Rows are assigned per label in their original file order: the first
//! `train_ratio` of each label's rows go to train, the next `dev_ratio`
//! to dev, and the remainder to test. No shuffling, no dropped rows.

use std::collections::HashMap;

use crate::dataset::Record;

/// Split ratios; the test share is whatever remains.
#[derive(Debug, Clone, Copy)]
pub struct SplitRatios {
    pub train: f64,
    pub dev: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.7,
            dev: 0.15,
        }
    }
}

impl SplitRatios {
    /// True when both shares are positive and leave room for a test share.
    pub fn is_valid(&self) -> bool {
        self.train > 0.0 && self.dev >= 0.0 && self.train + self.dev < 1.0
    }
}

/// Partition records into (train, dev, test), stratified by label.
///
/// Per-label order is preserved; every input row lands in exactly one
/// split. Labels with very few rows may leave dev or test empty — the
/// quota is proportional, not a minimum.
pub fn stratified_split(
    records: Vec<Record>,
    ratios: SplitRatios,
) -> (Vec<Record>, Vec<Record>, Vec<Record>) {
    let mut totals: HashMap<String, usize> = HashMap::new();
    for record in &records {
        *totals.entry(record.label.clone()).or_insert(0) += 1;
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut train = Vec::new();
    let mut dev = Vec::new();
    let mut test = Vec::new();

    for record in records {
        let total = totals[&record.label] as f64;
        let position = seen.entry(record.label.clone()).or_insert(0);
        let rank = *position as f64;
        *position += 1;

        if rank < total * ratios.train {
            train.push(record);
        } else if rank < total * (ratios.train + ratios.dev) {
            dev.push(record);
        } else {
            test.push(record);
        }
    }

    (train, dev, test)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str, text: &str) -> Record {
        Record {
            label: label.to_string(),
            text: text.to_string(),
        }
    }

    fn uniform(label: &str, n: usize) -> Vec<Record> {
        (0..n).map(|i| record(label, &format!("{label} {i}"))).collect()
    }

    #[test]
    fn test_split_sizes() {
        let records = uniform("a", 100);
        let (train, dev, test) = stratified_split(records, SplitRatios::default());
        assert_eq!(train.len(), 70);
        assert_eq!(dev.len(), 15);
        assert_eq!(test.len(), 15);
    }

    #[test]
    fn test_stratified_per_label() {
        let mut records = uniform("a", 20);
        records.extend(uniform("b", 40));
        let (train, dev, test) = stratified_split(records, SplitRatios::default());

        let count = |split: &[Record], label: &str| {
            split.iter().filter(|r| r.label == label).count()
        };
        assert_eq!(count(&train, "a"), 14);
        assert_eq!(count(&train, "b"), 28);
        assert_eq!(count(&dev, "a"), 3);
        assert_eq!(count(&dev, "b"), 6);
        assert_eq!(count(&test, "a"), 3);
        assert_eq!(count(&test, "b"), 6);
    }

    #[test]
    fn test_order_preserved_within_split() {
        let records = uniform("a", 10);
        let (train, _, _) = stratified_split(records, SplitRatios::default());
        let texts: Vec<&str> = train.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["a 0", "a 1", "a 2", "a 3", "a 4", "a 5", "a 6"]);
    }

    #[test]
    fn test_no_rows_dropped() {
        let mut records = uniform("x", 7);
        records.extend(uniform("y", 3));
        let n = records.len();
        let (train, dev, test) = stratified_split(records, SplitRatios::default());
        assert_eq!(train.len() + dev.len() + test.len(), n);
    }

    #[test]
    fn test_tiny_label() {
        let records = uniform("rare", 1);
        let (train, dev, test) = stratified_split(records, SplitRatios::default());
        assert_eq!(train.len(), 1);
        assert!(dev.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_ratio_validity() {
        assert!(SplitRatios::default().is_valid());
        assert!(!SplitRatios { train: 0.9, dev: 0.2 }.is_valid());
        assert!(!SplitRatios { train: 0.0, dev: 0.5 }.is_valid());
    }
}
