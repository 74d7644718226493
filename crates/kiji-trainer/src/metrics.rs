//! Classification metrics for evaluating the trained model.
//!
//! Accuracy, per-class precision/recall/F1 with support, macro averages,
//! and a confusion matrix, reported in an sklearn-style table.

use std::fmt;

/// Compute classification accuracy.
///
/// # Panics
///
/// Panics if the slices have different lengths or are empty.
#[must_use]
pub fn accuracy(y_pred: &[usize], y_true: &[usize]) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "prediction/label length mismatch");
    assert!(!y_true.is_empty(), "metrics need at least one example");

    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();
    correct as f32 / y_true.len() as f32
}

/// Compute the `n_classes × n_classes` confusion matrix.
///
/// `matrix[t][p]` counts examples with true class `t` predicted as `p`.
///
/// # Panics
///
/// Panics on length mismatch or a class index `>= n_classes`.
#[must_use]
pub fn confusion_matrix(y_pred: &[usize], y_true: &[usize], n_classes: usize) -> Vec<Vec<usize>> {
    assert_eq!(y_pred.len(), y_true.len(), "prediction/label length mismatch");

    let mut matrix = vec![vec![0usize; n_classes]; n_classes];
    for (&p, &t) in y_pred.iter().zip(y_true.iter()) {
        assert!(t < n_classes && p < n_classes, "class index out of range");
        matrix[t][p] += 1;
    }
    matrix
}

/// Per-class precision/recall/F1 and support.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    pub support: usize,
}

/// Full evaluation report for one split.
#[derive(Debug, Clone)]
pub struct ClassificationReport {
    class_names: Vec<String>,
    per_class: Vec<ClassMetrics>,
    accuracy: f32,
    confusion: Vec<Vec<usize>>,
}

impl ClassificationReport {
    /// Evaluate predictions against labels for `class_names.len()` classes.
    ///
    /// # Panics
    ///
    /// Panics on empty input, length mismatch, or out-of-range class
    /// indices.
    #[must_use]
    pub fn compute(y_pred: &[usize], y_true: &[usize], class_names: &[String]) -> Self {
        let n_classes = class_names.len();
        let confusion = confusion_matrix(y_pred, y_true, n_classes);

        let per_class = (0..n_classes)
            .map(|class| {
                let tp = confusion[class][class];
                let fp: usize = (0..n_classes)
                    .filter(|&t| t != class)
                    .map(|t| confusion[t][class])
                    .sum();
                let fn_count: usize = (0..n_classes)
                    .filter(|&p| p != class)
                    .map(|p| confusion[class][p])
                    .sum();
                let support: usize = confusion[class].iter().sum();

                let precision = ratio(tp, tp + fp);
                let recall = ratio(tp, tp + fn_count);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        Self {
            class_names: class_names.to_vec(),
            per_class,
            accuracy: accuracy(y_pred, y_true),
            confusion,
        }
    }

    /// Overall accuracy.
    #[must_use]
    pub fn accuracy(&self) -> f32 {
        self.accuracy
    }

    /// Metrics for one class index.
    #[must_use]
    pub fn class(&self, index: usize) -> Option<&ClassMetrics> {
        self.per_class.get(index)
    }

    /// Unweighted mean of per-class (precision, recall, F1).
    #[must_use]
    pub fn macro_avg(&self) -> (f32, f32, f32) {
        let n = self.per_class.len().max(1) as f32;
        let (p, r, f) = self.per_class.iter().fold((0.0, 0.0, 0.0), |acc, m| {
            (acc.0 + m.precision, acc.1 + m.recall, acc.2 + m.f1)
        });
        (p / n, r / n, f / n)
    }

    /// The underlying confusion matrix (`[true][predicted]`).
    #[must_use]
    pub fn confusion(&self) -> &[Vec<usize>] {
        &self.confusion
    }

    /// Total number of evaluated examples.
    #[must_use]
    pub fn total_support(&self) -> usize {
        self.per_class.iter().map(|m| m.support).sum()
    }
}

fn ratio(numerator: usize, denominator: usize) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .class_names
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max("macro avg".len());

        writeln!(
            f,
            "{:>name_width$}  {:>9}  {:>9}  {:>9}  {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (name, m) in self.class_names.iter().zip(&self.per_class) {
            writeln!(
                f,
                "{name:>name_width$}  {:>9.4}  {:>9.4}  {:>9.4}  {:>9}",
                m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>name_width$}  {:>9}  {:>9}  {:>9.4}  {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.total_support()
        )?;
        let (p, r, f1) = self.macro_avg();
        writeln!(
            f,
            "{:>name_width$}  {p:>9.4}  {r:>9.4}  {f1:>9.4}  {:>9}",
            "macro avg",
            self.total_support()
        )?;

        writeln!(f, "\nconfusion matrix (rows = true, cols = predicted):")?;
        for (name, row) in self.class_names.iter().zip(&self.confusion) {
            write!(f, "{name:>name_width$}")?;
            for count in row {
                write!(f, "  {count:>6}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_accuracy() {
        let y_true = vec![0, 1, 2, 0, 1, 2];
        let y_pred = vec![0, 2, 1, 0, 0, 1];
        assert!((accuracy(&y_pred, &y_true) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_perfect_predictions() {
        let y = vec![0, 1, 1, 0];
        let report = ClassificationReport::compute(&y, &y, &names(&["a", "b"]));
        assert_eq!(report.accuracy(), 1.0);
        let m = report.class(0).unwrap();
        assert_eq!(m.precision, 1.0);
        assert_eq!(m.recall, 1.0);
        assert_eq!(m.f1, 1.0);
        assert_eq!(m.support, 2);
    }

    #[test]
    fn test_confusion_matrix() {
        let y_true = vec![0, 0, 1, 1];
        let y_pred = vec![0, 1, 1, 1];
        let matrix = confusion_matrix(&y_pred, &y_true, 2);
        assert_eq!(matrix, vec![vec![1, 1], vec![0, 2]]);
    }

    #[test]
    fn test_hand_computed_report() {
        // class 0: tp=1 fp=0 fn=1 -> p=1.0 r=0.5 f1=2/3
        // class 1: tp=2 fp=1 fn=0 -> p=2/3 r=1.0 f1=0.8
        let y_true = vec![0, 0, 1, 1];
        let y_pred = vec![0, 1, 1, 1];
        let report = ClassificationReport::compute(&y_pred, &y_true, &names(&["a", "b"]));

        let a = report.class(0).unwrap();
        assert!((a.precision - 1.0).abs() < 1e-6);
        assert!((a.recall - 0.5).abs() < 1e-6);
        assert!((a.f1 - 2.0 / 3.0).abs() < 1e-6);

        let b = report.class(1).unwrap();
        assert!((b.precision - 2.0 / 3.0).abs() < 1e-6);
        assert!((b.recall - 1.0).abs() < 1e-6);
        assert!((b.f1 - 0.8).abs() < 1e-6);

        assert_eq!(report.accuracy(), 0.75);
        assert_eq!(report.total_support(), 4);
    }

    #[test]
    fn test_absent_class_is_zeroed() {
        // Class 2 never predicted nor present: metrics are 0, support 0.
        let y_true = vec![0, 1];
        let y_pred = vec![0, 1];
        let report = ClassificationReport::compute(&y_pred, &y_true, &names(&["a", "b", "c"]));
        let c = report.class(2).unwrap();
        assert_eq!(c.precision, 0.0);
        assert_eq!(c.recall, 0.0);
        assert_eq!(c.support, 0);
    }

    #[test]
    fn test_display_contains_labels() {
        let y = vec![0, 1];
        let report = ClassificationReport::compute(&y, &y, &names(&["sports", "tech"]));
        let text = report.to_string();
        assert!(text.contains("sports"));
        assert!(text.contains("precision"));
        assert!(text.contains("confusion matrix"));
    }
}
