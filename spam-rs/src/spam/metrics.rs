//! Evaluation metrics

use serde::Serialize;
use std::fmt;

use super::types::Label;

/// Precision/recall/F1 for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Binary confusion counts, spam as the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

/// Accuracy plus per-class and averaged metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub ham: ClassMetrics,
    pub spam: ClassMetrics,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub confusion: ConfusionMatrix,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn class_metrics(y_true: &[Label], y_pred: &[Label], label: Label) -> ClassMetrics {
    let pairs = || y_true.iter().zip(y_pred);
    let tp = pairs().filter(|(t, p)| **t == label && **p == label).count();
    let predicted = y_pred.iter().filter(|p| **p == label).count();
    let support = y_true.iter().filter(|t| **t == label).count();

    let precision = ratio(tp, predicted);
    let recall = ratio(tp, support);
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
}

impl ClassificationReport {
    /// Compare true and predicted labels
    ///
    /// Panics in debug builds when the slices differ in length; release
    /// builds score the overlapping prefix.
    pub fn compute(y_true: &[Label], y_pred: &[Label]) -> Self {
        debug_assert_eq!(
            y_true.len(),
            y_pred.len(),
            "y_true and y_pred must have the same length"
        );
        let n = y_true.len().min(y_pred.len());
        let (y_true, y_pred) = (&y_true[..n], &y_pred[..n]);

        let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
        let ham = class_metrics(y_true, y_pred, Label::Ham);
        let spam = class_metrics(y_true, y_pred, Label::Spam);

        let macro_avg = ClassMetrics {
            precision: (ham.precision + spam.precision) / 2.0,
            recall: (ham.recall + spam.recall) / 2.0,
            f1: (ham.f1 + spam.f1) / 2.0,
            support: n,
        };

        let weight = |m: &ClassMetrics| ratio(m.support, n);
        let weighted_avg = ClassMetrics {
            precision: ham.precision * weight(&ham) + spam.precision * weight(&spam),
            recall: ham.recall * weight(&ham) + spam.recall * weight(&spam),
            f1: ham.f1 * weight(&ham) + spam.f1 * weight(&spam),
            support: n,
        };

        let mut confusion = ConfusionMatrix::default();
        for (t, p) in y_true.iter().zip(y_pred) {
            match (t, p) {
                (Label::Spam, Label::Spam) => confusion.true_positives += 1,
                (Label::Ham, Label::Spam) => confusion.false_positives += 1,
                (Label::Ham, Label::Ham) => confusion.true_negatives += 1,
                (Label::Spam, Label::Ham) => confusion.false_negatives += 1,
            }
        }

        Self {
            accuracy: ratio(correct, n),
            ham,
            spam,
            macro_avg,
            weighted_avg,
            confusion,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14} {:>10} {:>10} {:>10} {:>10}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for (name, m) in [("ham", &self.ham), ("spam", &self.spam)] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}
