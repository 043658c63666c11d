//! Classification metrics accumulated over (actual, predicted) pairs.

use std::fmt;

/// Confusion-matrix accumulator with accuracy and per-class
/// precision/recall/F1.
#[derive(Clone, Debug)]
pub struct Evaluation {
    num_classes: usize,
    /// confusion[actual][predicted]
    confusion: Vec<Vec<usize>>,
}

impl Evaluation {
    pub fn new(num_classes: usize) -> Self {
        assert!(num_classes > 0, "class count must be positive");
        Evaluation {
            num_classes,
            confusion: vec![vec![0; num_classes]; num_classes],
        }
    }

    /// Record one classified example.
    pub fn record(&mut self, actual: usize, predicted: usize) {
        assert!(actual < self.num_classes, "actual class out of range");
        assert!(predicted < self.num_classes, "predicted class out of range");
        self.confusion[actual][predicted] += 1;
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn count(&self, actual: usize, predicted: usize) -> usize {
        self.confusion[actual][predicted]
    }

    pub fn total(&self) -> usize {
        self.confusion.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.num_classes).map(|c| self.confusion[c][c]).sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.correct() as f64 / total as f64
    }

    /// Fraction of predictions for `class` that were correct. Zero when the
    /// class was never predicted.
    pub fn precision(&self, class: usize) -> f64 {
        let predicted: usize = (0..self.num_classes).map(|a| self.confusion[a][class]).sum();
        if predicted == 0 {
            return 0.0;
        }
        self.confusion[class][class] as f64 / predicted as f64
    }

    /// Fraction of actual `class` examples that were found. Zero when the
    /// class never occurred.
    pub fn recall(&self, class: usize) -> f64 {
        let actual: usize = self.confusion[class].iter().sum();
        if actual == 0 {
            return 0.0;
        }
        self.confusion[class][class] as f64 / actual as f64
    }

    /// Harmonic mean of precision and recall for `class`.
    pub fn f1(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }

    /// Unweighted mean F1 over all classes.
    pub fn macro_f1(&self) -> f64 {
        (0..self.num_classes).map(|c| self.f1(c)).sum::<f64>() / self.num_classes as f64
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Evaluation on {} examples: accuracy {:.4}, macro-F1 {:.4}",
            self.total(),
            self.accuracy(),
            self.macro_f1()
        )?;
        writeln!(f, "class  precision  recall     f1")?;
        for class in 0..self.num_classes {
            writeln!(
                f,
                "{:>5}  {:>9.4}  {:>6.4}  {:>6.4}",
                class,
                self.precision(class),
                self.recall(class),
                self.f1(class)
            )?;
        }
        writeln!(f, "Confusion matrix (rows: actual, columns: predicted):")?;
        for row in &self.confusion {
            let cells: Vec<String> = row.iter().map(|c| format!("{:>5}", c)).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> Evaluation {
        let mut eval = Evaluation::new(3);
        // class 0: 2 correct, 1 confused as class 1
        eval.record(0, 0);
        eval.record(0, 0);
        eval.record(0, 1);
        // class 1: 1 correct
        eval.record(1, 1);
        // class 2: 1 correct, 1 confused as class 0
        eval.record(2, 2);
        eval.record(2, 0);
        eval
    }

    #[test]
    fn test_totals_and_accuracy() {
        let eval = filled();
        assert_eq!(eval.total(), 6);
        assert_eq!(eval.correct(), 4);
        assert!((eval.accuracy() - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_precision_and_recall() {
        let eval = filled();
        // class 0 was predicted 3 times, 2 correctly.
        assert!((eval.precision(0) - 2.0 / 3.0).abs() < 1e-12);
        // class 0 occurred 3 times, 2 found.
        assert!((eval.recall(0) - 2.0 / 3.0).abs() < 1e-12);
        // class 1: predicted twice, once correctly; occurred once, found.
        assert!((eval.precision(1) - 0.5).abs() < 1e-12);
        assert!((eval.recall(1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_f1() {
        let eval = filled();
        let p = eval.precision(1);
        let r = eval.recall(1);
        assert!((eval.f1(1) - 2.0 * p * r / (p + r)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_evaluation() {
        let eval = Evaluation::new(4);
        assert_eq!(eval.total(), 0);
        assert_eq!(eval.accuracy(), 0.0);
        assert_eq!(eval.precision(2), 0.0);
        assert_eq!(eval.recall(2), 0.0);
        assert_eq!(eval.f1(2), 0.0);
    }

    #[test]
    fn test_display_renders() {
        let rendered = format!("{}", filled());
        assert!(rendered.contains("accuracy"));
        assert!(rendered.contains("Confusion matrix"));
    }
}
