//! Per-line reshaping: transposition and block labeling.

/// One input line together with its zero-based position in the source file.
#[derive(Clone, Debug)]
pub struct RawRecord {
    pub ordinal: usize,
    pub line: String,
}

impl RawRecord {
    pub fn new(ordinal: usize, line: impl Into<String>) -> Self {
        RawRecord {
            ordinal,
            line: line.into(),
        }
    }

    /// Transpose the line and derive its label from the ordinal.
    pub fn into_labeled(self, block_size: usize) -> LabeledSequence {
        LabeledSequence {
            content: transpose_line(&self.line),
            label: label_for_ordinal(self.ordinal, block_size),
        }
    }
}

/// A transposed sequence body paired with its class label. Produced once
/// per source line and consumed exactly once by the materializer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabeledSequence {
    /// Tokens of the source line, one per row, with a trailing newline.
    pub content: String,
    /// `ordinal / block_size` of the originating line.
    pub label: usize,
}

/// Rewrite a row of whitespace-separated tokens as a column, one token per
/// line. Any run of spaces or tabs is a single delimiter; leading and
/// trailing whitespace is ignored. Tokens are not validated as numbers —
/// malformed input passes through untouched.
pub fn transpose_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 1);
    for token in line.split_whitespace() {
        out.push_str(token);
        out.push('\n');
    }
    out
}

/// Label for the line at `ordinal`: integer division by the block size.
/// Monotonic non-decreasing in the ordinal. Lines past the last full block
/// simply get the next label; no divisibility check is made.
pub fn label_for_ordinal(ordinal: usize, block_size: usize) -> usize {
    ordinal / block_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose_simple_line() {
        assert_eq!(transpose_line("5.2 5.3 5.0"), "5.2\n5.3\n5.0\n");
    }

    #[test]
    fn test_transpose_collapses_space_runs() {
        assert_eq!(transpose_line("  1.5   2.5\t3.5  "), "1.5\n2.5\n3.5\n");
    }

    #[test]
    fn test_transpose_empty_line() {
        assert_eq!(transpose_line(""), "");
        assert_eq!(transpose_line("   "), "");
    }

    #[test]
    fn test_transpose_passes_malformed_tokens_through() {
        assert_eq!(transpose_line("1.0 abc 2.0"), "1.0\nabc\n2.0\n");
    }

    #[test]
    fn test_transpose_round_trip() {
        let line = "28.7812 34.4632 31.3381 31.2834 28.9207";
        let transposed = transpose_line(line);
        let rejoined: Vec<&str> = transposed.lines().collect();
        assert_eq!(rejoined.join(" "), line);
    }

    #[test]
    fn test_label_blocks_of_100() {
        assert_eq!(label_for_ordinal(0, 100), 0);
        assert_eq!(label_for_ordinal(99, 100), 0);
        assert_eq!(label_for_ordinal(100, 100), 1);
        assert_eq!(label_for_ordinal(250, 100), 2);
        assert_eq!(label_for_ordinal(599, 100), 5);
    }

    #[test]
    fn test_label_is_monotonic() {
        let labels: Vec<usize> = (0..600).map(|i| label_for_ordinal(i, 100)).collect();
        assert!(labels.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_label_past_last_full_block() {
        // 605 lines with block size 100: the trailing 5 get label 6.
        assert_eq!(label_for_ordinal(604, 100), 6);
    }

    #[test]
    fn test_into_labeled() {
        let record = RawRecord::new(250, "1.0 2.0");
        let labeled = record.into_labeled(100);
        assert_eq!(labeled.content, "1.0\n2.0\n");
        assert_eq!(labeled.label, 2);
    }
}
