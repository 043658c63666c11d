//! Raw dataset download.

use log::debug;

use super::DatasetError;

/// Download a newline-delimited text resource and return its non-empty
/// lines, trimmed of surrounding whitespace.
///
/// A network failure or non-success HTTP status is fatal; there is no
/// retry. The caller decides whether to fetch at all (the output root's
/// existence short-circuits the whole pipeline).
pub fn fetch_lines(url: &str) -> Result<Vec<String>, DatasetError> {
    let body = reqwest::blocking::get(url)?.error_for_status()?.text()?;
    let lines = split_lines(&body);
    debug!("fetched {} lines from {}", lines.len(), url);
    Ok(lines)
}

/// Split a raw body into trimmed, non-empty lines.
pub fn split_lines(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_drops_blanks() {
        let body = " 1.0 2.0 \n\n3.0 4.0\n   \n";
        let lines = split_lines(body);
        assert_eq!(lines, vec!["1.0 2.0".to_string(), "3.0 4.0".to_string()]);
    }

    #[test]
    fn test_split_lines_empty_body() {
        assert!(split_lines("").is_empty());
        assert!(split_lines("\n\n").is_empty());
    }
}
