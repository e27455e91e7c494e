//! Target input: reads target specifications from files or an interactive prompt
//!
//! One target per line. Lines are trimmed; blank lines and `#` comments are
//! dropped so the sweep never sees them. Nothing is validated here.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Read targets from any line-oriented source
pub fn read_targets<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut targets = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", number + 1))?;
        let target = line.trim();

        // Skip empty lines and comments
        if target.is_empty() || target.starts_with('#') {
            continue;
        }

        targets.push(target.to_string());
    }

    Ok(targets)
}

/// Read targets from a plain text file
pub fn targets_from_file<P: AsRef<Path>>(file_path: P) -> Result<Vec<String>> {
    let path = file_path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Input file '{}' not found", path.display()))?;

    let targets = read_targets(BufReader::new(file))?;
    log::debug!("Read {} targets from {}", targets.len(), path.display());
    Ok(targets)
}

/// Split a comma-separated target list (`10.0.0.1, 10.0.1.0/24`)
pub fn targets_from_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|target| !target.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ask for the input file path on stdin
pub fn prompt_for_input_path() -> Result<String> {
    print!("Enter path to input file (e.g., ip_list.txt): ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read input path")?;

    let answer = answer.trim();
    if answer.is_empty() {
        anyhow::bail!("No input file given");
    }
    Ok(answer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_blank_and_comment_lines_are_dropped() {
        let input = "10.0.0.5\n\n   \n# lab subnet\n  192.168.1.0/30  \r\nnot-an-ip\n";
        let targets = read_targets(Cursor::new(input)).unwrap();
        assert_eq!(targets, vec!["10.0.0.5", "192.168.1.0/30", "not-an-ip"]);
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let targets = read_targets(Cursor::new("b\na\nb\n")).unwrap();
        assert_eq!(targets, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_targets_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ip_list.txt");
        std::fs::write(&path, "10.0.0.1\n\n10.0.1.0/24\n").unwrap();

        let targets = targets_from_file(&path).unwrap();
        assert_eq!(targets, vec!["10.0.0.1", "10.0.1.0/24"]);
    }

    #[test]
    fn test_missing_file_fails() {
        let err = targets_from_file("/nonexistent/ip_list.txt").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_targets_from_list() {
        assert_eq!(
            targets_from_list(" 10.0.0.1, ,10.0.1.0/24,"),
            vec!["10.0.0.1", "10.0.1.0/24"]
        );
        assert!(targets_from_list("").is_empty());
    }
}
