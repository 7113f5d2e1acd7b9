// src/seeds.rs
// =============================================================================
// Reads the seed list: one URL per line, surrounding whitespace trimmed,
// blank lines skipped. Lines are NOT validated here; a bad URL only fails
// its own crawl later on.
//
// The file is read once, before any crawl starts.
// =============================================================================

use anyhow::{Context, Result};
use std::path::Path;

/// Loads seed URLs from `path`
///
/// Returns an error if the file is missing or not valid UTF-8.
pub async fn read_seed_list(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("error reading seed list {}", path.display()))?;

    Ok(parse_seed_list(&content))
}

fn parse_seed_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_blank_lines() {
        let seeds = parse_seed_list("https://a.com\n\n   \nhttps://b.org\n");
        assert_eq!(seeds, vec!["https://a.com", "https://b.org"]);
    }

    #[test]
    fn test_trims_whitespace_and_crlf() {
        let seeds = parse_seed_list("  https://a.com  \r\n\thttps://b.org\r\n");
        assert_eq!(seeds, vec!["https://a.com", "https://b.org"]);
    }

    #[test]
    fn test_keeps_malformed_lines_for_later() {
        let seeds = parse_seed_list("not a url\nhttps://a.com");
        assert_eq!(seeds, vec!["not a url", "https://a.com"]);
    }

    #[tokio::test]
    async fn test_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        std::fs::write(&path, "https://example.com\n\nhttps://rust-lang.org\n").unwrap();

        let seeds = read_seed_list(&path).await.unwrap();
        assert_eq!(seeds, vec!["https://example.com", "https://rust-lang.org"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = read_seed_list(&dir.path().join("urls.txt"))
            .await
            .unwrap_err();
        assert!(error.to_string().contains("urls.txt"));
    }
}
