//! Near-duplicate guard

use super::normalize::normalize;
use rusqlite::Connection;

/// How many of the most recent notes a candidate is compared against
pub const DEDUP_WINDOW: usize = 400;

/// True if `content` matches any of `recent` after normalization.
pub fn is_similar<S: AsRef<str>>(content: &str, recent: &[S]) -> bool {
    let candidate = normalize(content);
    recent
        .iter()
        .any(|existing| normalize(existing.as_ref()) == candidate)
}

/// Load the dedup window (newest first) from an open connection.
pub(crate) fn recent_contents(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT content FROM memories ORDER BY id DESC LIMIT ?1")?;
    let rows = stmt
        .query_map([DEDUP_WINDOW as i64], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Check a candidate against the window stored behind `conn`.
pub(crate) fn exists_similar(conn: &Connection, content: &str) -> rusqlite::Result<bool> {
    let recent = recent_contents(conn)?;
    Ok(is_similar(content, &recent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_after_normalization() {
        let recent = vec!["Prefers   dark mode", "Works in Rust"];
        assert!(is_similar("prefers dark MODE ", &recent));
        assert!(!is_similar("prefers light mode", &recent));
    }

    #[test]
    fn test_exact_not_fuzzy() {
        let recent = vec!["Likes cats"];
        assert!(!is_similar("Likes cats.", &recent));
    }

    #[test]
    fn test_empty_window() {
        let recent: Vec<String> = Vec::new();
        assert!(!is_similar("anything", &recent));
    }
}
