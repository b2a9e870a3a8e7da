//! Text canonicalization for duplicate detection

/// Lowercase, collapse whitespace runs to one space, and trim.
///
/// Only used to compare notes; the stored content keeps its original form.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_and_lowercases() {
        assert_eq!(normalize("  Likes   STRONG\tcoffee \n"), "likes strong coffee");
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
    }

    #[test]
    fn test_unicode_whitespace() {
        assert_eq!(normalize("Name:\u{00A0}\u{2003}Alice."), "name: alice.");
    }
}
