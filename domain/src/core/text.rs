//! Word-level text helpers shared by the review rules and response scoring.

/// Count whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lowercased alphanumeric words, punctuation stripped
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Case-insensitive substring search
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Number of occurrences of `phrase` in `text`, case-insensitive
pub fn occurrences_ci(text: &str, phrase: &str) -> usize {
    let phrase = phrase.trim().to_lowercase();
    if phrase.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(phrase.as_str()).count()
}

/// Truncate to at most `max_chars` characters, appending "..." when cut
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  one two\nthree  "), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_words_strips_punctuation() {
        assert_eq!(
            words("Elegant, timeless: CRAFTSMANSHIP!"),
            vec!["elegant", "timeless", "craftsmanship"]
        );
    }

    #[test]
    fn test_occurrences_ci() {
        assert_eq!(occurrences_ci("Silk scarf. SILK tie. silk", "silk"), 3);
        assert_eq!(occurrences_ci("anything", "  "), 0);
    }

    #[test]
    fn test_excerpt_multibyte() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("hello world again", 8), "hello...");
        assert_eq!(excerpt("日本語テキスト", 5), "日本...");
    }
}
