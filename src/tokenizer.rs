use once_cell::sync::Lazy;
use regex::Regex;

// `\B@` keeps the `@` of an email address (`me@example.com`) out of the match.
static RE_MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\B@([A-Za-z0-9_]+)").unwrap()
});

static RE_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<a[^>]*>(.*)</a>").unwrap()
});

static RE_WORD_SPLIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-z0-9_']+").unwrap()
});

pub const MIN_WORD_LEN: usize = 3;

/// Common words and link noise excluded from the word cloud.
pub const STOPWORDS: &[&str] = &[
    "the", "and", "you", "that",
    "was", "for", "are", "with", "his", "they",
    "this", "have", "from", "one", "had", "word",
    "but", "not", "what", "all", "were", "when", "your", "can", "said",
    "there", "use", "each", "which", "she", "how", "their",
    "will", "other", "about", "out", "many", "then", "them", "these",
    "some", "her", "would", "make", "like", "him", "into", "time", "has", "look",
    "two", "more", "write", "see", "number", "way", "could", "people",
    "than", "first", "water", "been", "call", "who", "oil", "its", "now",
    "find", "long", "down", "day", "did", "get", "come", "made", "may", "part",
    "http", "com", "net", "org", "www", "https",
];

static STOPWORD_SET: Lazy<ahash::AHashSet<&'static str>> = Lazy::new(|| {
    STOPWORDS.iter().copied().collect()
});

pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word)
}

/// Lowercased handles of every `@mention` in `text`, in order, with repeats.
pub fn extract_mentions(text: &str) -> Vec<String> {
    RE_MENTION
        .captures_iter(text)
        .map(|c| c[1].to_lowercase())
        .collect()
}

/// Client label with any surrounding `<a href=...>` wrapper removed.
pub fn source_label(source: &str) -> String {
    RE_ANCHOR.replace_all(source, "$1").into_owned()
}

pub fn extract_words(text: &str) -> Vec<String> {
    extract_words_with_min(text, MIN_WORD_LEN)
}

pub fn extract_words_with_min(text: &str, min_len: usize) -> Vec<String> {
    let normalized = text.replace('\u{2019}', "'").to_lowercase();
    RE_WORD_SPLIT
        .split(&normalized)
        .filter(|w| w.chars().count() >= min_len && !is_stopword(w))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_inside_email_is_ignored() {
        assert_eq!(extract_mentions("mail me@example.com or ping @Bob_1"), vec!["bob_1"]);
    }

    #[test]
    fn curly_apostrophe_joins_contraction() {
        assert_eq!(extract_words("Don\u{2019}t stop"), vec!["don't", "stop"]);
    }

    #[test]
    fn non_ascii_letters_split_words() {
        // lowercase keeps `é`, which is outside the token alphabet
        assert_eq!(extract_words("café latte"), vec!["caf", "latte"]);
    }
}
