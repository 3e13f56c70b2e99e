use ammonia;

/// Clean question text using the ammonia library.
///
/// Whitelist-based: basic formatting tags (<b>, <i>, <br>, <p>, lists) survive,
/// <script>, <iframe> and event-handler attributes are stripped. The result is
/// stored and later rendered without further escaping.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input.trim())
}

/// Plain-text preview of at most `max_words` words, with " ..." when cut.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return words.join(" ");
    }
    format!("{} ...", words[..max_words].join(" "))
}

/// Drops all markup, leaving the text content.
pub fn strip_tags(input: &str) -> String {
    ammonia::Builder::empty().clean(input).to_string()
}
