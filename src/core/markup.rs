//! Plain-text projection of editor markup

use std::sync::OnceLock;

use regex_lite::Regex;

/// Tags that end a line of text when projected
fn block_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|ul|ol|blockquote)\s*>")
            .expect("valid block break pattern")
    })
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"))
}

/// Project markup to the text a reader would see
pub fn plain_text(markup: &str) -> String {
    let with_breaks = block_break().replace_all(markup, "\n");
    let stripped = any_tag().replace_all(&with_breaks, "");
    decode_entities(&stripped)
}

/// Count whitespace-delimited words in plain text
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Count the words a reader would see in `markup`
pub fn markup_word_count(markup: &str) -> usize {
    word_count(&plain_text(markup))
}

/// Escape text for inclusion in markup
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap plain text as paragraphs, one per non-empty line
pub fn paragraphs(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<p>{}</p>", escape(line)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').and_then(|end| {
            let replacement = match &tail[1..end] {
                "nbsp" => ' ',
                "amp" => '&',
                "lt" => '<',
                "gt" => '>',
                "quot" => '"',
                "#39" | "apos" => '\'',
                _ => return None,
            };
            Some((replacement, end + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_collapses_whitespace() {
        assert_eq!(word_count("a  b   c"), 3);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  \n\t "), 0);
    }

    #[test]
    fn test_word_count_is_stable() {
        let markup = "<p>One <b>two</b></p><p>three</p>";
        assert_eq!(markup_word_count(markup), markup_word_count(markup));
        assert_eq!(markup_word_count(markup), 3);
    }

    #[test]
    fn test_blocks_separate_words() {
        assert_eq!(plain_text("<p>end</p><p>start</p>"), "end\nstart\n");
        assert_eq!(markup_word_count("<h1>Title</h1>Body<br>text"), 3);
    }

    #[test]
    fn test_inline_tags_do_not_split_words() {
        assert_eq!(plain_text("un<b>believ</b>able"), "unbelievable");
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(plain_text("a&nbsp;b &amp; c &lt;d&gt;"), "a b & c <d>");
        assert_eq!(plain_text("fish & chips"), "fish & chips");
        assert_eq!(plain_text("&unknown; x"), "&unknown; x");
    }

    #[test]
    fn test_escape_and_paragraphs() {
        assert_eq!(escape("<a & b>"), "&lt;a &amp; b&gt;");
        assert_eq!(paragraphs("first\n\n second "), "<p>first</p>\n<p>second</p>");
    }
}
