//! Greedy word wrapping with hanging indents.
//!
//! Widths are terminal cells (`unicode-width`), never bytes or chars.
//! Splitting inside a word only ever happens on grapheme cluster
//! boundaries.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width of `text` in terminal cells.
#[inline]
pub fn display_width(text: &str) -> usize {
    text.width()
}

/// Wrap `text` to `width` cells.
///
/// The first line starts with `first_prefix`; continuation lines start
/// with `indent` spaces. Both count towards `width`. Runs of whitespace
/// collapse to one space. A word wider than the available space is put on
/// a line of its own and allowed to overflow.
pub fn wrap_hanging(text: &str, width: usize, first_prefix: &str, indent: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = first_prefix.to_string();
    let mut current_width = display_width(first_prefix);
    let mut has_word = false;

    for word in text.split_whitespace() {
        let word_width = display_width(word);
        if has_word && current_width + 1 + word_width > width {
            lines.push(std::mem::replace(&mut current, " ".repeat(indent)));
            current_width = indent;
            has_word = false;
        }
        if has_word {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
        has_word = true;
    }

    if has_word || lines.is_empty() {
        lines.push(if has_word {
            current
        } else {
            current.trim_end().to_string()
        });
    }
    lines
}

/// Cut `text` into pieces no wider than `width` cells.
///
/// A single grapheme wider than `width` gets a piece of its own.
pub fn chunk_fixed(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if current_width + w > width && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push_str(grapheme);
        current_width += w;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_on_one_line() {
        assert_eq!(wrap_hanging("hello world", 20, "", 0), vec!["hello world"]);
    }

    #[test]
    fn greedy_breaks() {
        let lines = wrap_hanging("the quick brown fox jumps", 10, "", 0);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn quote_hanging_indent() {
        let lines = wrap_hanging("hello world", 10, " > ", 3);
        assert_eq!(lines, vec![" > hello", "   world"]);
    }

    #[test]
    fn bullet_hanging_indent() {
        let lines = wrap_hanging("one two three", 9, "• ", 2);
        assert_eq!(lines, vec!["• one two", "  three"]);
    }

    #[test]
    fn empty_text_keeps_prefix() {
        assert_eq!(wrap_hanging("", 10, "", 0), vec![""]);
        assert_eq!(wrap_hanging("   ", 10, " > ", 3), vec![" >"]);
    }

    #[test]
    fn long_word_overflows_on_its_own_line() {
        let lines = wrap_hanging("a abcdefghijkl b", 5, "", 0);
        assert_eq!(lines, vec!["a", "abcdefghijkl", "b"]);
    }

    #[test]
    fn wide_chars_count_double() {
        // Each ideograph is two cells wide.
        let lines = wrap_hanging("日本 語学", 5, "", 0);
        assert_eq!(lines, vec!["日本", "語学"]);
    }

    #[test]
    fn chunks_respect_width() {
        assert_eq!(chunk_fixed("abcdefg", 3), vec!["abc", "def", "g"]);
        assert_eq!(chunk_fixed("", 3), Vec::<String>::new());
    }

    #[test]
    fn chunks_keep_graphemes_whole() {
        // e + combining acute is one grapheme, one cell.
        let text = "e\u{301}".repeat(5);
        let chunks = chunk_fixed(&text, 2);
        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert!(chunk.starts_with('e'));
            assert!(display_width(chunk) <= 2);
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn wide_grapheme_wider_than_chunk() {
        assert_eq!(chunk_fixed("日日", 1), vec!["日", "日"]);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn wrapped_lines_fit_unless_single_word(
                words in proptest::collection::vec("[a-zé日]{1,8}", 0..30),
                width in 10usize..60,
            ) {
                let text = words.join(" ");
                for line in wrap_hanging(&text, width, "", 2) {
                    let fits = display_width(&line) <= width;
                    let single = line.split_whitespace().count() <= 1;
                    prop_assert!(fits || single, "{line:?} overflows {width}");
                }
            }

            #[test]
            fn wrapping_preserves_words(
                words in proptest::collection::vec("[a-z]{1,8}", 1..30),
                width in 5usize..40,
            ) {
                let text = words.join(" ");
                let rejoined: Vec<String> = wrap_hanging(&text, width, "", 0)
                    .iter()
                    .flat_map(|l| l.split_whitespace().map(str::to_string).collect::<Vec<_>>())
                    .collect();
                prop_assert_eq!(rejoined, words);
            }

            #[test]
            fn chunks_concatenate_back(text in "\\PC{0,80}", width in 1usize..20) {
                let chunks = chunk_fixed(&text, width);
                prop_assert_eq!(chunks.concat(), text);
            }
        }
    }
}
