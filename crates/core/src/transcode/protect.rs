use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Sequence name embedded in fenced code block placeholders.
pub const CODE_BLOCK: &str = "code-block";
/// Sequence name embedded in inline code span placeholders.
pub const INLINE_CODE: &str = "inline-code";

/// Residual text plus the code spans lifted out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Protected {
    /// Input with every code span replaced by a placeholder.
    pub residual: String,
    /// Fenced code blocks, fences included, in order of appearance.
    pub code_blocks: Vec<String>,
    /// Inline code spans, backticks included, in order of appearance.
    pub inline_codes: Vec<String>,
    /// Character delimiting every placeholder. Never present in the input.
    pub marker: char,
}

impl Protected {
    pub fn placeholder(&self, sequence: &str, index: usize) -> String {
        placeholder(self.marker, sequence, index)
    }

    /// Number of placeholders present in `residual`.
    pub fn span_count(&self) -> usize {
        self.code_blocks.len() + self.inline_codes.len()
    }
}

pub(crate) fn placeholder(marker: char, sequence: &str, index: usize) -> String {
    format!("{marker}{sequence}{index}{marker}")
}

/// Pick a private-use character that appears neither in `text` nor in `taken`.
///
/// Placeholders and internal sentinels are built from these characters, so
/// they can never collide with user content.
pub(crate) fn reserve_char(text: &str, taken: &[char]) -> char {
    ('\u{E000}'..='\u{F8FF}')
        .chain('\u{F0000}'..='\u{FFFFD}')
        .find(|c| !taken.contains(c) && !text.contains(*c))
        .unwrap_or('\u{E000}')
}

/// Replace fenced code blocks, then inline code spans, with placeholders.
///
/// Fences are lifted first so a backtick belonging to a fence is never read
/// as an inline code delimiter. Unbalanced backticks stay literal.
pub fn protect(text: &str) -> Protected {
    static RE_FENCE: OnceLock<Regex> = OnceLock::new();
    let re_fence = RE_FENCE.get_or_init(|| Regex::new(r"(?s)```.*?```").unwrap());

    static RE_INLINE: OnceLock<Regex> = OnceLock::new();
    let re_inline = RE_INLINE.get_or_init(|| Regex::new(r"`[^`\n]+`").unwrap());

    let marker = reserve_char(text, &[]);

    let mut code_blocks = Vec::new();
    let residual = re_fence
        .replace_all(text, |caps: &Captures| {
            code_blocks.push(caps[0].to_string());
            placeholder(marker, CODE_BLOCK, code_blocks.len() - 1)
        })
        .into_owned();

    let mut inline_codes = Vec::new();
    let residual = re_inline
        .replace_all(&residual, |caps: &Captures| {
            inline_codes.push(caps[0].to_string());
            placeholder(marker, INLINE_CODE, inline_codes.len() - 1)
        })
        .into_owned();

    Protected {
        residual,
        code_blocks,
        inline_codes,
        marker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protect_plain_text_untouched() {
        let protected = protect("nothing to see here");
        assert_eq!(protected.residual, "nothing to see here");
        assert!(protected.code_blocks.is_empty());
        assert!(protected.inline_codes.is_empty());
    }

    #[test]
    fn test_protect_fenced_block() {
        let text = "before\n```rust\nlet x = *y;\n```\nafter";
        let protected = protect(text);

        assert_eq!(protected.code_blocks, vec!["```rust\nlet x = *y;\n```"]);
        assert_eq!(
            protected.residual,
            format!("before\n{}\nafter", protected.placeholder(CODE_BLOCK, 0))
        );
    }

    #[test]
    fn test_protect_fence_is_non_greedy() {
        let protected = protect("```a``` middle ```b```");
        assert_eq!(protected.code_blocks, vec!["```a```", "```b```"]);
        assert!(protected.residual.contains(" middle "));
    }

    #[test]
    fn test_protect_inline_code() {
        let protected = protect("use `*ptr` and `__init__`");
        assert_eq!(protected.inline_codes, vec!["`*ptr`", "`__init__`"]);
        assert_eq!(
            protected.residual,
            format!(
                "use {} and {}",
                protected.placeholder(INLINE_CODE, 0),
                protected.placeholder(INLINE_CODE, 1)
            )
        );
    }

    #[test]
    fn test_protect_fence_backticks_not_inline() {
        let protected = protect("```\ncode\n``` and `tick`");
        assert_eq!(protected.code_blocks.len(), 1);
        assert_eq!(protected.inline_codes, vec!["`tick`"]);
    }

    #[test]
    fn test_protect_unbalanced_backticks_stay_literal() {
        let protected = protect("a ``` never closed");
        assert!(protected.code_blocks.is_empty());
        assert!(protected.inline_codes.is_empty());
        assert_eq!(protected.residual, "a ``` never closed");

        let protected = protect("a lone ` tick");
        assert!(protected.inline_codes.is_empty());
        assert_eq!(protected.residual, "a lone ` tick");
    }

    #[test]
    fn test_protect_inline_code_does_not_span_lines() {
        let protected = protect("`open\nclose`");
        assert!(protected.inline_codes.is_empty());
    }

    #[test]
    fn test_protect_span_count() {
        let protected = protect("```x``` `y` `z`");
        assert_eq!(protected.span_count(), 3);
    }

    #[test]
    fn test_reserve_char_skips_chars_in_text() {
        let text = "\u{E000}\u{E001}";
        let reserved = reserve_char(text, &[]);
        assert_eq!(reserved, '\u{E002}');
        assert_eq!(reserve_char(text, &[reserved]), '\u{E003}');
    }

    #[test]
    fn test_protect_marker_absent_from_input() {
        let text = "\u{E000} `code` \u{E000}";
        let protected = protect(text);
        assert_ne!(protected.marker, '\u{E000}');
        assert!(!text.contains(protected.marker));
    }
}
