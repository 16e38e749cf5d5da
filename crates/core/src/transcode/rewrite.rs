use std::sync::OnceLock;

use regex::{Captures, NoExpand, Regex};

use super::protect::reserve_char;
use super::rules::{DialectRules, LinkStyle, OrderedStyle};

/// One markup rewrite over the residual text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    HorizontalRule,
    BoldItalic,
    Bold,
    Italic,
    Strikethrough,
    Heading,
    Blockquote,
    Link,
    UnorderedItem,
    OrderedItem,
    Table,
    LeftoverMarkers,
}

/// Passes in the order they run. Rule lines are claimed before any emphasis
/// pass can read their stars, and bold must precede italic.
pub const PASSES: [Pass; 12] = [
    Pass::HorizontalRule,
    Pass::BoldItalic,
    Pass::Bold,
    Pass::Italic,
    Pass::Strikethrough,
    Pass::Heading,
    Pass::Blockquote,
    Pass::Link,
    Pass::UnorderedItem,
    Pass::OrderedItem,
    Pass::Table,
    Pass::LeftoverMarkers,
];

/// Private-use characters standing in for emphasis delimiters until every
/// pass has run, so later passes never mistake converted emphasis for source
/// markup.
#[derive(Debug, Clone, Copy)]
struct Sentinels {
    strong_open: char,
    strong_close: char,
    em_open: char,
    em_close: char,
}

impl Sentinels {
    fn reserve(text: &str) -> Self {
        let strong_open = reserve_char(text, &[]);
        let strong_close = reserve_char(text, &[strong_open]);
        let em_open = reserve_char(text, &[strong_open, strong_close]);
        let em_close = reserve_char(text, &[strong_open, strong_close, em_open]);

        Sentinels {
            strong_open,
            strong_close,
            em_open,
            em_close,
        }
    }

    fn strong(&self, inner: &str) -> String {
        format!("{}{}{}", self.strong_open, inner, self.strong_close)
    }

    fn strong_em(&self, inner: &str) -> String {
        format!(
            "{}{}{}{}{}",
            self.strong_open, self.em_open, inner, self.em_close, self.strong_close
        )
    }

    fn is_strong(&self, c: char) -> bool {
        c == self.strong_open || c == self.strong_close
    }

    /// Swap every sentinel for the dialect's notation.
    fn resolve(&self, text: &str, rules: &DialectRules) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                c if c == self.strong_open => out.push_str(rules.bold.open),
                c if c == self.strong_close => out.push_str(rules.bold.close),
                c if c == self.em_open => out.push_str(rules.italic.open),
                c if c == self.em_close => out.push_str(rules.italic.close),
                c => out.push(c),
            }
        }
        out
    }
}

/// Link targets and bare URLs held out of the residual while the passes run,
/// so no rewrite reaches inside an address.
#[derive(Debug)]
struct Addresses {
    marker: char,
    lifted: Vec<String>,
}

impl Addresses {
    fn lift(text: &str, marker: char) -> (String, Self) {
        static RE_TARGET: OnceLock<Regex> = OnceLock::new();
        let re_target = RE_TARGET.get_or_init(|| Regex::new(r"\]\(([^)\n]+)\)").unwrap());
        static RE_BARE: OnceLock<Regex> = OnceLock::new();
        let re_bare = RE_BARE.get_or_init(|| {
            Regex::new(r"\b[A-Za-z][A-Za-z0-9+.\-]*://[^\s()\[\]<>*~]+").unwrap()
        });

        let mut addresses = Addresses {
            marker,
            lifted: Vec::new(),
        };
        let text = re_target.replace_all(text, |caps: &Captures| {
            format!("]({})", addresses.push(&caps[1]))
        });
        let text = re_bare
            .replace_all(&text, |caps: &Captures| addresses.push(&caps[0]))
            .into_owned();

        (text, addresses)
    }

    fn push(&mut self, address: &str) -> String {
        let placeholder = format!("{m}{}{m}", self.lifted.len(), m = self.marker);
        self.lifted.push(address.to_string());
        placeholder
    }

    /// Markers come in open/close pairs, so a left-to-right scan pairs them.
    fn restore(&self, text: &str) -> String {
        if self.lifted.is_empty() {
            return text.to_string();
        }

        let width = self.marker.len_utf8();
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find(self.marker) {
            out.push_str(&rest[..start]);
            let after = &rest[start + width..];

            let address = after.find(self.marker).and_then(|end| {
                let index = after[..end].parse::<usize>().ok()?;
                self.lifted.get(index).map(|address| (end, address))
            });

            match address {
                Some((end, address)) => {
                    out.push_str(address);
                    rest = &after[end + width..];
                }
                None => {
                    out.push(self.marker);
                    rest = after;
                }
            }
        }
        out.push_str(rest);

        out
    }
}

/// Apply every pass in [`PASSES`] to code-free residual text.
pub fn rewrite(residual: &str, rules: &DialectRules) -> String {
    let sentinels = Sentinels::reserve(residual);
    let marker = reserve_char(
        residual,
        &[
            sentinels.strong_open,
            sentinels.strong_close,
            sentinels.em_open,
            sentinels.em_close,
        ],
    );
    let (text, addresses) = Addresses::lift(residual, marker);

    let text = PASSES.iter().fold(text, |text, pass| {
        pass.apply(&text, rules, &sentinels)
    });

    addresses.restore(&sentinels.resolve(&text, rules))
}

impl Pass {
    fn apply(self, text: &str, rules: &DialectRules, s: &Sentinels) -> String {
        match self {
            Pass::HorizontalRule => {
                static RE: OnceLock<Regex> = OnceLock::new();
                let re = RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*[-*]{3,}[ \t]*$").unwrap());
                re.replace_all(text, NoExpand(rules.horizontal_rule))
                    .into_owned()
            }
            Pass::BoldItalic => {
                static RE_STARS: OnceLock<Regex> = OnceLock::new();
                let re_stars =
                    RE_STARS.get_or_init(|| Regex::new(r"\*\*\*([^*\n]+)\*\*\*").unwrap());
                static RE_UNDERSCORES: OnceLock<Regex> = OnceLock::new();
                let re_underscores =
                    RE_UNDERSCORES.get_or_init(|| Regex::new(r"___([^_\n]+)___").unwrap());

                let text = re_stars.replace_all(text, |caps: &Captures| s.strong_em(&caps[1]));
                re_underscores
                    .replace_all(&text, |caps: &Captures| s.strong_em(&caps[1]))
                    .into_owned()
            }
            Pass::Bold => {
                static RE_STARS: OnceLock<Regex> = OnceLock::new();
                let re_stars = RE_STARS.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
                static RE_UNDERSCORES: OnceLock<Regex> = OnceLock::new();
                let re_underscores =
                    RE_UNDERSCORES.get_or_init(|| Regex::new(r"__(.+?)__").unwrap());

                let text = re_stars.replace_all(text, |caps: &Captures| s.strong(&caps[1]));
                re_underscores
                    .replace_all(&text, |caps: &Captures| s.strong(&caps[1]))
                    .into_owned()
            }
            Pass::Italic => {
                let text = emphasize(text, '*', s.em_open, s.em_close);
                emphasize(&text, '_', s.em_open, s.em_close)
            }
            Pass::Strikethrough => {
                let Some(wrap) = rules.strikethrough else {
                    return text.to_string();
                };
                static RE: OnceLock<Regex> = OnceLock::new();
                let re = RE.get_or_init(|| Regex::new(r"~~(.+?)~~").unwrap());
                re.replace_all(text, |caps: &Captures| wrap.apply(&caps[1]))
                    .into_owned()
            }
            Pass::Heading => {
                static RE: OnceLock<Regex> = OnceLock::new();
                let re = RE.get_or_init(|| Regex::new(r"(?m)^#{1,6}[ \t]+(.+?)[ \t]*$").unwrap());
                re.replace_all(text, |caps: &Captures| {
                    // The whole title is bold, so inner bold runs flatten into it
                    let title: String = caps[1].chars().filter(|&c| !s.is_strong(c)).collect();
                    s.strong(&title)
                })
                .into_owned()
            }
            Pass::Blockquote => {
                static RE: OnceLock<Regex> = OnceLock::new();
                let re = RE.get_or_init(|| Regex::new(r"(?m)^>[ \t]*(.*)$").unwrap());
                re.replace_all(text, |caps: &Captures| {
                    format!("{}{}", rules.quote_prefix, &caps[1])
                        .trim_end()
                        .to_string()
                })
                .into_owned()
            }
            Pass::Link => match rules.link {
                LinkStyle::Passthrough => text.to_string(),
                LinkStyle::Inline => {
                    static RE: OnceLock<Regex> = OnceLock::new();
                    let re = RE
                        .get_or_init(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\n]+)\)").unwrap());
                    re.replace_all(text, "$1 ($2)").into_owned()
                }
            },
            Pass::UnorderedItem => {
                static RE: OnceLock<Regex> = OnceLock::new();
                let re = RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*[-*][ \t]+").unwrap());
                re.replace_all(text, NoExpand(rules.bullet)).into_owned()
            }
            Pass::OrderedItem => {
                static RE: OnceLock<Regex> = OnceLock::new();
                let re = RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*(\d+)\.[ \t]+").unwrap());
                let replacement = match rules.ordered {
                    OrderedStyle::Dot => "${1}. ",
                    OrderedStyle::Paren => "${1}) ",
                };
                re.replace_all(text, replacement).into_owned()
            }
            Pass::Table => collapse_table_rows(text, rules.table_separator),
            Pass::LeftoverMarkers => text.replace("**", "").replace("__", ""),
        }
    }
}

/// Reduce every line holding a `|cell|` run to its trimmed, non-empty cells.
fn collapse_table_rows(text: &str, separator: &str) -> String {
    static RE_CELL: OnceLock<Regex> = OnceLock::new();
    let re_cell = RE_CELL.get_or_init(|| Regex::new(r"\|[^|\n]+\|").unwrap());

    text.split('\n')
        .map(|line| {
            if re_cell.is_match(line) {
                line.split('|')
                    .map(str::trim)
                    .filter(|cell| !cell.is_empty())
                    .collect::<Vec<_>>()
                    .join(separator)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap single-delimiter spans in `open`/`close`, line by line.
fn emphasize(text: &str, delim: char, open: char, close: char) -> String {
    text.split('\n')
        .map(|line| emphasize_line(line, delim, open, close))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A delimiter counts only when it is lone (no copy of itself on either
/// side). It opens before non-whitespace and closes after non-whitespace.
/// Underscores additionally never open or close inside a word.
fn emphasize_line(line: &str, delim: char, open: char, close: char) -> String {
    let chars: Vec<char> = line.chars().collect();
    let intraword_guard = delim == '_';

    let is_lone = |i: usize| {
        chars[i] == delim
            && (i == 0 || chars[i - 1] != delim)
            && chars.get(i + 1) != Some(&delim)
    };
    let can_open = |i: usize| {
        chars.get(i + 1).is_some_and(|c| !c.is_whitespace())
            && !(intraword_guard && i > 0 && chars[i - 1].is_alphanumeric())
    };
    let can_close = |i: usize| {
        i > 0
            && !chars[i - 1].is_whitespace()
            && !(intraword_guard && chars.get(i + 1).is_some_and(|c| c.is_alphanumeric()))
    };

    let mut spans = Vec::new();
    let mut opener: Option<usize> = None;
    for i in 0..chars.len() {
        if !is_lone(i) {
            continue;
        }
        match opener {
            Some(start) if i > start + 1 && can_close(i) => {
                spans.push((start, i));
                opener = None;
            }
            Some(_) => {}
            None if can_open(i) => opener = Some(i),
            None => {}
        }
    }

    if spans.is_empty() {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len());
    let mut marks = spans
        .iter()
        .flat_map(|&(start, end)| [(start, open), (end, close)])
        .peekable();
    for (i, c) in chars.iter().enumerate() {
        match marks.next_if(|&(at, _)| at == i) {
            Some((_, sentinel)) => out.push(sentinel),
            None => out.push(*c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcode::rules::{PLAIN_TEXT, TELEGRAM, WHATSAPP};

    // ============================================================================
    // emphasis tests
    // ============================================================================

    #[test]
    fn test_bold_then_italic_whatsapp() {
        assert_eq!(
            rewrite("**bold** and *italic*", &WHATSAPP),
            "*bold* and _italic_"
        );
    }

    #[test]
    fn test_bold_italic() {
        assert_eq!(rewrite("***x***", &WHATSAPP), "*_x_*");
        assert_eq!(rewrite("***x***", &TELEGRAM), "**_x_**");
        assert_eq!(rewrite("***x***", &PLAIN_TEXT), "x");
        assert_eq!(rewrite("a ___b c___ d", &WHATSAPP), "a *_b c_* d");
    }

    #[test]
    fn test_double_underscore_bold() {
        assert_eq!(rewrite("__strong__", &WHATSAPP), "*strong*");
        assert_eq!(rewrite("__strong__", &TELEGRAM), "**strong**");
        assert_eq!(rewrite("__strong__", &PLAIN_TEXT), "strong");
    }

    #[test]
    fn test_underscore_italic() {
        assert_eq!(rewrite("_soft_ words", &WHATSAPP), "_soft_ words");
        assert_eq!(rewrite("_soft_ words", &PLAIN_TEXT), "soft words");
    }

    #[test]
    fn test_italic_inside_bold() {
        assert_eq!(
            rewrite("**very *much* so**", &WHATSAPP),
            "*very _much_ so*"
        );
    }

    #[test]
    fn test_snake_case_untouched() {
        assert_eq!(
            rewrite("call snake_case_name now", &PLAIN_TEXT),
            "call snake_case_name now"
        );
    }

    #[test]
    fn test_spaced_asterisks_are_not_italic() {
        assert_eq!(rewrite("2 * 3 * 4", &PLAIN_TEXT), "2 * 3 * 4");
    }

    #[test]
    fn test_italic_does_not_cross_lines() {
        assert_eq!(rewrite("*open\nclose*", &PLAIN_TEXT), "*open\nclose*");
    }

    #[test]
    fn test_unpaired_asterisk_stays() {
        assert_eq!(rewrite("a *b c", &WHATSAPP), "a *b c");
    }

    #[test]
    fn test_leftover_double_markers_removed() {
        assert_eq!(rewrite("dangling ** here", &WHATSAPP), "dangling  here");
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(rewrite("~~gone~~", &WHATSAPP), "~gone~");
        assert_eq!(rewrite("~~gone~~", &PLAIN_TEXT), "gone");
        assert_eq!(rewrite("~~gone~~", &TELEGRAM), "~~gone~~");
    }

    // ============================================================================
    // block tests
    // ============================================================================

    #[test]
    fn test_heading() {
        assert_eq!(rewrite("# Title", &WHATSAPP), "*Title*");
        assert_eq!(rewrite("### Title  ", &TELEGRAM), "**Title**");
        assert_eq!(rewrite("## Title", &PLAIN_TEXT), "Title");
    }

    #[test]
    fn test_heading_already_bold() {
        assert_eq!(rewrite("# **Title**", &WHATSAPP), "*Title*");
    }

    #[test]
    fn test_heading_with_several_bold_runs() {
        assert_eq!(rewrite("# **A** and **B**", &WHATSAPP), "*A and B*");
        assert_eq!(rewrite("# **A** and **B**", &TELEGRAM), "**A and B**");
        assert_eq!(rewrite("# **A** and **B**", &PLAIN_TEXT), "A and B");
    }

    #[test]
    fn test_heading_keeps_inner_italic() {
        assert_eq!(rewrite("## a *b* c", &WHATSAPP), "*a _b_ c*");
    }

    #[test]
    fn test_hash_without_space_is_not_heading() {
        assert_eq!(rewrite("#hashtag", &WHATSAPP), "#hashtag");
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(rewrite("> wise words", &WHATSAPP), "» wise words");
        assert_eq!(rewrite(">wise words", &TELEGRAM), "> wise words");
        assert_eq!(rewrite("> wise words", &PLAIN_TEXT), "wise words");
    }

    #[test]
    fn test_empty_quote_line() {
        assert_eq!(rewrite("> a\n>\n> b", &WHATSAPP), "» a\n»\n» b");
        assert_eq!(rewrite("> a\n>\n> b", &PLAIN_TEXT), "a\n\nb");
        assert_eq!(rewrite("> a\n>  \n> b", &TELEGRAM), "> a\n>\n> b");
    }

    #[test]
    fn test_link_target_is_not_rewritten() {
        assert_eq!(
            rewrite("[a_b](http://x.com/_y_)", &PLAIN_TEXT),
            "a_b (http://x.com/_y_)"
        );
        assert_eq!(
            rewrite("[*a*](http://x.com/*y*)", &WHATSAPP),
            "_a_ (http://x.com/*y*)"
        );
        assert_eq!(
            rewrite("[t](http://x.com/__init__)", &TELEGRAM),
            "[t](http://x.com/__init__)"
        );
    }

    #[test]
    fn test_bare_url_is_not_rewritten() {
        assert_eq!(
            rewrite("see https://x.com/_a_/__init__ now", &PLAIN_TEXT),
            "see https://x.com/_a_/__init__ now"
        );
        assert_eq!(
            rewrite("**docs: https://x.com/a_b**", &WHATSAPP),
            "*docs: https://x.com/a_b*"
        );
    }

    #[test]
    fn test_adjacent_link_targets_restore_in_order() {
        assert_eq!(
            rewrite("[a](x_1)1[b](y_2)", &PLAIN_TEXT),
            "a (x_1)1b (y_2)"
        );
    }

    #[test]
    fn test_links() {
        let text = "see [docs](https://example.com/a_b)";
        assert_eq!(rewrite(text, &WHATSAPP), "see docs (https://example.com/a_b)");
        assert_eq!(rewrite(text, &TELEGRAM), text);
    }

    #[test]
    fn test_unordered_list() {
        assert_eq!(
            rewrite("- item one\n  * item two", &WHATSAPP),
            "• item one\n• item two"
        );
        assert_eq!(rewrite("* item", &PLAIN_TEXT), "- item");
    }

    #[test]
    fn test_ordered_list() {
        assert_eq!(rewrite("1. first\n2. second", &WHATSAPP), "1) first\n2) second");
        assert_eq!(rewrite("10.  tenth", &TELEGRAM), "10. tenth");
    }

    #[test]
    fn test_horizontal_rule() {
        assert_eq!(rewrite("a\n---\nb", &WHATSAPP), "a\n──────────\nb");
        assert_eq!(rewrite("  ***  ", &PLAIN_TEXT), "----------");
    }

    #[test]
    fn test_table_row_collapse() {
        assert_eq!(rewrite("| a | b |", &WHATSAPP), "a | b");
        assert_eq!(
            rewrite("| h1 | h2 |\n|----|----|\n| x | y |", &PLAIN_TEXT),
            "h1 | h2\n---- | ----\nx | y"
        );
    }

    #[test]
    fn test_single_pipe_is_not_a_table() {
        assert_eq!(rewrite("this | that", &WHATSAPP), "this | that");
    }

    #[test]
    fn test_long_star_runs_are_rules() {
        for line in ["*****", "******"] {
            assert_eq!(rewrite(line, &WHATSAPP), "──────────");
            assert_eq!(rewrite(line, &TELEGRAM), "──────────");
            assert_eq!(rewrite(line, &PLAIN_TEXT), "----------");
        }
    }

    #[test]
    fn test_pass_order() {
        let position = |pass| PASSES.iter().position(|&p| p == pass).unwrap();

        assert_eq!(PASSES[0], Pass::HorizontalRule);
        assert!(position(Pass::BoldItalic) < position(Pass::Bold));
        assert!(position(Pass::Bold) < position(Pass::Italic));
        assert_eq!(PASSES[PASSES.len() - 1], Pass::LeftoverMarkers);
    }
}
