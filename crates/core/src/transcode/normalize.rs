use std::sync::OnceLock;

use regex::Regex;

/// Convert `\r\n` and lone `\r` line terminators to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Tidy converted output.
///
/// Right-trims every line, collapses runs of three or more newlines to a
/// single blank line, and trims the whole result. Lines are trimmed first so
/// whitespace-only lines collapse too; this also makes the function
/// idempotent.
pub fn normalize(text: &str) -> String {
    static RE_BLANK_RUN: OnceLock<Regex> = OnceLock::new();
    let re_blank_run = RE_BLANK_RUN.get_or_init(|| Regex::new(r"\n{3,}").unwrap());

    let trimmed = text
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");

    re_blank_run
        .replace_all(&trimmed, "\n\n")
        .trim()
        .to_string()
}
