use super::protect::{Protected, CODE_BLOCK, INLINE_CODE};
use super::rules::{CodeBlockStyle, DialectRules, InlineCodeStyle};

/// Rewritten text with its placeholders substituted back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restoration {
    pub text: String,
    /// Number of placeholders consumed.
    pub restored: usize,
}

/// Substitute every placeholder in `rewritten` with the dialect rendering of
/// the code span it stands for.
pub fn restore(rewritten: &str, protected: &Protected, rules: &DialectRules) -> String {
    restore_counted(rewritten, protected, rules).text
}

/// Like [`restore`], also reporting how many placeholders were consumed.
pub fn restore_counted(
    rewritten: &str,
    protected: &Protected,
    rules: &DialectRules,
) -> Restoration {
    let marker = protected.marker;
    let width = marker.len_utf8();

    let mut text = String::with_capacity(rewritten.len());
    let mut restored = 0;
    let mut rest = rewritten;

    while let Some(start) = rest.find(marker) {
        text.push_str(&rest[..start]);
        let after = &rest[start + width..];

        let rendered = after.find(marker).and_then(|end| {
            render_placeholder(&after[..end], protected, rules).map(|code| (end, code))
        });

        match rendered {
            Some((end, code)) => {
                text.push_str(&code);
                restored += 1;
                rest = &after[end + width..];
            }
            None => {
                // Not a placeholder we emitted; keep it literal.
                text.push(marker);
                rest = after;
            }
        }
    }
    text.push_str(rest);

    Restoration { text, restored }
}

fn render_placeholder(token: &str, protected: &Protected, rules: &DialectRules) -> Option<String> {
    if let Some(index) = token.strip_prefix(CODE_BLOCK) {
        let block = protected.code_blocks.get(index.parse::<usize>().ok()?)?;
        return Some(render_code_block(block, rules.code_block));
    }

    let index = token.strip_prefix(INLINE_CODE)?;
    let span = protected.inline_codes.get(index.parse::<usize>().ok()?)?;
    Some(render_inline_code(span, rules.inline_code))
}

/// Language tag and body of a fenced block, or `None` for a single-line block.
fn split_fence(inner: &str) -> Option<(&str, &str)> {
    let (tag, body) = inner.split_once('\n')?;
    Some((tag.trim(), body.trim_end_matches('\n')))
}

pub fn render_code_block(block: &str, style: CodeBlockStyle) -> String {
    let inner = block
        .strip_prefix("```")
        .and_then(|b| b.strip_suffix("```"))
        .unwrap_or(block);

    match (style, split_fence(inner)) {
        (CodeBlockStyle::Fenced { .. }, None) => format!("```{inner}```"),
        (CodeBlockStyle::Fenced { keep_language }, Some((tag, body))) => {
            let tag = if keep_language { tag } else { "" };
            format!("```{tag}\n{body}\n```")
        }
        (CodeBlockStyle::Bracketed, split) => {
            let (tag, body) = split.unwrap_or(("", inner));
            let header = if tag.is_empty() {
                "[CODE]".to_string()
            } else {
                format!("[CODE: {}]", tag.to_uppercase())
            };
            format!("{header}\n{body}\n[END CODE]")
        }
    }
}

pub fn render_inline_code(span: &str, style: InlineCodeStyle) -> String {
    match style {
        InlineCodeStyle::Verbatim => span.to_string(),
        InlineCodeStyle::Bare => span
            .strip_prefix('`')
            .and_then(|s| s.strip_suffix('`'))
            .unwrap_or(span)
            .to_string(),
    }
}
