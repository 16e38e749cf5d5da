use serde::Serialize;

/// Opening and closing notation wrapped around an inline span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Wrap {
    pub open: &'static str,
    pub close: &'static str,
}

impl Wrap {
    /// Strips the source markers and emits the bare span.
    pub const NONE: Wrap = Wrap::symmetric("");

    pub const fn symmetric(marker: &'static str) -> Self {
        Wrap {
            open: marker,
            close: marker,
        }
    }

    pub fn apply(&self, inner: &str) -> String {
        format!("{}{}{}", self.open, inner, self.close)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// `[label](url)` becomes `label (url)`
    Inline,
    /// `[label](url)` is left untouched
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderedStyle {
    /// `1. item`
    Dot,
    /// `1) item`
    Paren,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineCodeStyle {
    /// Keep the backtick-delimited span as written
    Verbatim,
    /// Drop the backticks and keep the content
    Bare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "style", rename_all = "lowercase")]
pub enum CodeBlockStyle {
    /// Re-wrap the body in triple backticks.
    Fenced { keep_language: bool },
    /// Replace the fences with `[CODE: LANG]` / `[END CODE]` lines.
    Bracketed,
}

/// Fixed rendering table for one target dialect.
///
/// Every markup construct the rewriter recognises maps to exactly one field.
/// Tables are `const` and never mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DialectRules {
    pub name: &'static str,
    /// Bold spans and headings.
    pub bold: Wrap,
    pub italic: Wrap,
    /// `None` leaves `~~text~~` as written.
    pub strikethrough: Option<Wrap>,
    pub quote_prefix: &'static str,
    pub link: LinkStyle,
    pub bullet: &'static str,
    pub ordered: OrderedStyle,
    pub horizontal_rule: &'static str,
    pub table_separator: &'static str,
    pub inline_code: InlineCodeStyle,
    pub code_block: CodeBlockStyle,
}

pub const WHATSAPP: DialectRules = DialectRules {
    name: "WhatsApp",
    bold: Wrap::symmetric("*"),
    italic: Wrap::symmetric("_"),
    strikethrough: Some(Wrap::symmetric("~")),
    quote_prefix: "» ",
    link: LinkStyle::Inline,
    bullet: "• ",
    ordered: OrderedStyle::Paren,
    horizontal_rule: "──────────",
    table_separator: " | ",
    inline_code: InlineCodeStyle::Verbatim,
    code_block: CodeBlockStyle::Fenced {
        keep_language: true,
    },
};

pub const PLAIN_TEXT: DialectRules = DialectRules {
    name: "Plain text",
    bold: Wrap::NONE,
    italic: Wrap::NONE,
    strikethrough: Some(Wrap::NONE),
    quote_prefix: "",
    link: LinkStyle::Inline,
    bullet: "- ",
    ordered: OrderedStyle::Dot,
    horizontal_rule: "----------",
    table_separator: " | ",
    inline_code: InlineCodeStyle::Bare,
    code_block: CodeBlockStyle::Bracketed,
};

pub const TELEGRAM: DialectRules = DialectRules {
    name: "Telegram",
    bold: Wrap::symmetric("**"),
    italic: Wrap::symmetric("_"),
    strikethrough: None,
    quote_prefix: "> ",
    link: LinkStyle::Passthrough,
    bullet: "• ",
    ordered: OrderedStyle::Dot,
    horizontal_rule: "──────────",
    table_separator: " | ",
    inline_code: InlineCodeStyle::Verbatim,
    code_block: CodeBlockStyle::Fenced {
        keep_language: true,
    },
};
