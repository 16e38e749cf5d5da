//! Markdown to chat-dialect transcoding.
//!
//! Every conversion runs the same four stages:
//!
//! 1. [`protect`] lifts fenced code blocks and inline code spans out of the
//!    text and leaves opaque placeholders behind.
//! 2. [`rewrite`] applies the ordered markup passes of the target dialect.
//! 3. [`restore`] puts the code back, rendered for the dialect.
//! 4. [`normalize`] tidies blank lines and trailing whitespace.
//!
//! The dialects differ only in their [`DialectRules`] table.

pub mod normalize;
pub mod protect;
pub mod restore;
pub mod rewrite;
pub mod rules;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use normalize::{normalize, normalize_line_endings};
pub use protect::{protect, Protected};
pub use restore::{restore, restore_counted, Restoration};
pub use rewrite::{rewrite, Pass, PASSES};
pub use rules::{DialectRules, PLAIN_TEXT, TELEGRAM, WHATSAPP};

/// Target chat markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    WhatsApp,
    PlainText,
    Telegram,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::WhatsApp, Dialect::PlainText, Dialect::Telegram];

    pub fn rules(self) -> &'static DialectRules {
        match self {
            Dialect::WhatsApp => &WHATSAPP,
            Dialect::PlainText => &PLAIN_TEXT,
            Dialect::Telegram => &TELEGRAM,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::WhatsApp => "whatsapp",
            Dialect::PlainText => "plaintext",
            Dialect::Telegram => "telegram",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown dialect '{0}' (expected one of: whatsapp, plaintext, telegram)")]
pub struct ParseDialectError(pub String);

impl FromStr for Dialect {
    type Err = ParseDialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whatsapp" | "wa" => Ok(Dialect::WhatsApp),
            "plaintext" | "plain" | "text" => Ok(Dialect::PlainText),
            "telegram" | "tg" => Ok(Dialect::Telegram),
            _ => Err(ParseDialectError(s.to_string())),
        }
    }
}

/// Convert Markdown into `dialect`. Never fails; malformed markup degrades to
/// literal text.
pub fn transcode(dialect: Dialect, markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let rules = dialect.rules();
    let text = normalize_line_endings(markdown);

    let protected = protect(&text);
    let rewritten = rewrite(&protected.residual, rules);
    let restored = restore(&rewritten, &protected, rules);

    normalize(&restored)
}

/// Convert Markdown to WhatsApp markup.
pub fn to_whatsapp(markdown: &str) -> String {
    transcode(Dialect::WhatsApp, markdown)
}

/// Strip Markdown down to plain text.
pub fn to_plain_text(markdown: &str) -> String {
    transcode(Dialect::PlainText, markdown)
}

/// Convert Markdown to Telegram markup.
pub fn to_telegram(markdown: &str) -> String {
    transcode(Dialect::Telegram, markdown)
}
