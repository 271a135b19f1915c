//! Channel markup rules: escaping plus the structural pieces templates use.

use serde::{Deserialize, Serialize};

/// Characters Telegram MarkdownV2 reserves; each is escaped with a backslash.
const MARKDOWN_V2_RESERVED: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Characters Discord markdown treats as formatting.
const DISCORD_RESERVED: &[char] = &['\\', '*', '_', '~', '`', '|', '>', '#', '[', ']', '(', ')'];

/// Characters that would end or break a bare URL in Discord; percent-encoded.
const DISCORD_URL_BREAKERS: &[char] = &[' ', '<', '>', '(', ')', '[', ']', '`', '|', '*', '~'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Markup {
    /// Telegram `parse_mode=MarkdownV2`.
    #[default]
    MarkdownV2,
    /// Telegram `parse_mode=HTML`.
    Html,
    /// Discord webhook markdown.
    Discord,
    /// No markup; nothing is reserved.
    Plain,
}

impl Markup {
    /// Escape content placed in running text.
    pub fn escape_text(self, s: &str) -> String {
        match self {
            Markup::MarkdownV2 => escape_markdown_v2(s),
            Markup::Html => html_escape::encode_text(s).into_owned(),
            Markup::Discord => backslash_escape(s, DISCORD_RESERVED),
            Markup::Plain => s.to_string(),
        }
    }

    /// Escape content placed in a link target.
    pub fn escape_link(self, s: &str) -> String {
        match self {
            Markup::MarkdownV2 => escape_markdown_v2(s),
            Markup::Html => html_escape::encode_double_quoted_attribute(s).into_owned(),
            Markup::Discord => percent_encode(s, DISCORD_URL_BREAKERS),
            Markup::Plain => s.to_string(),
        }
    }

    /// `inner` must already be escaped.
    pub fn bold(self, inner: &str) -> String {
        match self {
            Markup::MarkdownV2 => format!("*{inner}*"),
            Markup::Discord => format!("**{inner}**"),
            Markup::Html => format!("<b>{inner}</b>"),
            Markup::Plain => inner.to_string(),
        }
    }

    /// `label` and `target` must already be escaped (or be placeholders).
    pub fn link(self, label: &str, target: &str) -> String {
        match self {
            Markup::MarkdownV2 | Markup::Discord => format!("[{label}]({target})"),
            Markup::Html => format!("<a href=\"{target}\">{label}</a>"),
            Markup::Plain => format!("{label}: {target}"),
        }
    }

    pub fn telegram_parse_mode(self) -> Option<&'static str> {
        match self {
            Markup::MarkdownV2 => Some("MarkdownV2"),
            Markup::Html => Some("HTML"),
            Markup::Discord | Markup::Plain => None,
        }
    }
}

pub fn escape_markdown_v2(s: &str) -> String {
    backslash_escape(s, MARKDOWN_V2_RESERVED)
}

fn backslash_escape(s: &str, reserved: &[char]) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 4);
    for ch in s.chars() {
        if reserved.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn percent_encode(s: &str, breakers: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if breakers.contains(&ch) {
            // All breakers are ASCII.
            out.push_str(&format!("%{:02X}", ch as u32));
        } else {
            out.push(ch);
        }
    }
    out
}
