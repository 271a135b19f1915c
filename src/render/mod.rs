//! Message assembly: pick template -> escape -> substitute -> ensure promo link.
//!
//! Escaping happens strictly before substitution, and substitution is a
//! single left-to-right pass, so item content can neither break markup nor
//! inject placeholders.

pub mod markup;
pub mod templates;

use std::fmt;

use rand::Rng;

use crate::analyze::Category;
pub use markup::Markup;
pub use templates::{Labels, Template, TemplateBook};

pub const DEFAULT_PROMO_LINK: &str = "https://x.com/joinzo";
pub const DEFAULT_PROMO_LABEL: &str = "Zop Labs";
pub const DEFAULT_LINK_LABEL: &str = "Tweet Link";
pub const DEFAULT_MAX_TEXT_CHARS: usize = 3000;

/// Final text of one pipeline pass, ready for the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    text: String,
    markup: Markup,
}

impl RenderedMessage {
    pub fn new(text: impl Into<String>, markup: Markup) -> Self {
        Self {
            text: text.into(),
            markup,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn markup(&self) -> Markup {
        self.markup
    }
}

impl fmt::Display for RenderedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    markup: Markup,
    book: TemplateBook,
    promo_link: String,
    promo_label: String,
    link_label: String,
    max_text_chars: usize,
    /// Channel limit on the whole message, in chars.
    max_message_chars: Option<usize>,
}

impl Renderer {
    pub fn new(markup: Markup, promo_link: impl Into<String>) -> Self {
        Self {
            markup,
            book: TemplateBook::default(),
            promo_link: promo_link.into(),
            promo_label: DEFAULT_PROMO_LABEL.to_string(),
            link_label: DEFAULT_LINK_LABEL.to_string(),
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            max_message_chars: None,
        }
    }

    pub fn with_book(mut self, book: TemplateBook) -> Self {
        self.book = book;
        self
    }

    pub fn with_labels(mut self, link_label: impl Into<String>, promo_label: impl Into<String>) -> Self {
        self.link_label = link_label.into();
        self.promo_label = promo_label.into();
        self
    }

    /// `0` disables truncation.
    pub fn with_max_text_chars(mut self, max: usize) -> Self {
        self.max_text_chars = max;
        self
    }

    /// Item text is shortened further until the whole message fits `max`.
    pub fn with_max_message_chars(mut self, max: usize) -> Self {
        self.max_message_chars = Some(max);
        self
    }

    pub fn markup(&self) -> Markup {
        self.markup
    }

    /// Uniform-random template choice from the category's set (not reproducible).
    pub fn render(&self, category: Category, text: &str, link: &str) -> RenderedMessage {
        self.render_with(category, text, link, &mut rand::rng())
    }

    /// Same as `render` with a caller-supplied RNG.
    pub fn render_with<R: Rng + ?Sized>(
        &self,
        category: Category,
        text: &str,
        link: &str,
        rng: &mut R,
    ) -> RenderedMessage {
        let m = self.markup;
        let text = text.trim();
        let link = m.escape_link(link.trim());
        let promo = m.escape_link(&self.promo_link);
        let template = self.book.pick(category, rng);

        let mut budget = self.max_text_chars;
        loop {
            let out = self.assemble(template, text, &link, &promo, budget);
            let Some(limit) = self.max_message_chars else {
                return RenderedMessage::new(out, m);
            };
            let len = out.chars().count();
            if len <= limit {
                return RenderedMessage::new(out, m);
            }
            // Shrink the item text by the overflow; escaping may expand it, so repeat.
            let current = match budget {
                0 => text.chars().count(),
                b => b.min(text.chars().count()),
            };
            if current <= 1 {
                return RenderedMessage::new(out, m);
            }
            budget = current.saturating_sub(len - limit).max(1);
        }
    }

    fn assemble(&self, template: &Template, text: &str, link: &str, promo: &str, budget: usize) -> String {
        let m = self.markup;

        // (1) escape user content
        let text = m.escape_text(&truncate_chars(text, budget));

        // Promo already carried by the item itself: leave it out of the footer.
        let carried = !promo.is_empty() && (text.contains(promo) || link.contains(promo));

        // (2) lay out the chosen template
        let layout = template.layout(m, self.labels(), !link.is_empty(), !carried);

        // (3) substitute
        let mut out = substitute(
            &layout,
            &[("text", &text), ("link", link), ("promo_link", promo)],
        );

        // (4) promo link at most once
        if !promo.is_empty() && !out.contains(promo) {
            out.push('\n');
            out.push_str(promo);
        }
        out
    }

    fn labels(&self) -> Labels<'_> {
        Labels {
            link: &self.link_label,
            promo: &self.promo_label,
        }
    }
}

/// Replace `{name}` occurrences in one pass. Unknown names stay verbatim and
/// substituted values are never scanned again.
pub fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 128);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) if !after[..end].contains('{') => {
                let name = &after[..end];
                match vars.iter().find(|(k, _)| *k == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn truncate_chars(s: &str, max: usize) -> String {
    if max == 0 || s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn substitute_is_single_pass() {
        let out = substitute("a {text} b {link}", &[("text", "{link}"), ("link", "L")]);
        assert_eq!(out, "a {link} b L");
    }

    #[test]
    fn substitute_keeps_unknown_and_stray_braces() {
        assert_eq!(substitute("{nope} {text}", &[("text", "T")]), "{nope} T");
        assert_eq!(substitute("\\{ {text}", &[("text", "T")]), "\\{ T");
        assert_eq!(substitute("open { only", &[]), "open { only");
        assert_eq!(substitute("}{text}{", &[("text", "T")]), "}T{");
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_chars("héllo", 10), "héllo");
        assert_eq!(truncate_chars("héllo", 3), "hé…");
        assert_eq!(truncate_chars("héllo", 0), "héllo");
    }

    #[test]
    fn seeded_rng_picks_the_same_template() {
        let r = Renderer::new(Markup::Plain, DEFAULT_PROMO_LINK);
        let a = r.render_with(Category::Important, "t", "l", &mut StdRng::seed_from_u64(7));
        let b = r.render_with(Category::Important, "t", "l", &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn every_template_is_reachable() {
        let r = Renderer::new(Markup::Plain, DEFAULT_PROMO_LINK);
        let mut rng = StdRng::seed_from_u64(1);
        let mut headlines = std::collections::HashSet::new();
        for _ in 0..400 {
            let msg = r.render_with(Category::Normal, "t", "l", &mut rng);
            headlines.insert(msg.as_str().lines().next().unwrap_or_default().to_string());
        }
        assert_eq!(headlines.len(), templates::default_normal().len());
    }

    #[test]
    fn message_is_shrunk_to_the_channel_limit() {
        let r = Renderer::new(Markup::MarkdownV2, DEFAULT_PROMO_LINK).with_max_message_chars(500);
        let text = "a.b ".repeat(300);
        let msg = r.render(Category::Important, &text, "https://x/1");
        assert!(msg.as_str().chars().count() <= 500, "{} chars", msg.as_str().chars().count());
        assert!(msg.as_str().contains('…'));
        assert!(msg.as_str().contains(DEFAULT_PROMO_LINK.replace('.', "\\.").as_str()));
    }

    #[test]
    fn short_message_ignores_the_limit() {
        let capped = Renderer::new(Markup::Plain, DEFAULT_PROMO_LINK).with_max_message_chars(2000);
        let plain = Renderer::new(Markup::Plain, DEFAULT_PROMO_LINK);
        let a = capped.render_with(Category::Normal, "hello", "l", &mut StdRng::seed_from_u64(2));
        let b = plain.render_with(Category::Normal, "hello", "l", &mut StdRng::seed_from_u64(2));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_promo_is_never_appended() {
        let r = Renderer::new(Markup::Plain, "");
        let msg = r.render(Category::Normal, "t", "");
        assert!(!msg.as_str().ends_with('\n'));
    }
}
