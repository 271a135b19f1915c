//! Announcement templates, grouped per category.
//!
//! A `Template` is markup-neutral data. `layout` turns it into a placeholder
//! string for one markup: every static piece is escaped, structure (bold,
//! links) is added, and `{text}`, `{link}`, `{promo_link}` are left for
//! substitution.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::markup::Markup;
use crate::analyze::Category;
use crate::error::{RelayError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Shown on both sides of the headline.
    #[serde(default)]
    pub emoji: String,
    pub headline: String,
    /// Prefix in front of the item text.
    #[serde(default)]
    pub lead: String,
    /// Prefix in front of the item link.
    #[serde(default = "default_link_intro")]
    pub link_intro: String,
    /// Prefix of the promo line; `None` leaves the promo out of the template.
    #[serde(default)]
    pub promo_intro: Option<String>,
}

fn default_link_intro() -> String {
    "🔗 ".to_string()
}

/// Labels shared by all templates.
#[derive(Debug, Clone, Copy)]
pub struct Labels<'a> {
    pub link: &'a str,
    pub promo: &'a str,
}

impl Template {
    pub fn new(emoji: &str, headline: &str, lead: &str, link_intro: &str, promo_intro: &str) -> Self {
        Self {
            emoji: emoji.to_string(),
            headline: headline.to_string(),
            lead: lead.to_string(),
            link_intro: link_intro.to_string(),
            promo_intro: Some(promo_intro.to_string()),
        }
    }

    /// Placeholder string for `markup`. The link line is omitted when `has_link`
    /// is false, the promo line when `has_promo` is false.
    pub fn layout(&self, markup: Markup, labels: Labels<'_>, has_link: bool, has_promo: bool) -> String {
        let esc = |s: &str| markup.escape_text(s);

        let mut headline = markup.bold(&esc(&self.headline));
        if !self.emoji.is_empty() {
            let e = esc(&self.emoji);
            headline = format!("{e} {headline} {e}");
        }

        let mut out = format!("{headline}\n\n{}{{text}}", esc(&self.lead));
        let mut footer = Vec::new();
        if has_link {
            footer.push(format!(
                "{}{}",
                esc(&self.link_intro),
                markup.link(&esc(labels.link), "{link}")
            ));
        }
        if let Some(intro) = self.promo_intro.as_ref().filter(|_| has_promo) {
            footer.push(format!(
                "{}{}",
                esc(intro),
                markup.link(&esc(labels.promo), "{promo_link}")
            ));
        }
        if !footer.is_empty() {
            out.push_str("\n\n");
            out.push_str(&footer.join("\n"));
        }
        out
    }
}

/// Per-category template sets; every category resolves to a non-empty set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBook {
    important: Vec<Template>,
    normal: Vec<Template>,
}

impl TemplateBook {
    pub fn new(important: Vec<Template>, normal: Vec<Template>) -> Result<Self> {
        if important.is_empty() {
            return Err(RelayError::Config("no templates for category important".into()));
        }
        if normal.is_empty() {
            return Err(RelayError::Config("no templates for category normal".into()));
        }
        Ok(Self { important, normal })
    }

    /// Uniform pick from the category's set.
    pub fn pick<R: Rng + ?Sized>(&self, category: Category, rng: &mut R) -> &Template {
        let set = self.for_category(category);
        // Non-empty: `new` rejects empty sets and the defaults are non-empty.
        &set[rng.random_range(0..set.len())]
    }

    pub fn for_category(&self, category: Category) -> &[Template] {
        match category {
            Category::Important => &self.important,
            // `ignore` never reaches the renderer in the pipeline.
            Category::Normal | Category::Ignore => &self.normal,
        }
    }
}

impl Default for TemplateBook {
    fn default() -> Self {
        Self {
            important: default_important(),
            normal: default_normal(),
        }
    }
}

pub fn default_important() -> Vec<Template> {
    vec![
        Template::new("🚀", "Breaking News!", "", "🔗 ", "🌟 Stay updated with "),
        Template::new("🎉", "Big Announcement!", "", "🔗 Read more: ", "👀 Check out "),
        Template::new("🚨", "Security Alert!", "", "🔗 ", "🔍 Stay secure with "),
        Template::new("🔥", "Web3 Game Changer!", "", "🚀 Read now: ", "🔗 More at "),
    ]
}

pub fn default_normal() -> Vec<Template> {
    vec![
        Template::new("🎯", "Quest Alert!", "📢 ", "🔗 ", "🔍 Learn more at "),
        Template::new("💡", "Innovator Spotlight!", "🚀 ", "🔗 ", "🌍 Stay tuned with "),
        Template::new("📢", "Community Call!", "", "🔗 ", "📅 Join us at "),
        Template::new("🛠", "Dev Update!", "", "🔗 ", "👨‍💻 Explore at "),
    ]
}
