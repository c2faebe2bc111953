//! Table of contents generation.
//!
//! Headings under the rendered document get anchor ids, and the nav
//! container is rebuilt with one indented link per heading.

use std::collections::HashSet;

use kuchikikiki::NodeRef;

use crate::page::dom;

/// Shown in the nav container when the document has no headings.
pub const NO_TOC_PLACEHOLDER: &str = r#"<p class="small">No TOC available.</p>"#;

/// Used when a heading's text yields an empty slug.
const FALLBACK_SLUG: &str = "section";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(Self::H1),
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            _ => None,
        }
    }

    /// Left margin of the nav link for this level.
    pub fn indent(self) -> &'static str {
        match self {
            Self::H1 => "0",
            Self::H2 => "8px",
            Self::H3 => "14px",
        }
    }
}

/// One heading of the rendered document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub anchor_id: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TocBuilder;

impl TocBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Assign anchors to the headings under `root` and rebuild `nav`.
    pub fn build(&self, root: &NodeRef, nav: &NodeRef) -> Vec<HeadingEntry> {
        let entries = assign_anchors(root);
        dom::clear_children(nav);

        if entries.is_empty() {
            dom::set_inner_html(nav, NO_TOC_PLACEHOLDER);
            return entries;
        }

        for entry in &entries {
            let href = format!("#{}", entry.anchor_id);
            let Some(link) = dom::element("a", &[("href", href.as_str())]) else {
                continue;
            };
            dom::set_style(&link, "margin-left", entry.level.indent());
            dom::set_text(&link, &entry.text);
            nav.append(link);
        }
        entries
    }
}

/// Give every `h1`-`h3` under `root` an id, keeping existing ones.
/// Derived ids avoid every id in the whole page, not only under `root`.
fn assign_anchors(root: &NodeRef) -> Vec<HeadingEntry> {
    let page = root.inclusive_ancestors().last().unwrap_or_else(|| root.clone());
    let mut taken: HashSet<String> = dom::select_all(&page, "[id]")
        .iter()
        .filter_map(|node| dom::attr(node, "id"))
        .collect();

    let mut entries = Vec::new();
    for heading in dom::select_all(root, "h1, h2, h3") {
        let Some(level) = dom::tag_name(&heading).and_then(|t| HeadingLevel::from_tag(&t)) else {
            continue;
        };
        let text = heading.text_contents().trim().to_string();

        let anchor_id = match dom::attr(&heading, "id").filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => {
                let id = unique_id(&slugify(&text), &taken);
                dom::set_attr(&heading, "id", &id);
                taken.insert(id.clone());
                id
            }
        };

        entries.push(HeadingEntry {
            level,
            text,
            anchor_id,
        });
    }
    entries
}

/// Derive an anchor id from heading text.
/// "Hello, World!" -> "hello-world"
pub fn slugify(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

fn unique_id(slug: &str, taken: &HashSet<String>) -> String {
    let base = if slug.is_empty() { FALLBACK_SLUG } else { slug };
    if !taken.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}
