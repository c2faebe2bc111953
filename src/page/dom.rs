//! Small helpers over the kuchikikiki DOM.
//!
//! These mirror the handful of browser DOM operations the page needs
//! (`innerHTML`, `innerText`, attribute access, element creation).

use kuchikikiki::NodeRef;
use kuchikikiki::traits::*;

/// Parse an HTML fragment and return its top-level nodes, detached.
pub fn parse_fragment(html: &str) -> Vec<NodeRef> {
    let document = kuchikikiki::parse_html().one(html);
    let Some(body) = select_first(&document, "body") else {
        return Vec::new();
    };
    let nodes: Vec<NodeRef> = body.children().collect();
    for node in &nodes {
        node.detach();
    }
    nodes
}

/// Create a detached element with the given attributes.
pub fn element(tag: &str, attrs: &[(&str, &str)]) -> Option<NodeRef> {
    let node = parse_fragment(&format!("<{tag}></{tag}>"))
        .into_iter()
        .find(|n| n.as_element().is_some())?;
    for (name, value) in attrs {
        set_attr(&node, name, value);
    }
    Some(node)
}

/// All elements under `root` (inclusive) matching a CSS selector, in
/// document order. An invalid selector matches nothing.
pub fn select_all(root: &NodeRef, selector: &str) -> Vec<NodeRef> {
    match root.select(selector) {
        Ok(matches) => matches.map(|m| m.as_node().clone()).collect(),
        Err(()) => Vec::new(),
    }
}

pub fn select_first(root: &NodeRef, selector: &str) -> Option<NodeRef> {
    root.select_first(selector).ok().map(|m| m.as_node().clone())
}

/// The local tag name of an element node.
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.as_element().map(|e| e.name.local.to_string())
}

pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    let element = node.as_element()?;
    let attributes = element.attributes.borrow();
    attributes.get(name).map(str::to_string)
}

pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
    if let Some(element) = node.as_element() {
        element
            .attributes
            .borrow_mut()
            .insert(name, value.to_string());
    }
}

pub fn remove_attr(node: &NodeRef, name: &str) {
    if let Some(element) = node.as_element() {
        element.attributes.borrow_mut().remove(name);
    }
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    attr(node, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

pub fn add_class(node: &NodeRef, class: &str) {
    if has_class(node, class) {
        return;
    }
    let classes = match attr(node, "class") {
        Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
        _ => class.to_string(),
    };
    set_attr(node, "class", &classes);
}

/// Set one declaration of an element's inline `style`, replacing any
/// previous value for the same property.
pub fn set_style(node: &NodeRef, property: &str, value: &str) {
    let mut declarations: Vec<String> = attr(node, "style")
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .filter(|d| {
            d.split(':')
                .next()
                .is_none_or(|name| name.trim() != property)
        })
        .map(str::to_string)
        .collect();
    declarations.push(format!("{property}: {value}"));
    set_attr(node, "style", &declarations.join("; "));
}

pub fn clear_children(node: &NodeRef) {
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        child.detach();
    }
}

/// Replace the children of `node` with a single text node (`innerText = ...`).
pub fn set_text(node: &NodeRef, text: &str) {
    clear_children(node);
    node.append(NodeRef::new_text(text));
}

/// Replace the children of `node` with parsed HTML (`innerHTML = ...`).
pub fn set_inner_html(node: &NodeRef, html: &str) {
    clear_children(node);
    for child in parse_fragment(html) {
        node.append(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(html: &str) -> NodeRef {
        kuchikikiki::parse_html().one(html)
    }

    #[test]
    fn test_element_with_attributes() {
        let link = element("a", &[("href", "#intro")]).unwrap();
        assert_eq!(tag_name(&link).as_deref(), Some("a"));
        assert_eq!(attr(&link, "href").as_deref(), Some("#intro"));
        assert!(link.parent().is_none());
    }

    #[test]
    fn test_set_inner_html_replaces_children() {
        let doc = document("<div id='c'><p>old</p></div>");
        let container = select_first(&doc, "#c").unwrap();

        set_inner_html(&container, "<h1>New</h1><p>body</p>");

        assert_eq!(select_all(&container, "p").len(), 1);
        assert_eq!(container.text_contents(), "Newbody");
    }

    #[test]
    fn test_set_text_escapes_markup() {
        let doc = document("<div id='c'></div>");
        let container = select_first(&doc, "#c").unwrap();

        set_text(&container, "<b>not bold</b>");

        assert!(select_all(&container, "b").is_empty());
        assert_eq!(container.text_contents(), "<b>not bold</b>");
    }

    #[test]
    fn test_classes() {
        let doc = document("<pre class='code'></pre>");
        let pre = select_first(&doc, "pre").unwrap();

        assert!(has_class(&pre, "code"));
        add_class(&pre, "athl");
        add_class(&pre, "athl");
        assert_eq!(attr(&pre, "class").as_deref(), Some("code athl"));
    }

    #[test]
    fn test_set_style_replaces_property() {
        let doc = document("<div style='min-width: 40em; color: red'></div>");
        let div = select_first(&doc, "div").unwrap();

        set_style(&div, "min-width", "0");

        assert_eq!(
            attr(&div, "style").as_deref(),
            Some("color: red; min-width: 0")
        );
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let doc = document("<p>x</p>");
        assert!(select_all(&doc, "p[").is_empty());
    }
}
