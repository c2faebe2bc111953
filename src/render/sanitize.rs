use ammonia::Builder;

/// Cleans rendered HTML before it is inserted into the page.
///
/// Scripts, event handlers and `javascript:` links are removed. Classes,
/// ids and `data-*` attributes survive, since highlighting and heading
/// anchors depend on them.
pub struct Sanitizer {
    builder: Builder<'static>,
}

impl Sanitizer {
    pub fn new() -> Self {
        let mut builder = Builder::default();
        builder
            .add_generic_attributes(&["class", "id"])
            .add_generic_attribute_prefixes(&["data-"])
            // GFM task list checkboxes
            .add_tags(&["input"])
            .add_tag_attributes("input", &["type", "checked", "disabled"]);
        Self { builder }
    }

    pub fn clean(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_script() {
        let cleaned = Sanitizer::new().clean("<p>hi</p><script>alert(1)</script>");
        assert_eq!(cleaned, "<p>hi</p>");
    }

    #[test]
    fn test_removes_event_handlers_and_js_links() {
        let cleaned = Sanitizer::new()
            .clean(r#"<a href="javascript:alert(1)" onclick="x()">link</a><img src="a.png" onerror="x()">"#);
        assert!(!cleaned.contains("javascript:"));
        assert!(!cleaned.contains("onclick"));
        assert!(!cleaned.contains("onerror"));
        assert!(cleaned.contains("link"));
    }

    #[test]
    fn test_keeps_highlight_classes_and_ids() {
        let html = r#"<h2 id="setup">Setup</h2><pre class="athl"><code class="language-rust"><span class="keyword">fn</span></code></pre>"#;
        let cleaned = Sanitizer::new().clean(html);

        assert!(cleaned.contains(r#"id="setup""#));
        assert!(cleaned.contains(r#"class="athl""#));
        assert!(cleaned.contains(r#"class="keyword""#));
    }

    #[test]
    fn test_keeps_task_list_checkboxes() {
        let cleaned =
            Sanitizer::new().clean(r#"<ul><li><input type="checkbox" checked="" disabled="">done</li></ul>"#);
        assert!(cleaned.contains("type=\"checkbox\""));
    }
}
