//! Markdown rendering with per-block syntax highlighting.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};

use super::highlight::SyntaxHighlighter;
use crate::config::MarkdownConfig;

#[derive(thiserror::Error, Debug)]
pub enum MarkdownError {
    #[error("invalid markdown extension: {0}")]
    InvalidExtension(String),
}

/// Converts markdown to (unsanitized) HTML.
///
/// Headings keep explicit `{#id}` attributes; every other anchor is
/// assigned later, against the DOM, by the TOC builder.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
    highlighter: SyntaxHighlighter,
}

impl MarkdownRenderer {
    /// Create a renderer, validating the configured extensions up front.
    pub fn new(
        markdown_config: &MarkdownConfig,
        highlighter: SyntaxHighlighter,
    ) -> Result<Self, MarkdownError> {
        Ok(Self {
            options: options_from_config(markdown_config)?,
            highlighter,
        })
    }

    /// Render markdown to HTML using pulldown-cmark with syntax highlighting.
    pub fn render_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);

        // Process events, intercepting code blocks for syntax highlighting
        let mut in_code_block = false;
        let mut code_language = String::new();
        let mut code_content = String::new();

        let events: Vec<Event> = parser
            .flat_map(|event| match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_language = match kind {
                        CodeBlockKind::Fenced(info) => language_hint(&info).to_string(),
                        CodeBlockKind::Indented => String::new(),
                    };
                    code_content.clear();
                    vec![] // Don't emit the start tag yet
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    let hint = Some(code_language.as_str()).filter(|h| !h.is_empty());
                    let highlighted = self.highlighter.highlight_or_plain(&code_content, hint);
                    vec![Event::Html(highlighted.into())]
                }
                Event::Text(text) if in_code_block => {
                    code_content.push_str(&text);
                    vec![]
                }
                _ => vec![event],
            })
            .collect();

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }
}

fn options_from_config(markdown_config: &MarkdownConfig) -> Result<Options, MarkdownError> {
    let mut options = Options::empty();
    for extension in &markdown_config.extensions {
        match extension.as_str() {
            "definition_lists" => options.insert(Options::ENABLE_DEFINITION_LIST),
            "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
            "gfm" => options.insert(Options::ENABLE_GFM),
            "heading_attributes" => options.insert(Options::ENABLE_HEADING_ATTRIBUTES),
            "strikethrough" => options.insert(Options::ENABLE_STRIKETHROUGH),
            "tables" => options.insert(Options::ENABLE_TABLES),
            "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
            other => return Err(MarkdownError::InvalidExtension(other.to_string())),
        }
    }
    Ok(options)
}

/// The language named by a fence info string: its first word.
/// "rust,ignore" -> "rust", "python title=x" -> "python"
fn language_hint(info: &str) -> &str {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::new(&MarkdownConfig::default(), SyntaxHighlighter::default()).unwrap()
    }

    #[test]
    fn test_render_basic_markdown() {
        let html = renderer().render_html("# Hello\n\nWorld");

        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("<p>World</p>"));
    }

    #[test]
    fn test_explicit_heading_id_kept() {
        let html = renderer().render_html("## Setup {#getting-started}");
        assert!(html.contains("id=\"getting-started\""));
    }

    #[test]
    fn test_render_code_block() {
        let html = renderer().render_html("```rust\nlet x = 1;\n```");

        assert!(html.contains("let"));
        assert!(html.contains("<pre"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_gfm_table_and_strikethrough() {
        let html = renderer().render_html("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");

        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_language_hint() {
        assert_eq!(language_hint("rust"), "rust");
        assert_eq!(language_hint("rust,ignore"), "rust");
        assert_eq!(language_hint("python title=x"), "python");
        assert_eq!(language_hint(""), "");
    }

    #[test]
    fn test_invalid_extension() {
        let config = MarkdownConfig {
            extensions: vec!["not_a_real_extension".to_string()],
        };

        let result = MarkdownRenderer::new(&config, SyntaxHighlighter::default());
        assert!(matches!(result, Err(MarkdownError::InvalidExtension(_))));
    }
}
