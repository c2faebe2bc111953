use autumnus::{HtmlLinkedBuilder, formatter::Formatter, languages::Language, themes};

/// Class autumnus puts on the `<pre>` of every block it highlighted.
pub const HIGHLIGHTED_CLASS: &str = "athl";

#[derive(thiserror::Error, Debug)]
pub enum HighlightError {
    #[error("failed to build a highlighter for {0}")]
    Formatter(String),

    #[error("failed to highlight code as {0}")]
    Format(String),

    #[error("highlighted output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("highlighted output has no <code> element")]
    MissingCode,
}

/// A syntax highlighter using autumnus (tree-sitter based).
#[derive(Debug, Clone)]
pub struct SyntaxHighlighter {
    /// Theme name for CSS generation.
    theme_name: String,
}

impl SyntaxHighlighter {
    /// Create a new syntax highlighter with the given theme.
    pub fn new(theme_name: &str) -> Self {
        Self {
            theme_name: theme_name.to_string(),
        }
    }

    /// Resolve a language hint, returning `None` if it is empty or unknown.
    pub fn recognize(&self, hint: &str) -> Option<Language> {
        let hint = hint.trim();
        if hint.is_empty() {
            return None;
        }

        let lang = Language::guess(hint, "");
        if matches!(lang, Language::PlainText) && hint != "plaintext" && hint != "text" {
            return None;
        }
        Some(lang)
    }

    /// Highlight code and return HTML with CSS classes.
    ///
    /// A recognized hint selects the language; otherwise the language is
    /// detected from the code itself.
    pub fn highlight(&self, code: &str, hint: Option<&str>) -> Result<String, HighlightError> {
        let lang = hint
            .and_then(|h| self.recognize(h))
            .unwrap_or_else(|| Language::guess("", code));
        let label = hint.filter(|h| !h.trim().is_empty()).unwrap_or("auto");

        let formatter = HtmlLinkedBuilder::new()
            .source(code)
            .lang(lang)
            .build()
            .map_err(|_| HighlightError::Formatter(label.to_string()))?;

        let mut output: Vec<u8> = Vec::new();
        formatter
            .format(&mut output)
            .map_err(|_| HighlightError::Format(label.to_string()))?;

        Ok(String::from_utf8(output)?)
    }

    /// Highlight code, falling back to an escaped plain block if
    /// highlighting fails. Failures are logged, never returned.
    pub fn highlight_or_plain(&self, code: &str, hint: Option<&str>) -> String {
        or_plain(self.highlight(code, hint), code, hint)
    }

    /// Generate CSS for the current theme.
    pub fn generate_css(&self) -> Option<String> {
        let theme = themes::get(&self.theme_name).ok()?;
        Some(theme.css(false)) // false = don't enable italic
    }
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new("github-dark")
    }
}

fn or_plain(highlighted: Result<String, HighlightError>, code: &str, hint: Option<&str>) -> String {
    match highlighted {
        Ok(html) => html,
        Err(e) => {
            tracing::debug!(error = %e, "highlighting failed, using plain code block");
            plain_code_block(code, hint)
        }
    }
}

/// Create a plain code block without highlighting.
pub fn plain_code_block(code: &str, hint: Option<&str>) -> String {
    let escaped = html_escape(code);
    match hint.map(str::trim).filter(|h| !h.is_empty()) {
        Some(lang) => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            html_escape(lang),
            escaped
        ),
        None => format!("<pre><code>{}</code></pre>", escaped),
    }
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
