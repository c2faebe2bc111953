//! Copy-to-clipboard controls for rendered code blocks.
//!
//! Every `<pre>` in the rendered document gets exactly one overlaid
//! "Copy" button. Activating it writes the block's plain text to the
//! clipboard and briefly shows "Copied!" or "Failed" on the button.
//!
//! Label reverts run as `spawn_local` tasks, so controls must be
//! activated from within a [`tokio::task::LocalSet`].

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::io::{IsTerminal, Write};
use std::rc::Rc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use kuchikikiki::NodeRef;
use tracing::{debug, warn};

use super::highlight::{HIGHLIGHTED_CLASS, HighlightError, SyntaxHighlighter};
use crate::config::CopyConfig;
use crate::page::dom;

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";
pub const FAILED_LABEL: &str = "Failed";

const BUTTON_CLASS: &str = "copy-btn";

// =============================================================================
// Clipboards
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ClipboardError {
    #[error("clipboard is unavailable: {0}")]
    Unavailable(String),

    #[error("clipboard write was denied")]
    Denied,

    #[error("failed to write to clipboard: {0}")]
    Io(#[from] std::io::Error),
}

/// A system clipboard that accepts plain text.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> impl Future<Output = Result<(), ClipboardError>>;
}

/// A clipboard that keeps the last written text in memory.
///
/// Injected where the system clipboard must not be touched; the CLI
/// itself always uses [`Osc52Clipboard`].
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: RefCell<Option<String>>,
    deny: Cell<bool>,
}

#[allow(dead_code)]
impl MemoryClipboard {
    /// A clipboard that rejects every write, like a denied browser permission.
    pub fn denied() -> Self {
        Self {
            contents: RefCell::new(None),
            deny: Cell::new(true),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.deny.get() {
            return Err(ClipboardError::Denied);
        }
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

/// The terminal clipboard, set through an OSC 52 escape sequence on stdout.
#[derive(Debug, Default)]
pub struct Osc52Clipboard;

impl Clipboard for Osc52Clipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut stdout = std::io::stdout();
        if !stdout.is_terminal() {
            return Err(ClipboardError::Unavailable(
                "stdout is not a terminal".to_string(),
            ));
        }
        write!(stdout, "\x1b]52;c;{}\x07", BASE64.encode(text))?;
        stdout.flush()?;
        Ok(())
    }
}

// =============================================================================
// Feedback timing
// =============================================================================

/// How long each feedback label stays before reverting to "Copy".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackDurations {
    pub copied: Duration,
    pub failed: Duration,
}

impl Default for FeedbackDurations {
    fn default() -> Self {
        Self::from(&CopyConfig::default())
    }
}

impl From<&CopyConfig> for FeedbackDurations {
    fn from(config: &CopyConfig) -> Self {
        Self {
            copied: Duration::from_millis(config.copied_ms),
            failed: Duration::from_millis(config.failed_ms),
        }
    }
}

// =============================================================================
// Installer
// =============================================================================

/// Attaches copy controls to the code blocks of a rendered subtree.
pub struct CopyInstaller<C> {
    clipboard: Rc<C>,
    durations: FeedbackDurations,
    highlighter: SyntaxHighlighter,
}

impl<C: Clipboard + 'static> CopyInstaller<C> {
    pub fn new(clipboard: Rc<C>, durations: FeedbackDurations, highlighter: SyntaxHighlighter) -> Self {
        Self {
            clipboard,
            durations,
            highlighter,
        }
    }

    /// Highlight any code left unhighlighted, then attach a control to
    /// every `<pre>` under `root` that does not already have one.
    ///
    /// Returns the newly attached controls in document order.
    pub fn install(&self, root: &NodeRef) -> Vec<CopyControl<C>> {
        highlight_pending(root, |code, hint| self.highlighter.highlight(code, hint));

        let mut controls = Vec::new();
        for block in dom::select_all(root, "pre") {
            let has_control = block
                .children()
                .any(|child| dom::has_class(&child, BUTTON_CLASS));
            if has_control {
                continue;
            }

            let Some(button) = dom::element(
                "button",
                &[
                    ("class", BUTTON_CLASS),
                    ("title", "Copy code"),
                    ("style", "position: absolute; top: 8px; right: 8px"),
                ],
            ) else {
                continue;
            };
            dom::set_text(&button, COPY_LABEL);
            dom::set_style(&block, "position", "relative");
            block.append(button.clone());

            controls.push(CopyControl {
                button,
                block,
                clipboard: Rc::clone(&self.clipboard),
                durations: self.durations,
                generation: Rc::new(Cell::new(0)),
            });
        }
        debug!(count = controls.len(), "installed copy controls");
        controls
    }

}

/// Highlight every `pre > code` whose block was not highlighted during
/// rendering. A failing block is left as it is and the rest still run.
fn highlight_pending<F>(root: &NodeRef, highlight: F)
where
    F: Fn(&str, Option<&str>) -> Result<String, HighlightError>,
{
    for code in dom::select_all(root, "pre > code") {
        let Some(block) = code.parent() else {
            continue;
        };
        if dom::has_class(&block, HIGHLIGHTED_CLASS) {
            continue;
        }

        let hint = language_class(&code);
        let result = highlight(&code.text_contents(), hint.as_deref())
            .and_then(|html| splice_highlighted(&block, &code, &html));
        if let Err(e) = result {
            debug!(error = %e, "leaving code block unhighlighted");
        }
    }
}

/// The language named by a `language-*` class on a code element.
fn language_class(code: &NodeRef) -> Option<String> {
    dom::attr(code, "class")?
        .split_whitespace()
        .find_map(|c| c.strip_prefix("language-"))
        .map(str::to_string)
}

/// Move the highlighted markup into the existing code element, keeping
/// the block node itself (and anything attached to it) in place.
fn splice_highlighted(block: &NodeRef, code: &NodeRef, html: &str) -> Result<(), HighlightError> {
    let fragment = dom::parse_fragment(html);
    let highlighted = fragment
        .iter()
        .find_map(|node| dom::select_first(node, "code"))
        .ok_or(HighlightError::MissingCode)?;

    dom::clear_children(code);
    let children: Vec<NodeRef> = highlighted.children().collect();
    for child in children {
        code.append(child);
    }
    dom::add_class(block, HIGHLIGHTED_CLASS);
    Ok(())
}

// =============================================================================
// Controls
// =============================================================================

/// What a single activation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
    /// The block has no code element, nothing was copied.
    Empty,
}

/// The copy button attached to one code block.
pub struct CopyControl<C> {
    button: NodeRef,
    block: NodeRef,
    clipboard: Rc<C>,
    durations: FeedbackDurations,
    /// Bumped on each activation; a revert only applies to the latest one.
    generation: Rc<Cell<u64>>,
}

impl<C> Clone for CopyControl<C> {
    fn clone(&self) -> Self {
        Self {
            button: self.button.clone(),
            block: self.block.clone(),
            clipboard: Rc::clone(&self.clipboard),
            durations: self.durations,
            generation: Rc::clone(&self.generation),
        }
    }
}

impl<C: Clipboard + 'static> CopyControl<C> {
    /// The button's current label.
    pub fn label(&self) -> String {
        self.button.text_contents()
    }

    /// Copy the block's plain text and show feedback on the button.
    ///
    /// Never fails: a rejected clipboard write shows "Failed" instead.
    pub async fn activate(&self) -> CopyOutcome {
        let Some(code) = dom::select_first(&self.block, "code") else {
            return CopyOutcome::Empty;
        };
        let text = code.text_contents();

        match self.clipboard.write_text(&text).await {
            Ok(()) => {
                self.flash(COPIED_LABEL, self.durations.copied);
                CopyOutcome::Copied
            }
            Err(e) => {
                warn!(error = %e, "failed to copy code block");
                self.flash(FAILED_LABEL, self.durations.failed);
                CopyOutcome::Failed
            }
        }
    }

    /// Show `label`, then revert to "Copy" after `duration` unless a newer
    /// activation has happened in the meantime.
    fn flash(&self, label: &str, duration: Duration) {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        dom::set_text(&self.button, label);

        let button = self.button.clone();
        let current = Rc::clone(&self.generation);
        tokio::task::spawn_local(async move {
            tokio::time::sleep(duration).await;
            if current.get() == generation {
                dom::set_text(&button, COPY_LABEL);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchikikiki::traits::*;
    use tokio::task::LocalSet;

    const BLOCKS: &str = r#"<div id="root">
<pre><code class="language-sh">echo one</code></pre>
<p>between</p>
<pre><code>echo two</code></pre>
</div>"#;

    fn root() -> NodeRef {
        let document = kuchikikiki::parse_html().one(BLOCKS);
        dom::select_first(&document, "#root").unwrap()
    }

    fn installer(clipboard: Rc<MemoryClipboard>) -> CopyInstaller<MemoryClipboard> {
        CopyInstaller::new(
            clipboard,
            FeedbackDurations::default(),
            SyntaxHighlighter::default(),
        )
    }

    #[test]
    fn test_one_control_per_block() {
        let root = root();
        let controls = installer(Rc::new(MemoryClipboard::default())).install(&root);

        assert_eq!(controls.len(), 2);
        for pre in dom::select_all(&root, "pre") {
            assert_eq!(dom::select_all(&pre, "button.copy-btn").len(), 1);
            assert!(dom::attr(&pre, "style").unwrap().contains("position: relative"));
        }
        assert!(controls.iter().all(|c| c.label() == COPY_LABEL));
    }

    #[test]
    fn test_install_is_idempotent() {
        let root = root();
        let installer = installer(Rc::new(MemoryClipboard::default()));

        installer.install(&root);
        let second = installer.install(&root);

        assert!(second.is_empty());
        assert_eq!(dom::select_all(&root, "button.copy-btn").len(), 2);
    }

    #[test]
    fn test_install_highlights_pending_blocks() {
        let root = root();
        installer(Rc::new(MemoryClipboard::default())).install(&root);

        for code in dom::select_all(&root, "pre > code") {
            // Text survives highlighting unchanged
            assert!(code.text_contents().starts_with("echo"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_feedback_reverts() {
        LocalSet::new()
            .run_until(async {
                let clipboard = Rc::new(MemoryClipboard::default());
                let root = root();
                let controls = installer(Rc::clone(&clipboard)).install(&root);

                assert_eq!(controls[0].activate().await, CopyOutcome::Copied);
                assert_eq!(clipboard.contents().unwrap().trim_end(), "echo one");
                assert_eq!(controls[0].label(), COPIED_LABEL);
                assert_eq!(controls[1].label(), COPY_LABEL);

                tokio::time::sleep(Duration::from_millis(1399)).await;
                assert_eq!(controls[0].label(), COPIED_LABEL);

                tokio::time::sleep(Duration::from_millis(2)).await;
                assert_eq!(controls[0].label(), COPY_LABEL);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_copied_text_excludes_button_label() {
        LocalSet::new()
            .run_until(async {
                let clipboard = Rc::new(MemoryClipboard::default());
                let root = root();
                let controls = installer(Rc::clone(&clipboard)).install(&root);

                controls[1].activate().await;
                assert_eq!(clipboard.contents().unwrap().trim_end(), "echo two");
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_clipboard_shows_failed() {
        LocalSet::new()
            .run_until(async {
                let root = root();
                let controls = installer(Rc::new(MemoryClipboard::denied())).install(&root);

                assert_eq!(controls[0].activate().await, CopyOutcome::Failed);
                assert_eq!(controls[0].label(), FAILED_LABEL);

                tokio::time::sleep(Duration::from_millis(1201)).await;
                assert_eq!(controls[0].label(), COPY_LABEL);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_clicks_restart_timer() {
        LocalSet::new()
            .run_until(async {
                let root = root();
                let controls = installer(Rc::new(MemoryClipboard::default())).install(&root);

                controls[0].activate().await;
                tokio::time::sleep(Duration::from_millis(1000)).await;
                controls[0].activate().await;

                // The first click's timer has expired, but a newer click owns the label
                tokio::time::sleep(Duration::from_millis(500)).await;
                assert_eq!(controls[0].label(), COPIED_LABEL);

                tokio::time::sleep(Duration::from_millis(1000)).await;
                assert_eq!(controls[0].label(), COPY_LABEL);
            })
            .await;
    }

    #[tokio::test]
    async fn test_block_without_code_is_noop() {
        let document = kuchikikiki::parse_html().one("<pre>plain</pre>");
        let controls = installer(Rc::new(MemoryClipboard::default())).install(&document);

        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].activate().await, CopyOutcome::Empty);
        assert_eq!(controls[0].label(), COPY_LABEL);
    }

    #[test]
    fn test_splice_without_code_fails() {
        let root = root();
        let code = dom::select_first(&root, "pre > code").unwrap();
        let block = code.parent().unwrap();

        let result = splice_highlighted(&block, &code, "<pre>no code</pre>");

        assert!(matches!(result, Err(HighlightError::MissingCode)));
        assert_eq!(code.text_contents(), "echo one");
        assert!(!dom::has_class(&block, HIGHLIGHTED_CLASS));
    }

    #[test]
    fn test_failing_block_does_not_stop_the_rest() {
        let root = root();

        highlight_pending(&root, |code, hint| {
            if code == "echo one" {
                return Err(HighlightError::Format(hint.unwrap_or("auto").to_string()));
            }
            Ok(format!(r#"<pre class="athl"><code><span class="x">{code}</span></code></pre>"#))
        });

        let blocks = dom::select_all(&root, "pre");
        assert!(!dom::has_class(&blocks[0], HIGHLIGHTED_CLASS));
        assert_eq!(blocks[0].text_contents(), "echo one");
        assert!(dom::has_class(&blocks[1], HIGHLIGHTED_CLASS));
        assert_eq!(dom::select_all(&blocks[1], "span.x").len(), 1);
        assert_eq!(blocks[1].text_contents(), "echo two");

        // Controls are attached whether or not a block was highlighted
        let controls = installer(Rc::new(MemoryClipboard::default())).install(&root);
        assert_eq!(controls.len(), 2);
    }

    #[test]
    fn test_language_class() {
        let document = kuchikikiki::parse_html().one(r#"<code class="x language-rust"></code>"#);
        let code = dom::select_first(&document, "code").unwrap();
        assert_eq!(language_class(&code).as_deref(), Some("rust"));
    }
}
