//! The document rendering pipeline.
//!
//! fetch -> markdown (highlighting per code block) -> sanitize -> insert
//! into the page -> copy controls -> table of contents.

use std::cell::Cell;

use tracing::{debug, info};

use super::copy::{Clipboard, CopyControl, CopyInstaller};
use super::fetch::{FetchError, SourceFetcher};
use super::markdown::MarkdownRenderer;
use super::sanitize::Sanitizer;
use super::toc::{HeadingEntry, TocBuilder};
use crate::page::{Page, dom};

/// Sanitized HTML for one markdown source. Regenerated on every load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub html: String,
}

/// What a document looks like once it is in the page.
pub struct RenderedView<C> {
    pub toc: Vec<HeadingEntry>,
    pub controls: Vec<CopyControl<C>>,
}

pub enum RenderOutcome<C> {
    Rendered(RenderedView<C>),
    /// The fetch failed; the page shows the error in place of the document.
    Failed(FetchError),
    /// A newer load started while this one was fetching. The page was not
    /// touched.
    Superseded,
}

pub struct DocumentRenderer<C> {
    markdown: MarkdownRenderer,
    sanitizer: Sanitizer,
    fetcher: SourceFetcher,
    installer: CopyInstaller<C>,
    toc: TocBuilder,
    /// Incremented by every load; only the latest load may touch the page.
    generation: Cell<u64>,
}

impl<C: Clipboard + 'static> DocumentRenderer<C> {
    pub fn new(markdown: MarkdownRenderer, fetcher: SourceFetcher, installer: CopyInstaller<C>) -> Self {
        Self {
            markdown,
            sanitizer: Sanitizer::new(),
            fetcher,
            installer,
            toc: TocBuilder::new(),
            generation: Cell::new(0),
        }
    }

    /// Convert markdown to sanitized HTML.
    pub fn render(&self, markdown: &str) -> RenderedDocument {
        let html = self.markdown.render_html(markdown);
        RenderedDocument {
            html: self.sanitizer.clean(&html),
        }
    }

    /// Fetch the document at `path` and render it into the page.
    pub async fn load_and_render(&self, page: &Page, path: &str) -> RenderOutcome<C> {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let fetched = self.fetcher.fetch(path).await;
        if self.generation.get() != generation {
            debug!(path, "discarding stale document load");
            return RenderOutcome::Superseded;
        }

        match fetched {
            Ok(markdown) => {
                let document = self.render(&markdown);
                let view = self.insert(page, &document);
                info!(path, headings = view.toc.len(), code_blocks = view.controls.len(), "rendered document");
                RenderOutcome::Rendered(view)
            }
            Err(e) => {
                page.show_message(&format!("Error loading project doc: {e}"));
                dom::clear_children(page.toc_list());
                RenderOutcome::Failed(e)
            }
        }
    }

    /// Replace the page content with a rendered document, then attach copy
    /// controls and rebuild the table of contents.
    pub fn insert(&self, page: &Page, document: &RenderedDocument) -> RenderedView<C> {
        dom::set_inner_html(page.content(), &document.html);
        dom::set_style(page.doc(), "min-width", "0");

        let controls = self.installer.install(page.content());
        let toc = self.toc.build(page.content(), page.toc_list());
        RenderedView { toc, controls }
    }
}
