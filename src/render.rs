pub mod copy;
mod document;
pub mod fetch;
mod highlight;
mod markdown;
mod sanitize;
pub mod toc;

pub use document::{DocumentRenderer, RenderOutcome, RenderedView};
pub use highlight::SyntaxHighlighter;
pub use markdown::MarkdownRenderer;
