//! The project documentation view.
//!
//! Resolves the `id` query parameter of the page location against the
//! registry, fills the page header and renders the project's document.

use reqwest::Url;
use tracing::info;

use crate::page::{self, Page, dom};
use crate::registry::{ProjectRecord, ProjectRegistry};
use crate::render::copy::Clipboard;
use crate::render::{DocumentRenderer, RenderOutcome};

/// Relative locations such as `project.html?id=mysh` resolve against this.
const LOCATION_BASE: &str = "http://localhost/";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ViewError {
    #[error("No project specified.")]
    MissingId,

    #[error("Project \"{0}\" not found.")]
    UnknownProject(String),

    #[error("Invalid page location \"{0}\".")]
    InvalidLocation(String),
}

/// The `id` query parameter of a page location, if present and non-empty.
pub fn project_id(location: &str) -> Result<Option<String>, ViewError> {
    let base = Url::parse(LOCATION_BASE).map_err(|_| ViewError::InvalidLocation(location.to_string()))?;
    let url = base
        .join(location)
        .map_err(|_| ViewError::InvalidLocation(location.to_string()))?;

    Ok(url
        .query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty()))
}

pub struct ProjectView<C> {
    registry: ProjectRegistry,
    renderer: DocumentRenderer<C>,
}

impl<C: Clipboard + 'static> ProjectView<C> {
    pub fn new(registry: ProjectRegistry, renderer: DocumentRenderer<C>) -> Self {
        Self { registry, renderer }
    }

    /// Find the project a page location refers to.
    pub fn resolve(&self, location: &str) -> Result<&ProjectRecord, ViewError> {
        let id = project_id(location)?.ok_or(ViewError::MissingId)?;
        self.registry
            .find(&id)
            .ok_or(ViewError::UnknownProject(id))
    }

    /// Open the project page for `location`.
    ///
    /// A missing or unknown id is reported inline in the content container
    /// and nothing is fetched.
    pub async fn open(&self, page: &Page, location: &str) -> Result<RenderOutcome<C>, ViewError> {
        let project = match self.resolve(location) {
            Ok(project) => project,
            Err(e) => {
                page.show_message(&e.to_string());
                return Err(e);
            }
        };

        fill_header(page, project);
        info!(id = %project.id, path = %project.md_path, "opening project");
        Ok(self.renderer.load_and_render(page, &project.md_path).await)
    }
}

fn fill_header(page: &Page, project: &ProjectRecord) {
    if let Some(title) = page.element(page::PROJECT_TITLE_ID) {
        dom::set_text(&title, &project.title);
    }
    if let Some(sub) = page.element(page::PROJECT_SUB_ID) {
        dom::set_text(&sub, &project.short);
    }
    if let Some(link) = page.element(page::REPO_LINK_ID) {
        dom::set_attr(&link, "href", &project.repo);
    }
    page.set_title(&project.title);
}
