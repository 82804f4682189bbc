//! Template mode
//!
//! Renders module pages from a module-1 page authored with named slots
//! (`{{title}}`, `{{number}}`, `{{previous_title}}`, ...) instead of literal
//! anchors. Rendering runs in strict mode, so a misspelled or unknown slot is
//! an error rather than an empty string.
//!
//! JSX expression braces next to a slot collide with Handlebars' triple-stash,
//! so `{{braced number}}` renders `{6}`.

use std::fs;
use std::path::{Path, PathBuf};

use handlebars::{Handlebars, handlebars_helper};
use serde::Serialize;
use tracing::{debug, info};

use crate::anchors::{TemplateAnchors, description_for};
use crate::catalog::{Catalog, ModuleDescriptor, TEMPLATE_MODULE};
use crate::customizer::{BatchSummary, Outcome};
use crate::error::{ModfixError, Result};

const PAGE: &str = "page";

handlebars_helper!(braced: |v: Json| format!("{{{}}}", v));

/// Slots available to a page template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContext {
    pub number: u32,
    pub title: String,
    pub title_lower: String,
    pub theme: String,
    pub description: String,
    pub previous_number: u32,
    pub previous_title: String,
    pub next_number: Option<u32>,
    pub next_title: Option<String>,
    pub is_first: bool,
    pub is_last: bool,
    pub brand: String,
}

impl PageContext {
    pub fn new(descriptor: &ModuleDescriptor, catalog: &Catalog, anchors: &TemplateAnchors) -> Self {
        let next = catalog.next(descriptor.number);
        Self {
            number: descriptor.number,
            title: descriptor.title.clone(),
            title_lower: descriptor.title.to_lowercase(),
            theme: descriptor.theme.clone(),
            description: description_for(&descriptor.title),
            previous_number: descriptor.number.saturating_sub(1).max(TEMPLATE_MODULE),
            previous_title: descriptor.previous_title.clone(),
            next_number: next.map(|d| d.number),
            next_title: next.map(|d| d.title.clone()),
            is_first: catalog.first_number() == Some(descriptor.number),
            is_last: next.is_none(),
            brand: anchors.brand.clone(),
        }
    }
}

/// Compiled page template
pub struct PageRenderer {
    hbs: Handlebars<'static>,
}

impl PageRenderer {
    /// Compile `template`; syntax errors are reported here
    pub fn new(template: &str) -> Result<Self> {
        debug!(template_len = template.len(), "PageRenderer::new: called");
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(handlebars::no_escape);
        hbs.register_helper("braced", Box::new(braced));
        hbs.register_template_string(PAGE, template)
            .map_err(|e| ModfixError::Template(e.to_string()))?;
        Ok(Self { hbs })
    }

    /// Load and compile a template file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let template = fs::read_to_string(path).map_err(|source| ModfixError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(&template)
    }

    pub fn render(&self, context: &PageContext) -> Result<String> {
        debug!(number = context.number, "PageRenderer::render: called");
        self.hbs.render(PAGE, context).map_err(|e| ModfixError::Render {
            module: context.number,
            message: e.to_string(),
        })
    }

    /// Render every module page (or only `only`) and write each atomically
    ///
    /// The catalog is validated first; the first failure stops the batch.
    pub fn render_all<P, F>(
        &self,
        catalog: &Catalog,
        anchors: &TemplateAnchors,
        only: Option<u32>,
        dry_run: bool,
        page_path: P,
        mut on_module: F,
    ) -> Result<BatchSummary>
    where
        P: Fn(u32) -> PathBuf,
        F: FnMut(&Outcome),
    {
        debug!(?only, dry_run, "PageRenderer::render_all: called");
        catalog.validate()?;
        if let Some(number) = only
            && catalog.get(number).is_none()
        {
            return Err(ModfixError::UnknownModule { number });
        }

        let mut summary = BatchSummary::default();
        for descriptor in catalog.iter() {
            if only.is_some_and(|n| n != descriptor.number) {
                continue;
            }
            let path = page_path(descriptor.number);
            let page = self.render(&PageContext::new(descriptor, catalog, anchors))?;
            let changed = fs::read_to_string(&path).map(|old| old != page).unwrap_or(true);

            if !dry_run {
                crate::writer::write_atomic(&path, &page)?;
            }
            info!(number = descriptor.number, changed, "Rendered module page");

            let outcome = Outcome {
                number: descriptor.number,
                title: descriptor.title.clone(),
                path,
                reports: Vec::new(),
                changed,
                written: !dry_run,
            };
            on_module(&outcome);
            summary.outcomes.push(outcome);
        }

        Ok(summary)
    }
}
