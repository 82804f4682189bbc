//! Batch customization of module pages in anchor mode

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::anchors::{self, LinkScope, Mode, StepReport, TemplateAnchors};
use crate::catalog::{Catalog, ModuleDescriptor};
use crate::error::{ModfixError, Result};

/// Outcome for one module page
#[derive(Debug, Clone)]
pub struct Outcome {
    pub number: u32,
    pub title: String,
    pub path: PathBuf,
    pub reports: Vec<StepReport>,
    /// Whether the customized text differs from what was read
    pub changed: bool,
    /// Whether the file was written (false on dry runs)
    pub written: bool,
}

impl Outcome {
    pub fn all_satisfied(&self) -> bool {
        self.reports.iter().all(|r| r.satisfied)
    }
}

/// Outcomes for every processed module, in ascending order
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<Outcome>,
}

impl BatchSummary {
    pub fn written(&self) -> usize {
        self.outcomes.iter().filter(|o| o.written).count()
    }

    pub fn all_satisfied(&self) -> bool {
        self.outcomes.iter().all(Outcome::all_satisfied)
    }
}

/// Applies the anchor plan to module pages
pub struct Customizer<'a> {
    catalog: &'a Catalog,
    anchors: &'a TemplateAnchors,
    scope: LinkScope,
    mode: Mode,
    dry_run: bool,
}

impl<'a> Customizer<'a> {
    pub fn new(catalog: &'a Catalog, anchors: &'a TemplateAnchors) -> Self {
        Self {
            catalog,
            anchors,
            scope: LinkScope::default(),
            mode: Mode::default(),
            dry_run: false,
        }
    }

    pub fn scope(mut self, scope: LinkScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Customize the page at `path` for `descriptor`
    ///
    /// The file is only rewritten once every step has passed (in strict mode),
    /// and then atomically.
    pub fn customize(&self, descriptor: &ModuleDescriptor, path: &Path) -> Result<Outcome> {
        debug!(number = descriptor.number, ?path, "Customizer::customize: called");
        let original = fs::read_to_string(path).map_err(|source| ModfixError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let steps = anchors::plan(descriptor, self.catalog, self.anchors, self.scope);
        let customized = anchors::apply(descriptor.number, &original, &steps, self.mode)?;
        let changed = customized.content != original;

        let written = if self.dry_run {
            debug!(number = descriptor.number, "Customizer::customize: dry run, not writing");
            false
        } else {
            crate::writer::write_atomic(path, &customized.content)?;
            true
        };

        info!(number = descriptor.number, changed, written, "Customized module page");
        Ok(Outcome {
            number: descriptor.number,
            title: descriptor.title.clone(),
            path: path.to_path_buf(),
            reports: customized.reports,
            changed,
            written,
        })
    }

    /// Customize every module in ascending order, or only `only`
    ///
    /// The catalog is validated first. `page_path` maps a module number to its
    /// file. `on_module` is called after each module completes. The first
    /// error stops the batch; modules already written stay written.
    pub fn run<P, F>(&self, only: Option<u32>, page_path: P, mut on_module: F) -> Result<BatchSummary>
    where
        P: Fn(u32) -> PathBuf,
        F: FnMut(&Outcome),
    {
        debug!(?only, "Customizer::run: called");
        self.catalog.validate()?;

        if let Some(number) = only
            && self.catalog.get(number).is_none()
        {
            return Err(ModfixError::UnknownModule { number });
        }

        let mut summary = BatchSummary::default();
        for descriptor in self.catalog.iter() {
            if only.is_some_and(|n| n != descriptor.number) {
                continue;
            }
            let outcome = self.customize(descriptor, &page_path(descriptor.number))?;
            on_module(&outcome);
            summary.outcomes.push(outcome);
        }

        info!(modules = summary.outcomes.len(), written = summary.written(), "Batch complete");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::Step;
    use crate::anchors::tests::template_page;
    use tempfile::TempDir;

    fn seed(dir: &Path, catalog: &Catalog) {
        for d in catalog.iter() {
            fs::write(dir.join(format!("m{}.js", d.number)), template_page()).unwrap();
        }
    }

    #[test]
    fn test_run_writes_every_module() {
        let temp = TempDir::new().unwrap();
        let catalog = Catalog::builtin();
        let anchors = TemplateAnchors::default();
        seed(temp.path(), &catalog);

        let mut seen = Vec::new();
        let summary = Customizer::new(&catalog, &anchors)
            .run(None, |n| temp.path().join(format!("m{}.js", n)), |o| seen.push(o.number))
            .unwrap();

        assert_eq!(seen, (2..=12).collect::<Vec<_>>());
        assert_eq!(summary.written(), 11);
        assert!(summary.all_satisfied());

        let six = fs::read_to_string(temp.path().join("m6.js")).unwrap();
        assert!(six.contains("export default function Module6()"));
        assert!(six.contains(r#"moduleNumber={6} moduleName="Basic Skills - Shooting" theme="shooting""#));
        assert!(six.contains("Basic Skills - Passing"));
    }

    #[test]
    fn test_run_single_module() {
        let temp = TempDir::new().unwrap();
        let catalog = Catalog::builtin();
        let anchors = TemplateAnchors::default();
        fs::write(temp.path().join("m9.js"), template_page()).unwrap();

        let summary = Customizer::new(&catalog, &anchors)
            .run(Some(9), |n| temp.path().join(format!("m{}.js", n)), |_| {})
            .unwrap();

        assert_eq!(summary.outcomes.len(), 1);
        assert_eq!(summary.outcomes[0].number, 9);
    }

    #[test]
    fn test_run_unknown_module() {
        let temp = TempDir::new().unwrap();
        let catalog = Catalog::builtin();
        let anchors = TemplateAnchors::default();

        let err = Customizer::new(&catalog, &anchors)
            .run(Some(13), |n| temp.path().join(format!("m{}.js", n)), |_| {})
            .unwrap_err();
        assert!(matches!(err, ModfixError::UnknownModule { number: 13 }));
    }

    #[test]
    fn test_missing_file_aborts_remaining_modules() {
        let temp = TempDir::new().unwrap();
        let catalog = Catalog::builtin();
        let anchors = TemplateAnchors::default();
        seed(temp.path(), &catalog);
        fs::remove_file(temp.path().join("m5.js")).unwrap();

        let mut seen = Vec::new();
        let err = Customizer::new(&catalog, &anchors)
            .run(None, |n| temp.path().join(format!("m{}.js", n)), |o| seen.push(o.number))
            .unwrap_err();

        assert!(matches!(err, ModfixError::Read { .. }));
        assert_eq!(seen, vec![2, 3, 4]);
        // later modules are untouched
        assert_eq!(fs::read_to_string(temp.path().join("m6.js")).unwrap(), template_page());
    }

    #[test]
    fn test_strict_mismatch_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let catalog = Catalog::builtin();
        let anchors = TemplateAnchors::default();
        let path = temp.path().join("m7.js");
        let drifted = template_page().replace("useProgress(user?.sub, 1)", "useProgress(user?.id, 1)");
        fs::write(&path, &drifted).unwrap();

        let err = Customizer::new(&catalog, &anchors)
            .customize(catalog.get(7).unwrap(), &path)
            .unwrap_err();

        assert!(matches!(
            err,
            ModfixError::AnchorNotFound {
                module: 7,
                step: Step::ProgressHook
            }
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), drifted);
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let temp = TempDir::new().unwrap();
        let catalog = Catalog::builtin();
        let anchors = TemplateAnchors::default();
        let path = temp.path().join("m2.js");
        fs::write(&path, template_page()).unwrap();

        let outcome = Customizer::new(&catalog, &anchors)
            .dry_run(true)
            .customize(catalog.get(2).unwrap(), &path)
            .unwrap();

        assert!(outcome.changed);
        assert!(!outcome.written);
        assert_eq!(fs::read_to_string(&path).unwrap(), template_page());
    }

    #[test]
    fn test_second_run_strict_refuses_lenient_skips() {
        let temp = TempDir::new().unwrap();
        let catalog = Catalog::builtin();
        let anchors = TemplateAnchors::default();
        let path = temp.path().join("m8.js");
        fs::write(&path, template_page()).unwrap();
        let descriptor = catalog.get(8).unwrap();

        Customizer::new(&catalog, &anchors).customize(descriptor, &path).unwrap();
        let after_first = fs::read_to_string(&path).unwrap();

        assert!(Customizer::new(&catalog, &anchors).customize(descriptor, &path).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);

        let outcome = Customizer::new(&catalog, &anchors)
            .mode(Mode::Lenient)
            .customize(descriptor, &path)
            .unwrap();
        assert!(!outcome.changed);
        assert!(!outcome.all_satisfied());
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
    }

    #[test]
    fn test_invalid_catalog_rejected_before_any_write() {
        let temp = TempDir::new().unwrap();
        let catalog = Catalog::new(
            "Intro",
            "lead",
            vec![
                ModuleDescriptor::new(2, "Two", "t", "Intro"),
                ModuleDescriptor::new(3, "Three", "t", "Not Two"),
            ],
        )
        .unwrap();
        let anchors = TemplateAnchors::default();
        fs::write(temp.path().join("m2.js"), template_page()).unwrap();

        let err = Customizer::new(&catalog, &anchors)
            .run(None, |n| temp.path().join(format!("m{}.js", n)), |_| {})
            .unwrap_err();

        assert!(matches!(err, ModfixError::Catalog(_)));
        assert_eq!(fs::read_to_string(temp.path().join("m2.js")).unwrap(), template_page());
    }
}
