//! Anchor-based customization
//!
//! Derives a module page from a copy of the module-1 page by replacing exact
//! literal anchors, in a fixed order. Each step counts its matches so a
//! template that drifted from the expected text is reported instead of being
//! written out half-customized.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{Catalog, ModuleDescriptor, TEMPLATE_MODULE};
use crate::error::{ModfixError, Result};

const NO_PREVIOUS: &str = r#"<p className="text-gray-400">None - This is the first module</p>"#;
const NO_NEXT: &str = r#"<p className="text-gray-400">None - This is the final module</p>"#;
const WELCOME_TAIL: &str = "This foundational module will introduce you to the";
const WELCOME_TAIL_DERIVED: &str = "This module will teach you";

/// One customization step, in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    ComponentName,
    ProgressHook,
    LayoutTag,
    PageTitle,
    MetaDescription,
    Welcome,
    PreviousLink,
    NextLink,
    FinalLink,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ComponentName => "component-name",
            Self::ProgressHook => "progress-hook",
            Self::LayoutTag => "layout-tag",
            Self::PageTitle => "page-title",
            Self::MetaDescription => "meta-description",
            Self::Welcome => "welcome",
            Self::PreviousLink => "previous-link",
            Self::NextLink => "next-link",
            Self::FinalLink => "final-link",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How many times an anchor must match for the step to count as applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Once,
    AtLeastOnce,
}

/// What to do when an anchor does not match as expected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Fail the module and leave its file untouched
    #[default]
    Strict,
    /// Log a warning and carry on
    Lenient,
}

/// How the forward link is rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LinkScope {
    /// Replace the template's whole forward-link block, href included
    #[default]
    Block,
    /// Replace every occurrence of the template's next-module title
    Global,
}

/// Literal pieces of the module-1 page that vary between deployments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TemplateAnchors {
    /// Site name in the page title
    pub brand: String,

    /// className on navigation links
    pub link_class: String,

    /// Identity expression passed to the progress hook
    pub user_expr: String,

    /// Meta description of the module-1 page
    pub description: String,
}

impl Default for TemplateAnchors {
    fn default() -> Self {
        Self {
            brand: "CBL_maikosh".to_string(),
            link_class: "text-basketball-orange hover:text-basketball-orange font-medium inline-flex items-center"
                .to_string(),
            user_expr: "user?.sub".to_string(),
            description: "Learn the fundamental roles, styles, and philosophies of effective basketball coaching."
                .to_string(),
        }
    }
}

impl TemplateAnchors {
    fn component_name(&self, number: u32) -> String {
        format!("export default function Module{}()", number)
    }

    fn progress_hook(&self, number: u32) -> String {
        format!("useProgress({}, {})", self.user_expr, number)
    }

    fn layout_tag(&self, number: u32, title: &str, theme: &str) -> String {
        format!(
            r#"<ModuleLayout moduleNumber={{{}}} moduleName="{}" theme="{}">"#,
            number, title, theme
        )
    }

    fn page_title(&self, number: u32, title: &str) -> String {
        format!("<title>Module {}: {} | {}</title>", number, title, self.brand)
    }

    fn welcome(&self, number: u32, title: &str, tail: &str) -> String {
        format!("Welcome to Module {}: {}! {}", number, title, tail)
    }

    /// Back link as it appears once a page has a predecessor
    pub fn previous_link(&self, number: u32, title: &str) -> String {
        [
            "<a ".to_string(),
            format!(r#"              href="/modules/m{}" "#, number),
            format!(r#"              className="{}""#, self.link_class),
            "            >".to_string(),
            r#"              <svg className="w-4 h-4 mr-1" fill="none" stroke="currentColor" viewBox="0 0 24 24">"#
                .to_string(),
            r#"                <path strokeLinecap="round" strokeLinejoin="round" strokeWidth="2" d="M15 19l-7-7 7-7" />"#
                .to_string(),
            "              </svg>".to_string(),
            format!("              {}", title),
            "            </a>".to_string(),
        ]
        .join("\n")
    }

    /// Forward link block pointing at `number`
    pub fn next_link(&self, number: u32, title: &str) -> String {
        [
            "<a ".to_string(),
            format!(r#"            href="/modules/m{}" "#, number),
            format!(r#"            className="{}""#, self.link_class),
            "          >".to_string(),
            format!("            {}", title),
            r#"            <svg className="w-4 h-4 ml-1" fill="none" stroke="currentColor" viewBox="0 0 24 24">"#
                .to_string(),
            r#"              <path strokeLinecap="round" strokeLinejoin="round" strokeWidth="2" d="M9 5l7 7-7 7" />"#
                .to_string(),
            "            </svg>".to_string(),
            "          </a>".to_string(),
        ]
        .join("\n")
    }
}

/// Generated meta description for a module
pub fn description_for(title: &str) -> String {
    format!("Master {} - essential knowledge for basketball coaches.", title.to_lowercase())
}

/// A single literal replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub step: Step,
    pub from: String,
    pub to: String,
    pub expect: Expect,
}

impl Substitution {
    fn new(step: Step, from: String, to: String, expect: Expect) -> Self {
        Self { step, from, to, expect }
    }
}

/// Match count observed for one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub matches: usize,
    /// Whether the match count met the step's expectation
    pub satisfied: bool,
}

/// Result of applying a plan to one page
#[derive(Debug, Clone)]
pub struct Customized {
    pub content: String,
    pub reports: Vec<StepReport>,
}

impl Customized {
    pub fn all_satisfied(&self) -> bool {
        self.reports.iter().all(|r| r.satisfied)
    }
}

/// Build the ordered substitutions that turn the module-1 page into `descriptor`'s page
pub fn plan(
    descriptor: &ModuleDescriptor,
    catalog: &Catalog,
    anchors: &TemplateAnchors,
    scope: LinkScope,
) -> Vec<Substitution> {
    debug!(number = descriptor.number, ?scope, "plan: called");
    let n = descriptor.number;
    let first_title = catalog.first_title();
    let template_next = catalog.template_next_title().unwrap_or(descriptor.title.as_str());

    let mut steps = vec![
        Substitution::new(
            Step::ComponentName,
            anchors.component_name(TEMPLATE_MODULE),
            anchors.component_name(n),
            Expect::Once,
        ),
        Substitution::new(
            Step::ProgressHook,
            anchors.progress_hook(TEMPLATE_MODULE),
            anchors.progress_hook(n),
            Expect::Once,
        ),
        Substitution::new(
            Step::LayoutTag,
            anchors.layout_tag(TEMPLATE_MODULE, first_title, catalog.first_theme()),
            anchors.layout_tag(n, &descriptor.title, &descriptor.theme),
            Expect::Once,
        ),
        Substitution::new(
            Step::PageTitle,
            anchors.page_title(TEMPLATE_MODULE, first_title),
            anchors.page_title(n, &descriptor.title),
            Expect::Once,
        ),
        Substitution::new(
            Step::MetaDescription,
            format!(r#"content="{}""#, anchors.description),
            format!(r#"content="{}""#, description_for(&descriptor.title)),
            Expect::AtLeastOnce,
        ),
        Substitution::new(
            Step::Welcome,
            anchors.welcome(TEMPLATE_MODULE, first_title, WELCOME_TAIL),
            anchors.welcome(n, &descriptor.title, WELCOME_TAIL_DERIVED),
            Expect::Once,
        ),
    ];

    if n > TEMPLATE_MODULE {
        steps.push(Substitution::new(
            Step::PreviousLink,
            NO_PREVIOUS.to_string(),
            anchors.previous_link(n - 1, &descriptor.previous_title),
            Expect::Once,
        ));
    }

    let template_link = anchors.next_link(TEMPLATE_MODULE + 1, template_next);
    match (catalog.next(n), scope) {
        (Some(next), LinkScope::Block) => steps.push(Substitution::new(
            Step::NextLink,
            template_link,
            anchors.next_link(next.number, &next.title),
            Expect::Once,
        )),
        (Some(next), LinkScope::Global) => steps.push(Substitution::new(
            Step::NextLink,
            template_next.to_string(),
            next.title.clone(),
            Expect::AtLeastOnce,
        )),
        (None, LinkScope::Block) => steps.push(Substitution::new(
            Step::FinalLink,
            template_link,
            NO_NEXT.to_string(),
            Expect::Once,
        )),
        (None, LinkScope::Global) => steps.push(Substitution::new(
            Step::FinalLink,
            anchors.next_link(n + 1, template_next),
            NO_NEXT.to_string(),
            Expect::Once,
        )),
    }

    steps
}

/// Apply `plan` to `content` in order
pub fn apply(module: u32, content: &str, plan: &[Substitution], mode: Mode) -> Result<Customized> {
    debug!(module, steps = plan.len(), ?mode, "apply: called");
    let mut content = content.to_string();
    let mut reports = Vec::with_capacity(plan.len());

    for sub in plan {
        let matches = if sub.from.is_empty() {
            0
        } else {
            content.matches(sub.from.as_str()).count()
        };
        let satisfied = match sub.expect {
            Expect::Once => matches == 1,
            Expect::AtLeastOnce => matches >= 1,
        };
        debug!(module, step = %sub.step, matches, satisfied, "apply: step counted");

        if !satisfied {
            match (mode, matches) {
                (Mode::Strict, 0) => return Err(ModfixError::AnchorNotFound { module, step: sub.step }),
                (Mode::Strict, count) => {
                    return Err(ModfixError::AnchorNotUnique {
                        module,
                        step: sub.step,
                        count,
                    });
                }
                (Mode::Lenient, 0) => warn!(module, step = %sub.step, "Anchor not found, step skipped"),
                (Mode::Lenient, count) => warn!(module, step = %sub.step, count, "Anchor matched more than once"),
            }
        }

        if matches > 0 {
            content = content.replace(sub.from.as_str(), &sub.to);
        }
        reports.push(StepReport {
            step: sub.step,
            matches,
            satisfied,
        });
    }

    Ok(Customized { content, reports })
}
