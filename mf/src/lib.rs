//! modfix - derive a series of course module pages from the module-1 page
//!
//! Two ways to get from one page to eleven:
//!
//! - **anchor mode** ([`Customizer`]): copies of the module-1 page are edited
//!   in place by replacing exact literal anchors in a fixed order. Each step
//!   counts its matches, and a drifted template is reported rather than
//!   silently written half-customized.
//! - **template mode** ([`PageRenderer`]): a module-1 page authored with named
//!   slots is rendered once per catalog entry.
//!
//! Both are driven by a validated [`Catalog`] and write pages atomically.
//!
//! # Example
//!
//! ```ignore
//! use modfix::{Catalog, Customizer, TemplateAnchors};
//!
//! let catalog = Catalog::builtin();
//! let anchors = TemplateAnchors::default();
//! let summary = Customizer::new(&catalog, &anchors)
//!     .run(None, |n| format!("src/pages/modules/m{}.js", n).into(), |_| {})?;
//! ```

pub mod anchors;
pub mod catalog;
pub mod cli;
pub mod config;
mod customizer;
pub mod error;
mod render;
mod writer;

pub use anchors::{LinkScope, Mode, Step, StepReport, TemplateAnchors};
pub use catalog::{Catalog, ModuleDescriptor};
pub use customizer::{BatchSummary, Customizer, Outcome};
pub use error::{CatalogError, ModfixError};
pub use render::{PageContext, PageRenderer};
pub use writer::write_atomic;
