//! Error types for catalog validation and page customization

use std::path::PathBuf;
use thiserror::Error;

use crate::anchors::Step;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, ModfixError>;

/// Errors that can occur while customizing module pages
#[derive(Debug, Error)]
pub enum ModfixError {
    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Module {module}: anchor for step '{step}' not found in template")]
    AnchorNotFound { module: u32, step: Step },

    #[error("Module {module}: anchor for step '{step}' found {count} times, expected 1")]
    AnchorNotUnique { module: u32, step: Step, count: usize },

    #[error("Module {number} is not in the catalog")]
    UnknownModule { number: u32 },

    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid template: {0}")]
    Template(String),

    #[error("Failed to render module {module}: {message}")]
    Render { module: u32, message: String },
}

/// Ways a module catalog can be inconsistent
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog has no modules")]
    Empty,

    #[error("first module must be 2, found {found}")]
    BadStart { found: u32 },

    #[error("module numbers must be contiguous: expected {expected}, found {found}")]
    Gap { expected: u32, found: u32 },

    #[error("module {number} is listed more than once")]
    Duplicate { number: u32 },

    #[error("module {number} has a blank {field}")]
    BlankField { number: u32, field: &'static str },

    #[error("module {number} expects previous title '{expected}', found '{found}'")]
    BrokenChain { number: u32, expected: String, found: String },

    #[error("failed to parse catalog: {0}")]
    Parse(String),
}
