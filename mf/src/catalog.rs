//! Module catalog
//!
//! The ordered table of per-module metadata that drives customization. The
//! template page itself is module 1 and is not in the table; its title and
//! theme are carried alongside so the first entry's back link can be checked.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CatalogError, ModfixError, Result};

/// Number of the template page every other page is derived from
pub const TEMPLATE_MODULE: u32 = 1;

/// Number the catalog must start at
pub const FIRST_DERIVED_MODULE: u32 = TEMPLATE_MODULE + 1;

/// Metadata for one derived module page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleDescriptor {
    pub number: u32,
    pub title: String,
    pub theme: String,
    /// Title of the preceding module, shown on the back link
    pub previous_title: String,
}

impl ModuleDescriptor {
    pub fn new(number: u32, title: &str, theme: &str, previous_title: &str) -> Self {
        Self {
            number,
            title: title.to_string(),
            theme: theme.to_string(),
            previous_title: previous_title.to_string(),
        }
    }
}

/// On-disk shape of a catalog file
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CatalogFile {
    first_title: String,
    first_theme: String,
    modules: Vec<ModuleDescriptor>,
}

/// Immutable, ascending table of module descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    first_title: String,
    first_theme: String,
    modules: BTreeMap<u32, ModuleDescriptor>,
}

impl Catalog {
    /// Build a catalog from descriptors. Duplicate numbers are rejected here;
    /// everything else is left to [`Catalog::validate`].
    pub fn new(
        first_title: impl Into<String>,
        first_theme: impl Into<String>,
        descriptors: impl IntoIterator<Item = ModuleDescriptor>,
    ) -> std::result::Result<Self, CatalogError> {
        let mut modules = BTreeMap::new();
        for descriptor in descriptors {
            let number = descriptor.number;
            if modules.insert(number, descriptor).is_some() {
                return Err(CatalogError::Duplicate { number });
            }
        }

        Ok(Self {
            first_title: first_title.into(),
            first_theme: first_theme.into(),
            modules,
        })
    }

    /// The coaching course table
    pub fn builtin() -> Self {
        let modules = [
            (2, "Rules & Player Positions", "rules", "Introduction to Coaching"),
            (3, "Violations", "violations", "Rules & Player Positions"),
            (4, "Fouls & Official Signals", "officiating", "Violations"),
            (5, "Basic Skills - Passing", "skills", "Fouls & Official Signals"),
            (6, "Basic Skills - Shooting", "shooting", "Basic Skills - Passing"),
            (7, "Basic Skills - Rebounding", "rebounding", "Basic Skills - Shooting"),
            (8, "Basic Skills - Dribbling", "dribbling", "Basic Skills - Rebounding"),
            (9, "Defense Fundamentals", "defense", "Basic Skills - Dribbling"),
            (10, "Offense Fundamentals", "offense", "Defense Fundamentals"),
            (11, "Training Design & Planning", "training", "Offense Fundamentals"),
            (12, "Risk Management & First Aid", "safety", "Training Design & Planning"),
        ];

        Self {
            first_title: "Introduction to Coaching".to_string(),
            first_theme: "leadership".to_string(),
            modules: modules
                .into_iter()
                .map(|(n, title, theme, prev)| (n, ModuleDescriptor::new(n, title, theme, prev)))
                .collect(),
        }
    }

    /// Parse a catalog from YAML
    pub fn from_yaml(content: &str) -> std::result::Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(file.first_title, file.first_theme, file.modules)
    }

    /// Load a catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(?path, "Catalog::load: called");
        let content = fs::read_to_string(path).map_err(|source| ModfixError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_yaml(&content)?)
    }

    /// Serialize back to the YAML file format
    pub fn to_yaml(&self) -> std::result::Result<String, CatalogError> {
        let file = CatalogFile {
            first_title: self.first_title.clone(),
            first_theme: self.first_theme.clone(),
            modules: self.modules.values().cloned().collect(),
        };
        serde_yaml::to_string(&file).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// Check key contiguity, required fields and the previous-title chain
    pub fn validate(&self) -> std::result::Result<(), CatalogError> {
        debug!(modules = self.modules.len(), "Catalog::validate: called");
        let first = self.first_number().ok_or(CatalogError::Empty)?;
        if first != FIRST_DERIVED_MODULE {
            return Err(CatalogError::BadStart { found: first });
        }

        let mut expected = first;
        let mut previous_title = self.first_title.as_str();
        for (&number, descriptor) in &self.modules {
            if number != expected {
                return Err(CatalogError::Gap { expected, found: number });
            }
            if descriptor.title.trim().is_empty() {
                return Err(CatalogError::BlankField { number, field: "title" });
            }
            if descriptor.theme.trim().is_empty() {
                return Err(CatalogError::BlankField { number, field: "theme" });
            }
            if descriptor.previous_title != previous_title {
                return Err(CatalogError::BrokenChain {
                    number,
                    expected: previous_title.to_string(),
                    found: descriptor.previous_title.clone(),
                });
            }
            previous_title = &descriptor.title;
            expected += 1;
        }

        Ok(())
    }

    pub fn get(&self, number: u32) -> Option<&ModuleDescriptor> {
        self.modules.get(&number)
    }

    /// Descriptor following `number`, if any
    pub fn next(&self, number: u32) -> Option<&ModuleDescriptor> {
        self.modules.range(number + 1..).next().map(|(_, d)| d)
    }

    pub fn first_number(&self) -> Option<u32> {
        self.modules.keys().next().copied()
    }

    pub fn last_number(&self) -> Option<u32> {
        self.modules.keys().next_back().copied()
    }

    pub fn is_last(&self, number: u32) -> bool {
        self.last_number() == Some(number)
    }

    /// Descriptors in ascending module order
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Title of the template page (module 1)
    pub fn first_title(&self) -> &str {
        &self.first_title
    }

    /// Theme of the template page (module 1)
    pub fn first_theme(&self) -> &str {
        &self.first_theme
    }

    /// Title the template's forward link shows, i.e. the first entry's title
    pub fn template_next_title(&self) -> Option<&str> {
        self.modules.values().next().map(|d| d.title.as_str())
    }
}
