//! Member exclusion for module capabilities.

use std::collections::{BTreeSet, HashSet};

use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Which module members are hidden from remote callers.
///
/// Each field falls back to its own default when omitted, so setting
/// `exclude_prefix` alone keeps the default `exclude_exact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionOptions {
    /// Member names excluded by exact match.
    #[serde(default = "default_exclude_exact")]
    pub exclude_exact: BTreeSet<String>,

    /// Member names excluded when they start with any of these.
    #[serde(default = "default_exclude_prefix")]
    pub exclude_prefix: BTreeSet<String>,

    /// Regular expressions; a member matching any of them is excluded.
    #[serde(default)]
    pub exclude_pattern: Vec<String>,
}

fn default_exclude_exact() -> BTreeSet<String> {
    BTreeSet::from(["constructor".to_string()])
}

fn default_exclude_prefix() -> BTreeSet<String> {
    BTreeSet::from(["_".to_string()])
}

impl Default for ExclusionOptions {
    fn default() -> Self {
        Self {
            exclude_exact: default_exclude_exact(),
            exclude_prefix: default_exclude_prefix(),
            exclude_pattern: Vec::new(),
        }
    }
}

impl ExclusionOptions {
    /// Expose every member.
    pub fn none() -> Self {
        Self {
            exclude_exact: BTreeSet::new(),
            exclude_prefix: BTreeSet::new(),
            exclude_pattern: Vec::new(),
        }
    }

    /// Check that every pattern compiles.
    pub fn validate(&self) -> Result<()> {
        RegexSet::new(&self.exclude_pattern)?;
        Ok(())
    }

    /// Drop excluded and duplicate names, keeping the original order.
    pub fn filter(&self, members: impl IntoIterator<Item = String>) -> Result<Vec<String>> {
        let patterns = RegexSet::new(&self.exclude_pattern)?;
        let mut seen = HashSet::new();

        Ok(members
            .into_iter()
            .filter(|member| !self.exclude_exact.contains(member))
            .filter(|member| !self.exclude_prefix.iter().any(|p| member.starts_with(p.as_str())))
            .filter(|member| !patterns.is_match(member))
            .filter(|member| seen.insert(member.clone()))
            .collect())
    }
}
