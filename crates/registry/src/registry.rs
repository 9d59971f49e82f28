//! Capability storage and version resolution.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use protocol::{DescriptorSet, METADATA_API_NAME, METADATA_MEMBER, Value};
use semver::Version;
use tracing::{debug, info, warn};

use crate::capability::{Artifact, Capability};
use crate::config::RegistryConfig;
use crate::exclusion::ExclusionOptions;
use crate::metadata::MetadataModule;
use crate::module::Module;
use crate::range::Range;
use crate::{Error, Result};

/// Name -> exact version -> capability.
pub(crate) type Entries = HashMap<String, BTreeMap<Version, Arc<Capability>>>;

/// Every capability a process exposes, across all versions.
///
/// A fresh registry already holds the self-description capability under
/// [`METADATA_API_NAME`], registered at the default version.
pub struct Registry {
    entries: Arc<RwLock<Entries>>,
    default_version: Version,
    exclusions: ExclusionOptions,
}

impl Registry {
    /// Create a registry whose requests without a version resolve to exactly
    /// `default_version`.
    pub fn new(default_version: Version) -> Self {
        let entries = Arc::new(RwLock::new(Entries::new()));

        let metadata = Capability {
            name: METADATA_API_NAME.to_string(),
            version: default_version.clone(),
            artifact: Artifact::Module(Arc::new(MetadataModule::new(Arc::downgrade(&entries)))),
            member_names: vec![METADATA_MEMBER.to_string()],
        };

        let registry = Self {
            entries,
            default_version,
            exclusions: ExclusionOptions::default(),
        };
        registry.add(metadata);
        registry
    }

    /// Create a registry from config.
    pub fn with_config(config: RegistryConfig) -> Result<Self> {
        config.exclusions.validate()?;

        let mut registry = Self::new(config.default_version);
        registry.exclusions = config.exclusions;
        Ok(registry)
    }

    pub fn default_version(&self) -> &Version {
        &self.default_version
    }

    /// Exclusions applied by [`add_module`](Self::add_module) when none are given.
    pub fn exclusions(&self) -> &ExclusionOptions {
        &self.exclusions
    }

    /// Store a capability, replacing any previous one with the same name and version.
    pub fn add(&self, capability: Capability) {
        let name = capability.name.clone();
        let version = capability.version.clone();

        if name == METADATA_API_NAME && version != self.default_version {
            warn!("capability registered under reserved name {METADATA_API_NAME}@{version}");
        }

        let replaced = {
            let mut entries = self.entries.write();
            entries
                .entry(name.clone())
                .or_default()
                .insert(version.clone(), Arc::new(capability))
                .is_some()
        };

        if replaced {
            debug!("replaced capability {name}@{version}");
        } else {
            info!("added capability {name}@{version}");
        }
    }

    pub fn add_function<F>(&self, name: impl Into<String>, version: &str, function: F) -> Result<()>
    where
        F: Fn(Vec<Value>, protocol::Reply) + Send + Sync + 'static,
    {
        self.add(Capability::function(name, version, function)?);
        Ok(())
    }

    /// Add a module. Members are filtered through `exclusions`, or the
    /// registry's configured exclusions when `None`.
    pub fn add_module<M>(
        &self,
        name: impl Into<String>,
        version: &str,
        module: M,
        exclusions: Option<&ExclusionOptions>,
    ) -> Result<()>
    where
        M: Module + 'static,
    {
        let exclusions = exclusions.unwrap_or(&self.exclusions);
        self.add(Capability::module(name, version, Arc::new(module), exclusions)?);
        Ok(())
    }

    pub fn add_constant(&self, name: impl Into<String>, version: &str, value: Value) -> Result<()> {
        self.add(Capability::constant(name, version, value)?);
        Ok(())
    }

    /// Resolve `name` to the highest stored version satisfying `range`.
    ///
    /// Without a range only the registry's default version matches.
    pub fn get(&self, name: &str, range: Option<&str>) -> Result<Arc<Capability>> {
        let (req, range) = match range {
            Some(range) => (Range::parse(range)?, range.to_string()),
            None => (Range::exact(&self.default_version), format!("={}", self.default_version)),
        };

        let entries = self.entries.read();
        let versions = entries
            .get(name)
            .filter(|versions| !versions.is_empty())
            .ok_or_else(|| Error::UnknownCapability(name.to_string()))?;

        let best = best_version(versions.keys(), &req).ok_or_else(|| {
            debug!("no version of {name} satisfies {range}");
            Error::NoMatchingVersion {
                name: name.to_string(),
                range: range.clone(),
            }
        })?;

        debug!("{name}@{best} best satisfies {range}");
        versions
            .get(best)
            .cloned()
            .ok_or_else(|| Error::NoMatchingVersion {
                name: name.to_string(),
                range,
            })
    }

    /// Like [`get`](Self::get), returning only the artifact.
    pub fn get_artifact(&self, name: &str, range: Option<&str>) -> Result<Artifact> {
        Ok(self.get(name, range)?.artifact.clone())
    }

    /// All registered names, including the reserved one, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Stored versions of `name`, ascending.
    pub fn versions(&self, name: &str) -> Vec<Version> {
        self.entries
            .read()
            .get(name)
            .map(|versions| versions.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Descriptor of the newest version of every user capability.
    pub fn descriptors(&self) -> DescriptorSet {
        describe(&self.entries.read())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .field("default_version", &self.default_version)
            .finish_non_exhaustive()
    }
}

/// Descriptor of the newest stored version per name, skipping the reserved name.
pub(crate) fn describe(entries: &Entries) -> DescriptorSet {
    entries
        .iter()
        .filter(|(name, _)| name.as_str() != METADATA_API_NAME)
        .filter_map(|(name, versions)| {
            let (_, latest) = versions.last_key_value()?;
            Some((name.clone(), latest.descriptor()))
        })
        .collect()
}

/// Highest version in `versions` that satisfies `range`.
fn best_version<'a>(
    versions: impl IntoIterator<Item = &'a Version>,
    range: &Range,
) -> Option<&'a Version> {
    let mut best: Option<&Version> = None;

    for version in versions {
        // Keep the candidate if it satisfies the range and is at least as
        // high as the best match so far.
        if range.matches(version) && best.is_none_or(|current| version >= current) {
            best = Some(version);
        }
    }

    best
}
