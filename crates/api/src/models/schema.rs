//! Named, typed extensions and conventions attached to a project.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Schema of a single project. Maps are name-sorted so that iteration, and
/// everything generated from it, is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSchema<T> {
    #[serde(default = "BTreeMap::new")]
    pub extensions: BTreeMap<String, T>,
    #[serde(default = "BTreeMap::new")]
    pub conventions: BTreeMap<String, T>,
}

impl<T> Default for ProjectSchema<T> {
    fn default() -> Self {
        Self {
            extensions: BTreeMap::new(),
            conventions: BTreeMap::new(),
        }
    }
}

impl<T> ProjectSchema<T> {
    pub fn new(extensions: BTreeMap<String, T>, conventions: BTreeMap<String, T>) -> Self {
        Self {
            extensions,
            conventions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty() && self.conventions.is_empty()
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> ProjectSchema<U> {
        ProjectSchema {
            extensions: self.extensions.iter().map(|(k, v)| (k.clone(), f(v))).collect(),
            conventions: self
                .conventions
                .iter()
                .map(|(k, v)| (k.clone(), f(v)))
                .collect(),
        }
    }

    /// Conventions whose name is not shadowed by an extension.
    pub fn unshadowed_conventions(&self) -> impl Iterator<Item = (&String, &T)> {
        self.conventions
            .iter()
            .filter(|(name, _)| !self.extensions.contains_key(*name))
    }
}

impl ProjectSchema<String> {
    /// Builds a schema out of possibly colliding entries.
    ///
    /// When the same name appears more than once in one registry, the
    /// lexicographically greatest type wins, so the result never depends on
    /// the order entries were discovered in.
    pub fn from_entries<E, C>(extensions: E, conventions: C) -> Self
    where
        E: IntoIterator<Item = (String, String)>,
        C: IntoIterator<Item = (String, String)>,
    {
        Self {
            extensions: collect_last_wins(extensions),
            conventions: collect_last_wins(conventions),
        }
    }

    /// All entries of both registries as `e:name=type` (extensions) and
    /// `c:name=type` (conventions), sorted and joined with `:`.
    pub fn to_cache_key_string(&self) -> String {
        let extensions = self
            .extensions
            .iter()
            .map(|(name, ty)| format!("e:{}={}", name, ty));
        let conventions = self
            .conventions
            .iter()
            .map(|(name, ty)| format!("c:{}={}", name, ty));
        let mut entries: Vec<String> = extensions.chain(conventions).collect();
        entries.sort();
        entries.join(":")
    }
}

fn collect_last_wins(
    entries: impl IntoIterator<Item = (String, String)>,
) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, ty) in entries {
        match map.get(&name) {
            Some(existing) if existing.as_str() >= ty.as_str() => {}
            _ => {
                map.insert(name, ty);
            }
        }
    }
    map
}

/// Schemas of every project of a build, keyed by project path (`:`, `:app`).
pub type MultiProjectSchema = BTreeMap<String, ProjectSchema<String>>;

/// Compiled accessors and their sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessorsClassPath {
    pub bin: Vec<PathBuf>,
    pub src: Vec<PathBuf>,
}

impl AccessorsClassPath {
    /// Represents "no schema available".
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bin.is_empty() && self.src.is_empty()
    }
}
