//! Enumerates the compiled classes of jars and class directories.

use ktdsl_api::models::{ClassAccess, ClassDescriptor};
use rayon::prelude::*;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::classfile::read_class;
use crate::error::{ClassReadError, Result};

/// Scans classpath entries for public, non-synthetic top-level and nested
/// classes, optionally restricted to a set of package prefixes.
#[derive(Debug, Clone, Default)]
pub struct ClassPathScanner {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl ClassPathScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only classes under one of these dotted package prefixes are read.
    pub fn include(mut self, prefixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.include.extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Classes under these dotted package prefixes are never read.
    pub fn exclude(mut self, prefixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude.extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Reads every matching class of `entries`, sorted by class name.
    ///
    /// Malformed class files are logged and skipped. Unreadable entries fail
    /// the whole scan.
    pub fn scan(&self, entries: &[PathBuf]) -> Result<Vec<ClassDescriptor>> {
        let mut raw = Vec::new();
        for entry in entries {
            if entry.is_dir() {
                self.collect_from_dir(entry, &mut raw)?;
            } else {
                self.collect_from_archive(entry, &mut raw)?;
            }
        }

        let mut classes: Vec<ClassDescriptor> = raw
            .into_par_iter()
            .filter_map(|(name, bytes)| match read_class(&name, bytes) {
                Ok(class) => Some(class),
                Err(e) => {
                    tracing::warn!("Skipping unreadable class {}: {}", name, e);
                    None
                }
            })
            .filter(|class| {
                class.access.contains(ClassAccess::PUBLIC)
                    && !class.access.contains(ClassAccess::SYNTHETIC)
            })
            .collect();

        classes.sort_by(|a, b| a.name.cmp(&b.name));
        classes.dedup_by(|a, b| a.name == b.name);
        tracing::debug!("Scanned {} classes from {} entries", classes.len(), entries.len());
        Ok(classes)
    }

    /// Whether a class file path (`org/gradle/api/Project.class`) is in scope.
    pub fn accepts(&self, entry_name: &str) -> bool {
        let Some(stem) = entry_name.strip_suffix(".class") else {
            return false;
        };
        let simple = stem.rsplit('/').next().unwrap_or(stem);
        if simple == "package-info" || simple == "module-info" || stem.starts_with("META-INF/") {
            return false;
        }
        // Anonymous and local classes: Outer$1, Outer$1Local
        if simple
            .split('$')
            .skip(1)
            .any(|part| part.starts_with(|c: char| c.is_ascii_digit()))
        {
            return false;
        }

        let dotted = stem.replace('/', ".");
        let matches = |prefix: &String| {
            dotted == *prefix
                || dotted
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        };
        (self.include.is_empty() || self.include.iter().any(matches))
            && !self.exclude.iter().any(matches)
    }

    fn collect_from_archive(&self, path: &Path, out: &mut Vec<(String, Vec<u8>)>) -> Result<()> {
        let file = File::open(path).map_err(|source| ClassReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut archive = ZipArchive::new(file).map_err(|source| ClassReadError::Archive {
            path: path.to_path_buf(),
            source,
        })?;

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|source| ClassReadError::Archive {
                    path: path.to_path_buf(),
                    source,
                })?;
            if entry.is_dir() || !self.accepts(entry.name()) {
                continue;
            }
            let name = entry.name().to_string();
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut bytes)
                .map_err(|source| ClassReadError::Io {
                    path: path.join(&name),
                    source,
                })?;
            out.push((name, bytes));
        }
        Ok(())
    }

    fn collect_from_dir(&self, root: &Path, out: &mut Vec<(String, Vec<u8>)>) -> Result<()> {
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if !self.accepts(&name) {
                continue;
            }
            let bytes = std::fs::read(entry.path()).map_err(|source| ClassReadError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            out.push((name, bytes));
        }
        Ok(())
    }
}
