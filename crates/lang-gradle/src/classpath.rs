//! Compiled accessors classpath of a project.
//!
//! The schema of a project comes from the ahead-of-time snapshot when the
//! build has one, otherwise from live introspection when the project opts in.
//! Accessors are generated and compiled into a directory of the shared
//! directory cache, keyed by the schema content and the compilation
//! classpath, so equal schemas compile once.

use dashmap::DashMap;
use ktdsl_api::models::{AccessorsClassPath, MultiProjectSchema, ProjectSchema};
use ktdsl_api::{BoxError, CacheKeySpec, DirectoryCache, KotlinCompiler, NodeKey, ProjectNode};
use ktdsl_core::{kotlin_type_string, write_accessors_to};
use once_cell::sync::OnceCell;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_128;

use crate::error::{ClassPathError, Result};
use crate::snapshot::load_multi_project_schema;

pub const CACHE_KEY_PREFIX: &str = "gradle-kotlin-dsl-accessors";
/// Project property enabling live schema introspection.
pub const ACCESSORS_PROPERTY: &str = "org.gradle.kotlin.dsl.accessors";
pub const LIVE_INTROSPECTION_VALUE: &str = "auto";

pub const ACCESSORS_JAR: &str = "gradle-kotlin-dsl-accessors.jar";
pub const SOURCE_DIR: &str = "src";
pub const ACCESSORS_SOURCE: &str = "org/gradle/kotlin/dsl/accessors.kt";

type SnapshotCell = Arc<OnceCell<Option<Arc<MultiProjectSchema>>>>;

/// Resolves and memoizes the accessors classpath of each project.
///
/// Only successful resolutions are memoized. Concurrent requests for the
/// same project block on a single resolution.
pub struct AccessorsClassPathResolver {
    cache: Arc<dyn DirectoryCache>,
    compiler: Arc<dyn KotlinCompiler>,
    class_paths: DashMap<NodeKey, Arc<OnceCell<AccessorsClassPath>>>,
    snapshots: DashMap<PathBuf, SnapshotCell>,
}

impl AccessorsClassPathResolver {
    pub fn new(cache: Arc<dyn DirectoryCache>, compiler: Arc<dyn KotlinCompiler>) -> Self {
        Self {
            cache,
            compiler,
            class_paths: DashMap::new(),
            snapshots: DashMap::new(),
        }
    }

    pub fn accessors_class_path_for(
        &self,
        node: &dyn ProjectNode,
        classpath: &[PathBuf],
    ) -> Result<AccessorsClassPath> {
        // Clone the cell out so the map shard is not locked while resolving.
        let cell = Arc::clone(&self.class_paths.entry(NodeKey::of(node)).or_default());
        cell.get_or_try_init(|| self.resolve(node, classpath))
            .cloned()
    }

    /// The schema of `node`, flattened to Kotlin type strings. `None` when
    /// neither the snapshot nor live introspection provides one.
    pub fn configured_project_schema_of(
        &self,
        node: &dyn ProjectNode,
    ) -> Result<Option<ProjectSchema<String>>> {
        if let Some(snapshot) = self.snapshot_for(node.root_dir())? {
            if let Some(schema) = snapshot.get(node.path()) {
                tracing::debug!("Using snapshot schema of project {}", node.path());
                return Ok(Some(schema.clone()));
            }
        }

        if node.find_property(ACCESSORS_PROPERTY).as_deref() != Some(LIVE_INTROSPECTION_VALUE) {
            return Ok(None);
        }
        if !node.is_class_loader_scope_locked() {
            return Err(ClassPathError::PreconditionViolation {
                path: node.path().to_string(),
            });
        }
        tracing::debug!("Introspecting schema of project {}", node.path());
        Ok(Some(node.introspect_schema().map(kotlin_type_string)))
    }

    fn snapshot_for(&self, root_dir: &Path) -> Result<Option<Arc<MultiProjectSchema>>> {
        let cell = Arc::clone(&self.snapshots.entry(root_dir.to_path_buf()).or_default());
        let snapshot = cell.get_or_try_init(|| {
            load_multi_project_schema(root_dir).map(|schemas| schemas.map(Arc::new))
        })?;
        Ok(snapshot.clone())
    }

    fn resolve(&self, node: &dyn ProjectNode, classpath: &[PathBuf]) -> Result<AccessorsClassPath> {
        let Some(schema) = self.configured_project_schema_of(node)? else {
            tracing::debug!("No schema for project {}, no accessors", node.path());
            return Ok(AccessorsClassPath::empty());
        };

        let key = cache_key_for(&schema, classpath);
        let mut populate = |dir: &Path| -> std::result::Result<(), BoxError> {
            self.populate(dir, &schema, classpath).map_err(Into::into)
        };
        let dir = self
            .cache
            .cache_dir_for(&key, &mut populate)
            .map_err(|source| match source.downcast::<ClassPathError>() {
                Ok(inner) => *inner,
                Err(source) => ClassPathError::Cache {
                    dir_name: cache_dir_name(&key),
                    source,
                },
            })?;

        tracing::info!(
            "Accessors of project {} available at {}",
            node.path(),
            dir.display()
        );
        Ok(AccessorsClassPath {
            bin: vec![dir.join(ACCESSORS_JAR)],
            src: vec![dir.join(SOURCE_DIR)],
        })
    }

    fn populate(
        &self,
        dir: &Path,
        schema: &ProjectSchema<String>,
        classpath: &[PathBuf],
    ) -> Result<()> {
        let source = dir.join(SOURCE_DIR).join(ACCESSORS_SOURCE);
        let io_error = |source_err| ClassPathError::Io {
            path: source.clone(),
            source: source_err,
        };
        if let Some(parent) = source.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let mut writer = BufWriter::new(fs::File::create(&source).map_err(io_error)?);
        let count = write_accessors_to(&mut writer, schema).map_err(io_error)?;
        writer.flush().map_err(io_error)?;
        tracing::debug!("Generated {} accessors into {}", count, source.display());

        self.compiler
            .compile_to_jar(&dir.join(ACCESSORS_JAR), &[source.clone()], classpath)?;
        Ok(())
    }
}

/// Cache key of the accessors compiled from `schema` against `classpath`.
/// Entry order of the schema does not affect the key.
pub fn cache_key_for(schema: &ProjectSchema<String>, classpath: &[PathBuf]) -> CacheKeySpec {
    classpath.iter().fold(
        CacheKeySpec::with_prefix(CACHE_KEY_PREFIX).with(schema.to_cache_key_string()),
        |key, entry| key.with(entry.to_string_lossy()),
    )
}

/// Directory name of a cache key, `<prefix>-<xxh3 128 hex>`.
pub fn cache_dir_name(key: &CacheKeySpec) -> String {
    format!(
        "{}-{:032x}",
        key.prefix,
        xxh3_128(key.to_key_string().as_bytes())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(extensions: &[(&str, &str)]) -> ProjectSchema<String> {
        ProjectSchema::from_entries(
            extensions
                .iter()
                .map(|(n, t)| (n.to_string(), t.to_string())),
            Vec::new(),
        )
    }

    #[test]
    fn test_cache_key_ignores_entry_order() {
        let a = schema(&[("a", "A"), ("b", "B")]);
        let b = schema(&[("b", "B"), ("a", "A")]);
        let classpath = vec![PathBuf::from("/lib/api.jar")];
        assert_eq!(cache_key_for(&a, &classpath), cache_key_for(&b, &classpath));
        assert_eq!(
            cache_dir_name(&cache_key_for(&a, &classpath)),
            cache_dir_name(&cache_key_for(&b, &classpath))
        );
    }

    #[test]
    fn test_cache_key_separates_extensions_from_conventions() {
        let extension = schema(&[("foo", "a.T")]);
        let convention = ProjectSchema::from_entries(
            Vec::new(),
            vec![("foo".to_string(), "a.T".to_string())],
        );
        assert_ne!(
            cache_dir_name(&cache_key_for(&extension, &[])),
            cache_dir_name(&cache_key_for(&convention, &[]))
        );
    }

    #[test]
    fn test_cache_key_depends_on_content() {
        let classpath = vec![];
        let a = cache_key_for(&schema(&[("a", "A")]), &classpath);
        let b = cache_key_for(&schema(&[("a", "B")]), &classpath);
        assert_ne!(cache_dir_name(&a), cache_dir_name(&b));

        let with_jar = cache_key_for(&schema(&[("a", "A")]), &[PathBuf::from("x.jar")]);
        assert_ne!(cache_dir_name(&a), cache_dir_name(&with_jar));
    }

    #[test]
    fn test_cache_dir_name_shape() {
        let key = cache_key_for(&schema(&[("a", "A")]), &[]);
        let name = cache_dir_name(&key);
        let hash = name.strip_prefix("gradle-kotlin-dsl-accessors-").unwrap();
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
